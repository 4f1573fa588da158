use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        gru::{Gru, GruConfig},
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::activation,
};
use serde::{Deserialize, Serialize};

use crate::data::batcher::SequenceBatch;

/// Which recurrent cell the stacked layers are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RnnType {
    /// LSTM assembled from two affine maps, forget-gate bias +1.0
    #[value(name = "basiclstm")]
    BasicLstm,
    /// Burn's LSTM layer
    Lstm,
    /// Burn's GRU layer
    Gru,
}

impl std::fmt::Display for RnnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RnnType::BasicLstm => "basiclstm",
            RnnType::Lstm      => "lstm",
            RnnType::Gru       => "gru",
        };
        f.write_str(name)
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct RnnClassifierConfig {
    pub vocab_size: usize,
    pub embed_dim:  usize,
    pub hidden_dim: usize,
    pub n_layers:   usize,
    pub n_classes:  usize,
    pub rnn_type:   RnnType,
    /// Probability of zeroing an input activation (1 - keep probability)
    #[config(default = 0.0)]
    pub dropout:    f64,
}

impl RnnClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RnnClassifier<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embed_dim).init(device);
        let layers: Vec<RecurrentLayer<B>> = (0..self.n_layers)
            .map(|i| {
                let d_input = if i == 0 { self.embed_dim } else { self.hidden_dim };
                self.build_layer(d_input, device)
            })
            .collect();
        let dropout = DropoutConfig::new(self.dropout).init();
        let output  = LinearConfig::new(self.hidden_dim, self.n_classes).init(device);
        RnnClassifier { embedding, layers, dropout, output }
    }

    fn build_layer<B: Backend>(&self, d_input: usize, device: &B::Device) -> RecurrentLayer<B> {
        match self.rnn_type {
            RnnType::BasicLstm => RecurrentLayer::BasicLstm(BasicLstm::new(d_input, self.hidden_dim, device)),
            RnnType::Lstm      => RecurrentLayer::Lstm(LstmConfig::new(d_input, self.hidden_dim, true).init(device)),
            RnnType::Gru       => RecurrentLayer::Gru(GruConfig::new(d_input, self.hidden_dim, true).init(device)),
        }
    }
}

// ─── BasicLstm ────────────────────────────────────────────────────────────────
/// LSTM layer without peepholes or projection.
///
///   [i, j, f, o] = W_x · x_t + b + W_h · h_{t-1}
///   c_t = c_{t-1} · σ(f + 1) + σ(i) · tanh(j)
///   h_t = tanh(c_t) · σ(o)
#[derive(Module, Debug)]
pub struct BasicLstm<B: Backend> {
    input_map:     Linear<B>,
    recurrent_map: Linear<B>,
    hidden_size:   usize,
}

const FORGET_BIAS: f64 = 1.0;

impl<B: Backend> BasicLstm<B> {
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            input_map: LinearConfig::new(input_size, 4 * hidden_size).init(device),
            recurrent_map: LinearConfig::new(hidden_size, 4 * hidden_size)
                .with_bias(false)
                .init(device),
            hidden_size,
        }
    }

    /// [batch, steps, input] → hidden state at every step [batch, steps, hidden]
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, steps, _] = input.dims();
        let device = input.device();
        let h4 = 4 * self.hidden_size;

        // The input projection does not depend on the recurrence.
        let projected = self.input_map.forward(input);

        let mut h: Tensor<B, 2> = Tensor::zeros([batch, self.hidden_size], &device);
        let mut c: Tensor<B, 2> = Tensor::zeros([batch, self.hidden_size], &device);
        let mut outputs = Vec::with_capacity(steps);

        for t in 0..steps {
            let x_t = projected
                .clone()
                .slice([0..batch, t..t + 1, 0..h4])
                .reshape([batch, h4]);
            let z = x_t + self.recurrent_map.forward(h.clone());

            let i = activation::sigmoid(self.gate(&z, 0));
            let j = self.gate(&z, 1).tanh();
            let f = activation::sigmoid(self.gate(&z, 2).add_scalar(FORGET_BIAS));
            let o = activation::sigmoid(self.gate(&z, 3));

            c = c * f + i * j;
            h = c.clone().tanh() * o;
            outputs.push(h.clone().unsqueeze_dim::<3>(1));
        }

        Tensor::cat(outputs, 1)
    }

    fn gate(&self, z: &Tensor<B, 2>, k: usize) -> Tensor<B, 2> {
        let [batch, _] = z.dims();
        z.clone().slice([0..batch, k * self.hidden_size..(k + 1) * self.hidden_size])
    }
}

// ─── RecurrentLayer ───────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub enum RecurrentLayer<B: Backend> {
    BasicLstm(BasicLstm<B>),
    Lstm(Lstm<B>),
    Gru(Gru<B>),
}

impl<B: Backend> RecurrentLayer<B> {
    /// [batch, steps, d_input] → [batch, steps, hidden]
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        match self {
            RecurrentLayer::BasicLstm(cell) => cell.forward(input),
            RecurrentLayer::Lstm(lstm) => {
                let (outputs, _state) = lstm.forward(input, None);
                outputs
            }
            RecurrentLayer::Gru(gru) => gru.forward(input, None),
        }
    }
}

// ─── RnnClassifier ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct RnnClassifier<B: Backend> {
    pub embedding: Embedding<B>,
    pub layers:    Vec<RecurrentLayer<B>>,
    pub dropout:   Dropout,
    pub output:    Linear<B>,
}

impl<B: Backend> RnnClassifier<B> {
    /// tokens: [batch, width], lengths: [batch] → logits: [batch, n_classes]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>, lengths: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let mut x = self.embedding.forward(tokens);
        for layer in &self.layers {
            x = layer.forward(self.dropout.forward(x));
        }
        self.output.forward(last_valid_state(x, lengths))
    }

    /// Mean cross-entropy over the batch, plus the logits it was computed from.
    pub fn forward_loss(&self, batch: SequenceBatch<B>) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(batch.tokens, batch.lengths);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.targets);
        (loss, logits)
    }
}

/// Pick each row's output at step `length - 1`.
///
/// Padding sits to the right of the valid steps and the recurrence
/// runs left to right, so this state never sees a padding token.
pub fn last_valid_state<B: Backend>(outputs: Tensor<B, 3>, lengths: Tensor<B, 1, Int>) -> Tensor<B, 2> {
    let [batch, _, hidden] = outputs.dims();
    let index = lengths
        .sub_scalar(1)
        .reshape([batch, 1, 1])
        .expand([batch, 1, hidden]);
    outputs.gather(1, index).reshape([batch, hidden])
}

/// Number of rows whose arg-max logit equals the target class.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns [batch, 1] — flatten to [batch] before comparing
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    predicted.equal(targets).int().sum().into_scalar().elem::<i64>() as usize
}
