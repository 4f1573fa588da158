// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their flags. Defaults mirror TrainConfig::default().

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;
use crate::ml::model::RnnType;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the RNN classifier on a delimited sequence file
    Train(TrainArgs),

    /// Classify sequences with the best saved checkpoint
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Delimited file of `sequence<delim>label` records
    #[arg(long, default_value = "data/proteins_varlen.csv")]
    pub input_file: String,

    /// Field separator of the input file
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Directory for checkpoints, config and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Recurrent cell type
    #[arg(long, value_enum, default_value_t = RnnType::Gru)]
    pub rnn_type: RnnType,

    /// Minibatch size
    #[arg(long, default_value_t = 50)]
    pub batch_size: usize,

    /// Number of stacked recurrent layers
    #[arg(long, default_value_t = 10)]
    pub n_layers: usize,

    /// Size of each layer's hidden state
    #[arg(long, default_value_t = 50)]
    pub hidden_dim: usize,

    /// Size of the residue embedding
    #[arg(long, default_value_t = 16)]
    pub embed_dim: usize,

    /// Number of classes (protein families / clusters)
    #[arg(long, default_value_t = 2)]
    pub n_classes: usize,

    /// Probability of keeping each layer input (1.0 disables dropout)
    #[arg(long, default_value_t = 1.0)]
    pub in_keep_prob: f64,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    /// Maximum number of training epochs
    #[arg(long, default_value_t = 100)]
    pub n_epochs: usize,

    /// Epochs without test-accuracy improvement before stopping
    #[arg(long, default_value_t = 10)]
    pub patience: usize,

    /// Fraction of records held out as the test set
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Seed for the split, batch sampling and weight init
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            input_file:     a.input_file,
            delimiter:      a.delimiter,
            checkpoint_dir: a.checkpoint_dir,
            rnn_type:       a.rnn_type,
            batch_size:     a.batch_size,
            n_layers:       a.n_layers,
            hidden_dim:     a.hidden_dim,
            embed_dim:      a.embed_dim,
            n_classes:      a.n_classes,
            in_keep_prob:   a.in_keep_prob,
            learning_rate:  a.learning_rate,
            n_epochs:       a.n_epochs,
            patience:       a.patience,
            test_fraction:  a.test_fraction,
            seed:           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// File of sequences to classify (labels optional)
    #[arg(long)]
    pub input_file: String,

    /// Field separator of the input file
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Directory a previous `train` run wrote its checkpoint to
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
