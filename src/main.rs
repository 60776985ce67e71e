//! Train a classifier on text-file data and write class predictions.
//!
//! Usage:
//!
//! ```text
//! dense-mlp --train-vectors data/train_vectors.csv --train-labels data/train_labels.csv \
//!     --test-vectors data/test_vectors.csv --test-predictions test_predictions
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dense_mlp::{Activation, Dataset, FitConfig, NetworkBuilder, io, metrics};

#[derive(Parser, Debug)]
#[command(name = "dense-mlp", version, about = "Train a dense MLP classifier with momentum SGD")]
struct Cli {
    /// Training examples, one comma/whitespace-separated row per line
    #[arg(long)]
    train_vectors: PathBuf,

    /// Training labels, one integer class id per line
    #[arg(long)]
    train_labels: PathBuf,

    /// Layer sizes, input first and class count last
    #[arg(long, value_delimiter = ',', default_value = "784,100,100,10")]
    layers: Vec<usize>,

    #[arg(long, default_value_t = FitConfig::default().epochs)]
    epochs: usize,

    #[arg(long, default_value_t = FitConfig::default().batch_size)]
    batch_size: usize,

    #[arg(long, default_value_t = FitConfig::default().learning_rate)]
    learning_rate: f64,

    #[arg(long, default_value_t = FitConfig::default().momentum)]
    momentum: f64,

    #[arg(long, default_value_t = FitConfig::default().weight_decay)]
    weight_decay: f64,

    /// Seeds both weight init and shuffling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Examples to predict after training
    #[arg(long, requires = "test_predictions")]
    test_vectors: Option<PathBuf>,

    /// Where to write predictions for --test-vectors
    #[arg(long, requires = "test_vectors")]
    test_predictions: Option<PathBuf>,

    /// Where to write predictions for the training examples
    #[arg(long)]
    train_predictions: Option<PathBuf>,

    /// Verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if cli.layers.len() < 2 {
        bail!("--layers needs at least an input and an output size");
    }
    let num_classes = cli.layers[cli.layers.len() - 1];

    let mut activations = vec![Activation::selu(); cli.layers.len() - 2];
    activations.push(Activation::Softmax);
    let mut net = NetworkBuilder::from_sizes(&cli.layers, &activations)?.build_with_seed(cli.seed)?;

    let examples = io::load_examples(&cli.train_vectors)?;
    let labels = io::load_labels(&cli.train_labels, num_classes)?;
    info!(examples = examples.len(), "loaded training data");
    let train = Dataset::new(examples, labels).context("building training set")?;

    let cfg = FitConfig {
        epochs: cli.epochs,
        batch_size: cli.batch_size,
        learning_rate: cli.learning_rate,
        momentum: cli.momentum,
        weight_decay: cli.weight_decay,
        seed: cli.seed,
    };
    net.fit(&train, cfg)?;

    if let (Some(vectors), Some(out)) = (&cli.test_vectors, &cli.test_predictions) {
        let test = io::load_examples(vectors)?;
        let predictions = net.make_predictions(&test)?;
        io::write_predictions(out, &predictions)?;
        info!(count = predictions.len(), path = %out.display(), "wrote test predictions");
    }

    if let Some(out) = &cli.train_predictions {
        let predictions = net.make_predictions(train.examples())?;
        let acc = metrics::accuracy(&predictions, train.labels())?;
        io::write_predictions(out, &predictions)?;
        info!(accuracy = acc, path = %out.display(), "wrote train predictions");
    }

    Ok(())
}
