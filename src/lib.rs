//! A dense feed-forward classifier trained with mini-batch momentum SGD.
//!
//! `dense-mlp` is a from-scratch multilayer perceptron built on a small dense
//! [`Matrix`] type. The network appends a constant bias unit to every layer output,
//! uses pluggable [`Activation`]s on hidden layers and a softmax output layer, and is
//! trained with backpropagation, classical momentum and decoupled weight decay.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - An example is a `1 x input_dim` row [`Matrix`]; a label is a `1 x num_classes`
//!   one-hot row.
//! - The weights between layers of sizes `a` and `b` form an `(a + 1) x b` matrix whose
//!   last row is the bias.
//!
//! # Panics vs `Result`
//!
//! - `std::ops` operators on [`Matrix`] panic on shape mismatch (programmer error).
//! - Everything else, including [`Network::forward`], [`Network::backward`] and
//!   [`Network::fit`], validates shapes and returns [`Result`].
//!
//! # Output layer
//!
//! The output activation is always [`Activation::Softmax`] and the loss is
//! cross-entropy against a one-hot target. Backprop relies on this pairing to seed the
//! error with `target - output`; see [`loss`].
//!
//! # Quick start
//!
//! ```rust
//! use dense_mlp::{Activation, Dataset, FitConfig, NetworkBuilder};
//!
//! # fn main() -> dense_mlp::Result<()> {
//! let xs = vec![vec![-1.0, -1.0], vec![-1.0, 1.0], vec![1.0, -1.0], vec![1.0, 1.0]];
//! let train = Dataset::from_class_ids(&xs, &[0, 0, 1, 1], 2)?;
//!
//! let mut net = NetworkBuilder::new(2)?
//!     .add_layer(8, Activation::selu())?
//!     .add_layer(2, Activation::Softmax)?
//!     .build_with_seed(0)?;
//!
//! let _report = net.fit(
//!     &train,
//!     FitConfig {
//!         epochs: 50,
//!         batch_size: 2,
//!         learning_rate: 0.1,
//!         momentum: 0.9,
//!         weight_decay: 0.0,
//!         seed: 0,
//!     },
//! )?;
//! let predictions = net.make_predictions(train.examples())?;
//! assert_eq!(predictions.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod io;
pub mod layer;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod optim;
pub mod train;

pub use activation::Activation;
pub use builder::NetworkBuilder;
pub use data::Dataset;
pub use error::{Error, Result};
pub use layer::Layer;
pub use matrix::Matrix;
pub use network::{Network, Scratch};
pub use optim::{Momentum, OptimizerState};
pub use train::{EpochReport, EvalReport, FitConfig, FitReport};
