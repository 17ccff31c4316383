//! Multilayer perceptron training core.
//!
//! `sgd-mlp` implements forward propagation, error backpropagation and weight updates
//! by stochastic gradient descent with momentum and weight decay, for fully connected
//! feed-forward networks. The same [`Network`] drives a classifier and a regressor
//! ([`MlpClassifier`], [`MlpRegressor`]).
//!
//! # Design goals
//!
//! - Predictable performance: every buffer a training step touches is allocated when
//!   the network is built and reused afterwards.
//! - Clear contracts: the topology is validated once, at construction; inputs, targets
//!   and hyper-parameters are validated at the API boundary before anything is written.
//! - Explicit combinations: the output error depends on the (objective, output
//!   activation) pair, resolved by [`GradientRule::lookup`].
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - Layer weights are row-major with shape `(out_dim, in_dim + 1)`; the last column
//!   is the bias, connected to a constant `1.0` input.
//! - [`Dataset`] and [`Inputs`] store samples contiguously in row-major layout.
//!
//! # Quick start
//!
//! ```rust
//! use sgd_mlp::{ActivationFunction, Dataset, FitConfig, NetworkBuilder, Shuffle};
//!
//! # fn main() -> sgd_mlp::Result<()> {
//! let xs = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![1.0, 1.0],
//! ];
//! let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
//! let train = Dataset::from_rows(&xs, &ys)?;
//!
//! let mut net = NetworkBuilder::new(2)?
//!     .add_layer(4, ActivationFunction::Tanh)?
//!     .add_layer(1, ActivationFunction::LogisticSigmoid)?
//!     .build_with_seed(0)?;
//! net.set_weight_decay(0.0)?;
//!
//! let report = net.fit(
//!     &train,
//!     &FitConfig {
//!         epochs: 100,
//!         shuffle: Shuffle::Seeded(0),
//!     },
//! )?;
//! assert!(report.final_loss.is_finite());
//! # Ok(())
//! # }
//! ```
//!
//! # Driving single steps
//!
//! ```rust
//! use sgd_mlp::{ActivationFunction, NetworkBuilder, ObjectiveFunction};
//!
//! # fn main() -> sgd_mlp::Result<()> {
//! let mut net = NetworkBuilder::new(3)?
//!     .objective(ObjectiveFunction::CrossEntropy)
//!     .add_layer(8, ActivationFunction::Rectifier)?
//!     .add_layer(2, ActivationFunction::Softmax)?
//!     .build_with_seed(0)?;
//!
//! let x = [0.1, -0.2, 0.3];
//! let t = [0.0, 1.0];
//!
//! net.propagate(&x)?;
//! let _loss = net.backpropagate(&t, 1.0)?;
//! net.update()?;
//!
//! let y = net.predict(&x)?;
//! assert_eq!(y.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod layer;
pub mod model;
pub mod network;
pub mod objective;
pub mod params;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::ActivationFunction;
pub use builder::NetworkBuilder;
pub use data::{Dataset, Inputs};
pub use error::{Error, Result};
pub use layer::{Init, Layer};
pub use model::{MlpClassifier, MlpRegressor, OnlineLearner};
pub use network::Network;
pub use objective::{GradientRule, ObjectiveFunction, UnitTerm};
pub use params::Hyperparameters;
pub use train::{FitConfig, FitReport, Shuffle};
