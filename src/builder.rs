//! Network builder.
//!
//! `NetworkBuilder` is the recommended way to define a network.
//!
//! It makes the structure explicit (layer widths + activations) and picks a
//! weight initializer for each activation:
//!
//! - `tanh` / `sigmoid` / `linear` / `softmax`: Xavier/Glorot
//! - `rectifier`: He/Kaiming
//!
//! Bias weights always start at zero.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    ActivationFunction, Error, Hyperparameters, Init, Layer, Network, ObjectiveFunction, Result,
};

#[derive(Debug, Clone, Copy)]
struct LayerSpec {
    out_dim: usize,
    activation: ActivationFunction,
}

#[derive(Debug, Clone)]
/// Builder for a `Network`.
///
/// Example:
///
/// ```rust
/// use sgd_mlp::{ActivationFunction, NetworkBuilder, ObjectiveFunction};
///
/// # fn main() -> sgd_mlp::Result<()> {
/// let net = NetworkBuilder::new(2)?
///     .objective(ObjectiveFunction::CrossEntropy)
///     .add_layer(8, ActivationFunction::Tanh)?
///     .add_layer(1, ActivationFunction::LogisticSigmoid)?
///     .build_with_seed(0)?;
/// assert_eq!(net.output_dim(), 1);
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    input_dim: usize,
    objective: ObjectiveFunction,
    params: Hyperparameters,
    layers: Vec<LayerSpec>,
}

impl NetworkBuilder {
    /// Start building a network that accepts inputs of length `input_dim`.
    ///
    /// The objective defaults to least-mean-squares.
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::Architecture("input_dim must be > 0".to_owned()));
        }
        Ok(Self {
            input_dim,
            objective: ObjectiveFunction::LeastMeanSquares,
            params: Hyperparameters::default(),
            layers: Vec::new(),
        })
    }

    /// Convenience constructor from a sizes list + activations.
    ///
    /// `sizes` includes the input and output widths, so its length must be at least 3
    /// (input, hidden, output). `activations` must have length `sizes.len() - 1`.
    pub fn from_sizes(sizes: &[usize], activations: &[ActivationFunction]) -> Result<Self> {
        if sizes.len() < 3 {
            return Err(Error::Architecture(format!(
                "sizes must include input, hidden and output widths, got {}",
                sizes.len()
            )));
        }
        if activations.len() != sizes.len() - 1 {
            return Err(Error::Architecture(format!(
                "activations length {} does not match sizes.len() - 1 ({})",
                activations.len(),
                sizes.len() - 1
            )));
        }

        let mut b = Self::new(sizes[0])?;
        for (out_dim, &act) in sizes[1..].iter().zip(activations) {
            b = b.add_layer(*out_dim, act)?;
        }
        Ok(b)
    }

    pub fn objective(mut self, objective: ObjectiveFunction) -> Self {
        self.objective = objective;
        self
    }

    /// Hyper-parameters of the built network. They are validated at build time.
    pub fn hyperparameters(mut self, params: Hyperparameters) -> Self {
        self.params = params;
        self
    }

    /// Add a fully connected layer with `out_dim` units.
    pub fn add_layer(mut self, out_dim: usize, activation: ActivationFunction) -> Result<Self> {
        if out_dim == 0 {
            return Err(Error::Architecture("layer out_dim must be > 0".to_owned()));
        }

        self.layers.push(LayerSpec {
            out_dim,
            activation,
        });
        Ok(self)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        let mut layers = Vec::with_capacity(self.layers.len());
        let mut in_dim = self.input_dim;
        for spec in self.layers {
            let init = default_init_for_activation(spec.activation);
            let layer = Layer::new_with_rng(in_dim, spec.out_dim, init, spec.activation, rng)?;
            layers.push(layer);
            in_dim = spec.out_dim;
        }

        Network::new(self.objective, layers)?.with_hyperparameters(self.params)
    }
}

#[inline]
fn default_init_for_activation(act: ActivationFunction) -> Init {
    match act {
        ActivationFunction::Tanh
        | ActivationFunction::LogisticSigmoid
        | ActivationFunction::Linear
        | ActivationFunction::Softmax => Init::Xavier,
        ActivationFunction::Rectifier => Init::He,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_requested_topology() {
        let net = NetworkBuilder::from_sizes(
            &[3, 5, 4, 2],
            &[
                ActivationFunction::Rectifier,
                ActivationFunction::Tanh,
                ActivationFunction::Softmax,
            ],
        )
        .unwrap()
        .objective(ObjectiveFunction::CrossEntropy)
        .build_with_seed(1)
        .unwrap();

        assert_eq!(net.num_layers(), 3);
        assert_eq!(net.input_dim(), 3);
        assert_eq!(net.output_dim(), 2);
        assert_eq!(net.objective(), ObjectiveFunction::CrossEntropy);
        assert_eq!(net.layer(1).unwrap().input_dim(), 5);
        assert_eq!(net.layer(2).unwrap().activation(), ActivationFunction::Softmax);
    }

    #[test]
    fn same_seed_gives_same_weights() {
        let build = |seed| {
            NetworkBuilder::new(2)
                .unwrap()
                .add_layer(3, ActivationFunction::LogisticSigmoid)
                .unwrap()
                .add_layer(1, ActivationFunction::LogisticSigmoid)
                .unwrap()
                .build_with_seed(seed)
                .unwrap()
        };

        let a = build(42);
        let b = build(42);
        let c = build(43);
        for i in 0..2 {
            assert_eq!(a.layer(i).unwrap().weights(), b.layer(i).unwrap().weights());
        }
        assert_ne!(a.layer(0).unwrap().weights(), c.layer(0).unwrap().weights());
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(matches!(NetworkBuilder::new(0), Err(Error::Architecture(_))));
        assert!(
            NetworkBuilder::new(2)
                .unwrap()
                .add_layer(0, ActivationFunction::Tanh)
                .is_err()
        );

        // Only an output layer: too few layers.
        let err = NetworkBuilder::new(2)
            .unwrap()
            .add_layer(1, ActivationFunction::Linear)
            .unwrap()
            .build_with_seed(0)
            .unwrap_err();
        assert!(matches!(err, Error::Architecture(_)));

        assert!(NetworkBuilder::from_sizes(&[2, 1], &[ActivationFunction::Linear]).is_err());
        assert!(
            NetworkBuilder::from_sizes(&[2, 3, 1], &[ActivationFunction::Linear]).is_err()
        );
    }

    #[test]
    fn hyperparameters_are_applied() {
        let mut params = Hyperparameters::default();
        params.set_learning_rate(0.05).unwrap();

        let net = NetworkBuilder::new(1)
            .unwrap()
            .hyperparameters(params)
            .add_layer(2, ActivationFunction::Tanh)
            .unwrap()
            .add_layer(1, ActivationFunction::Linear)
            .unwrap()
            .build_with_seed(0)
            .unwrap();
        assert_eq!(net.learning_rate(), 0.05);
    }
}
