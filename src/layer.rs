//! Fully connected layer.
//!
//! Every layer sees its input *augmented* with a trailing constant `1.0` (the bias
//! unit), and its weight matrix carries one extra column for it. The layer's own
//! output buffer likewise ends with a permanent `1.0`, so the next layer can consume
//! it directly.

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::{ActivationFunction, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Random weight initialization scheme. Bias weights always start at zero.
pub enum Init {
    /// Xavier/Glorot uniform: `U(-sqrt(6 / (in + out)), sqrt(6 / (in + out)))`.
    Xavier,
    /// He/Kaiming uniform: `U(-sqrt(6 / in), sqrt(6 / in))`.
    He,
}

#[derive(Debug, Clone)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    activation: ActivationFunction,
    /// Row-major matrix with shape (out_dim, in_dim + 1). The last column is the bias.
    weights: Vec<f64>,
    /// `error[i] * input[j]` from the most recent backward pass, same shape as `weights`.
    gradients: Vec<f64>,
    /// Momentum accumulator, same shape as `weights`.
    velocity: Vec<f64>,
    /// Activations followed by the constant bias input of the next layer.
    output: Vec<f64>,
    /// Error signal per output unit.
    error: Vec<f64>,
}

impl Layer {
    /// Zero-initialized layer with `in_dim` inputs and `out_dim` units.
    pub fn new(activation: ActivationFunction, in_dim: usize, out_dim: usize) -> Self {
        let cols = in_dim + 1;
        let mut output = vec![0.0; out_dim + 1];
        output[out_dim] = 1.0;

        Self {
            in_dim,
            out_dim,
            activation,
            weights: vec![0.0; out_dim * cols],
            gradients: vec![0.0; out_dim * cols],
            velocity: vec![0.0; out_dim * cols],
            output,
            error: vec![0.0; out_dim],
        }
    }

    /// Layer with explicit weights.
    ///
    /// `weights` is row-major with shape `(out_dim, in_dim + 1)`: each row holds the
    /// unit's input weights followed by its bias.
    pub fn from_weights(
        activation: ActivationFunction,
        in_dim: usize,
        out_dim: usize,
        weights: Vec<f64>,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::Architecture(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }

        let expected = out_dim * (in_dim + 1);
        if weights.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "weights length {} does not match out_dim * (in_dim + 1) ({} * {})",
                weights.len(),
                out_dim,
                in_dim + 1
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InvalidParameter(
                "weights must contain only finite values".to_owned(),
            ));
        }

        let mut layer = Self::new(activation, in_dim, out_dim);
        layer.weights = weights;
        Ok(layer)
    }

    /// Randomly initialized layer.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        init: Init,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::Architecture(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }

        let limit = match init {
            Init::Xavier => (6.0 / (in_dim + out_dim) as f64).sqrt(),
            Init::He => (6.0 / in_dim as f64).sqrt(),
        };
        let dist = Uniform::new_inclusive(-limit, limit);

        let mut layer = Self::new(activation, in_dim, out_dim);
        let cols = in_dim + 1;
        for o in 0..out_dim {
            let row = o * cols;
            for w in &mut layer.weights[row..row + in_dim] {
                *w = dist.sample(rng);
            }
        }
        Ok(layer)
    }

    /// Number of inputs, not counting the bias unit.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.in_dim
    }

    /// Number of units.
    #[inline]
    pub fn output_dim(&self) -> usize {
        self.out_dim
    }

    #[inline]
    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    /// Row-major weights with shape `(out_dim, in_dim + 1)`.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Gradient terms computed by the last `compute_gradient` call.
    #[inline]
    pub fn gradients(&self) -> &[f64] {
        &self.gradients
    }

    /// Activations of the last `propagate` call followed by the bias input `1.0`.
    #[inline]
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Activations of the last `propagate` call.
    #[inline]
    pub fn activations(&self) -> &[f64] {
        &self.output[..self.out_dim]
    }

    #[inline]
    pub fn error(&self) -> &[f64] {
        &self.error
    }

    /// Activations together with a mutable view of the error buffer.
    #[inline]
    pub(crate) fn activations_and_error_mut(&mut self) -> (&[f64], &mut [f64]) {
        (&self.output[..self.out_dim], &mut self.error)
    }

    /// Forward pass for a single sample.
    ///
    /// Shape contract: `input.len() == self.input_dim() + 1` with the bias input last.
    /// Widths are validated once by `Network::new`, so they are only debug-asserted here.
    #[inline]
    pub fn propagate(&mut self, input: &[f64]) {
        debug_assert_eq!(input.len(), self.in_dim + 1);

        let cols = self.in_dim + 1;
        for o in 0..self.out_dim {
            let row = &self.weights[o * cols..(o + 1) * cols];
            let mut sum = 0.0_f64;
            for (w, x) in row.iter().zip(input) {
                sum = w.mul_add(*x, sum);
            }
            self.output[o] = sum;
        }

        self.activation.apply(&mut self.output[..self.out_dim]);
    }

    /// Compute `gradient[o][j] = error[o] * input[j]` from the populated error buffer.
    ///
    /// `input` is the augmented input used in the forward pass: the previous layer's
    /// `output()`, or the network's augmented input for the first layer.
    #[inline]
    pub fn compute_gradient(&mut self, input: &[f64]) {
        debug_assert_eq!(input.len(), self.in_dim + 1);

        let cols = self.in_dim + 1;
        for o in 0..self.out_dim {
            let e = self.error[o];
            let row = &mut self.gradients[o * cols..(o + 1) * cols];
            for (g, x) in row.iter_mut().zip(input) {
                *g = e * x;
            }
        }
    }

    /// Pull `next`'s error back through its weights into this layer's error buffer.
    ///
    /// `next` is the layer directly downstream; its error buffer must already be set.
    #[inline]
    pub fn backpropagate(&mut self, next: &Layer) {
        debug_assert_eq!(next.in_dim, self.out_dim);

        let cols = next.in_dim + 1;
        for i in 0..self.out_dim {
            let mut e = 0.0_f64;
            for k in 0..next.out_dim {
                e = next.weights[k * cols + i].mul_add(next.error[k], e);
            }
            self.error[i] = e * self.activation.grad_from_output(self.output[i]);
        }
    }

    /// Apply the gradient with momentum and multiplicative weight decay:
    ///
    /// - `velocity = alpha * velocity + eta * gradient`
    /// - `weight = decay * weight + velocity`
    #[inline]
    pub fn update(&mut self, eta: f64, alpha: f64, decay: f64) {
        for ((w, v), &g) in self
            .weights
            .iter_mut()
            .zip(self.velocity.iter_mut())
            .zip(&self.gradients)
        {
            *v = alpha * *v + eta * g;
            *w = decay * *w + *v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn propagate_uses_bias_column() {
        // Two units: [1, 2 | 0.5] and [-1, 0 | 0].
        let mut layer = Layer::from_weights(
            ActivationFunction::Linear,
            2,
            2,
            vec![1.0, 2.0, 0.5, -1.0, 0.0, 0.0],
        )
        .unwrap();

        layer.propagate(&[3.0, 4.0, 1.0]);
        assert_eq!(layer.activations(), &[11.5, -3.0]);
        assert_eq!(layer.output(), &[11.5, -3.0, 1.0]);
    }

    #[test]
    fn softmax_layer_outputs_distribution() {
        let mut layer = Layer::from_weights(
            ActivationFunction::Softmax,
            1,
            3,
            vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0],
        )
        .unwrap();

        layer.propagate(&[1.0, 1.0]);
        let sum: f64 = layer.activations().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(layer.output()[3], 1.0);
    }

    #[test]
    fn compute_gradient_is_outer_product() {
        let mut layer = Layer::new(ActivationFunction::Linear, 2, 1);
        layer.error[0] = 0.5;
        layer.compute_gradient(&[2.0, -4.0, 1.0]);
        assert_eq!(layer.gradients(), &[1.0, -2.0, 0.5]);
    }

    #[test]
    fn backpropagate_skips_bias_column_and_applies_derivative() {
        // Downstream: 2 inputs, 2 units.
        let mut next = Layer::from_weights(
            ActivationFunction::Linear,
            2,
            2,
            vec![1.0, 2.0, 100.0, 3.0, 4.0, 100.0],
        )
        .unwrap();
        next.error.copy_from_slice(&[1.0, -1.0]);

        let mut layer = Layer::new(ActivationFunction::LogisticSigmoid, 1, 2);
        layer.output[0] = 0.5;
        layer.output[1] = 0.25;
        layer.backpropagate(&next);

        // unit 0: (1*1 + 3*-1) * 0.5*0.5, unit 1: (2*1 + 4*-1) * 0.25*0.75
        assert!((layer.error()[0] - (-2.0 * 0.25)).abs() < 1e-12);
        assert!((layer.error()[1] - (-2.0 * 0.1875)).abs() < 1e-12);
    }

    #[test]
    fn update_applies_momentum_then_decay() {
        let mut layer =
            Layer::from_weights(ActivationFunction::Linear, 1, 1, vec![1.0, 2.0]).unwrap();
        layer.gradients.copy_from_slice(&[1.0, -1.0]);

        layer.update(0.1, 0.5, 0.9);
        // v = 0.1 * g; w = 0.9 * w + v
        assert!((layer.weights()[0] - (0.9 + 0.1)).abs() < 1e-12);
        assert!((layer.weights()[1] - (1.8 - 0.1)).abs() < 1e-12);

        layer.update(0.1, 0.5, 0.9);
        // v = 0.5 * 0.1 + 0.1 = 0.15
        assert!((layer.weights()[0] - (0.9 * 1.0 + 0.15)).abs() < 1e-12);
        assert!((layer.weights()[1] - (0.9 * 1.7 - 0.15)).abs() < 1e-12);
    }

    #[test]
    fn seeded_init_is_deterministic_and_bounded() {
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let a = Layer::new_with_rng(4, 3, Init::Xavier, ActivationFunction::Tanh, &mut rng_a)
            .unwrap();
        let b = Layer::new_with_rng(4, 3, Init::Xavier, ActivationFunction::Tanh, &mut rng_b)
            .unwrap();
        assert_eq!(a.weights(), b.weights());

        let limit = (6.0_f64 / 7.0).sqrt();
        for o in 0..3 {
            let row = &a.weights()[o * 5..(o + 1) * 5];
            assert!(row[..4].iter().all(|w| w.abs() <= limit));
            assert_eq!(row[4], 0.0);
        }
    }

    #[test]
    fn from_weights_validates_shape() {
        assert!(Layer::from_weights(ActivationFunction::Linear, 2, 1, vec![0.0; 2]).is_err());
        assert!(Layer::from_weights(ActivationFunction::Linear, 2, 1, vec![f64::NAN; 3]).is_err());
        assert!(matches!(
            Layer::from_weights(ActivationFunction::Linear, 0, 1, vec![0.0]),
            Err(Error::Architecture(_))
        ));
        assert!(Layer::from_weights(ActivationFunction::Linear, 2, 1, vec![0.0; 3]).is_ok());
    }
}
