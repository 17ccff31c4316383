//! Multilayer perceptron trainer.
//!
//! A `Network` consists of several fully connected layers. Each unit computes a
//! transformed weighted sum of the preceding layer's activations, one of the weights
//! acting as a trainable bias connected to a constant input. The input layer is not a
//! `Layer`; it is the augmented input buffer owned by the network.
//!
//! One training step is `propagate` → `backpropagate` (which starts by computing the
//! output error) → `update`. All three take `&mut self` and overwrite buffers owned by
//! the network and its layers, so a step can never interleave with another step on the
//! same network. Independent networks share nothing and may be trained on separate
//! threads.

use tracing::{debug, warn};

use crate::{
    ActivationFunction, Error, GradientRule, Hyperparameters, Layer, ObjectiveFunction, Result,
};

#[derive(Debug, Clone)]
pub struct Network {
    objective: ObjectiveFunction,
    layers: Vec<Layer>,
    params: Hyperparameters,
    /// Input of the current sample followed by the bias input `1.0`.
    input: Vec<f64>,
    /// Target of the current sample.
    target: Vec<f64>,
}

impl Network {
    /// Build a network from its layers. The input layer is not included.
    ///
    /// Fails with `Architecture` when there are fewer than two layers, a layer has a
    /// zero width, adjacent layer widths disagree, or a hidden layer uses softmax.
    pub fn new(objective: ObjectiveFunction, layers: Vec<Layer>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::Architecture(format!(
                "too few layers: {}",
                layers.len()
            )));
        }

        for (i, layer) in layers.iter().enumerate() {
            if layer.input_dim() == 0 || layer.output_dim() == 0 {
                return Err(Error::Architecture(format!(
                    "layer {i} dims must be > 0, got in_dim={} out_dim={}",
                    layer.input_dim(),
                    layer.output_dim()
                )));
            }
            if i > 0 && layer.input_dim() != layers[i - 1].output_dim() {
                return Err(Error::Architecture(format!(
                    "layer {} has {} units while layer {i} takes {} inputs",
                    i - 1,
                    layers[i - 1].output_dim(),
                    layer.input_dim()
                )));
            }
            if i + 1 < layers.len() && layer.activation() == ActivationFunction::Softmax {
                return Err(Error::Architecture(format!(
                    "softmax is only supported in the output layer, found in layer {i}"
                )));
            }
        }

        let input_dim = layers[0].input_dim();
        let output_dim = layers[layers.len() - 1].output_dim();

        let mut input = vec![0.0; input_dim + 1];
        input[input_dim] = 1.0;

        debug!(
            ?objective,
            layers = layers.len(),
            input_dim,
            output_dim,
            "network constructed"
        );

        Ok(Self {
            objective,
            layers,
            params: Hyperparameters::default(),
            input,
            target: vec![0.0; output_dim],
        })
    }

    /// Replace all hyper-parameters at once.
    pub fn with_hyperparameters(mut self, params: Hyperparameters) -> Result<Self> {
        self.set_hyperparameters(params)?;
        Ok(self)
    }

    #[inline]
    pub fn objective(&self) -> ObjectiveFunction {
        self.objective
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input.len() - 1
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.target.len()
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    /// Mutable access to a layer's parameters. The topology itself cannot change.
    #[inline]
    pub fn layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.layers.get_mut(idx)
    }

    #[inline]
    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Activations of the output layer from the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f64] {
        self.output_layer().activations()
    }

    #[inline]
    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.params
    }

    pub fn set_hyperparameters(&mut self, params: Hyperparameters) -> Result<()> {
        params.validate()?;
        debug!(?params, "hyper-parameters replaced");
        self.params = params;
        Ok(())
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.params.learning_rate()
    }

    #[inline]
    pub fn momentum(&self) -> f64 {
        self.params.momentum()
    }

    #[inline]
    pub fn weight_decay(&self) -> f64 {
        self.params.weight_decay()
    }

    #[inline]
    pub fn decay_floor(&self) -> f64 {
        self.params.decay_floor()
    }

    /// Sets the learning rate.
    pub fn set_learning_rate(&mut self, eta: f64) -> Result<()> {
        self.params.set_learning_rate(eta)?;
        debug!(eta, "learning rate set");
        Ok(())
    }

    /// Sets the momentum factor. `alpha = 0.0` means no momentum.
    pub fn set_momentum(&mut self, alpha: f64) -> Result<()> {
        self.params.set_momentum(alpha)?;
        debug!(alpha, "momentum set");
        Ok(())
    }

    /// Sets the weight decay factor. After each weight update every weight is
    /// shrunk according to `w = w * (1 - 2 * eta * lambda)`.
    pub fn set_weight_decay(&mut self, lambda: f64) -> Result<()> {
        self.params.set_weight_decay(lambda)?;
        debug!(lambda, "weight decay set");
        Ok(())
    }

    /// Sets the smallest per-step decay multiplier `update` accepts.
    pub fn set_decay_floor(&mut self, floor: f64) -> Result<()> {
        self.params.set_decay_floor(floor)?;
        debug!(floor, "decay floor set");
        Ok(())
    }

    /// Propagate `x` forward through every layer.
    pub fn propagate(&mut self, x: &[f64]) -> Result<()> {
        let p = self.input_dim();
        if x.len() != p {
            return Err(Error::InvalidParameter(format!(
                "invalid input vector size: {}, expected: {p}",
                x.len()
            )));
        }

        self.input[..p].copy_from_slice(x);
        self.layers[0].propagate(&self.input);
        for l in 1..self.layers.len() {
            let (lower, upper) = self.layers.split_at_mut(l);
            upper[0].propagate(lower[l - 1].output());
        }
        Ok(())
    }

    /// Compute the output layer's error signal for `target` from the most recent
    /// forward pass, and return the loss.
    ///
    /// `weight` is a positive weight of the training instance; the error signal and
    /// the loss are both scaled by it.
    pub fn compute_output_error(&mut self, target: &[f64], weight: f64) -> Result<f64> {
        let units = self.output_dim();
        if target.len() != units {
            return Err(Error::InvalidParameter(format!(
                "invalid target vector size: {}, expected: {units}",
                target.len()
            )));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "instance weight must be finite and > 0, got {weight}"
            )));
        }

        let last = self.layers.len() - 1;
        let rule = GradientRule::lookup(self.objective, self.layers[last].activation())?;

        self.target.copy_from_slice(target);
        let (output, error) = self.layers[last].activations_and_error_mut();

        let mut loss = 0.0_f64;
        for ((e, &o), &t) in error.iter_mut().zip(output).zip(&self.target) {
            let term = rule.evaluate(t, o);
            loss += term.loss;
            *e = weight * (t - o) * term.scale;
        }

        Ok(weight * loss)
    }

    /// Compute the output error for `target` and propagate it back through the
    /// network, leaving every layer with fresh gradient terms. Returns the loss.
    pub fn backpropagate(&mut self, target: &[f64], weight: f64) -> Result<f64> {
        let loss = self.compute_output_error(target, weight)?;

        for l in (1..self.layers.len()).rev() {
            let (lower, upper) = self.layers.split_at_mut(l);
            let prev = &mut lower[l - 1];
            let layer = &mut upper[0];
            layer.compute_gradient(prev.output());
            prev.backpropagate(layer);
        }

        // The first layer has no upstream layer to receive an error signal.
        self.layers[0].compute_gradient(&self.input);
        Ok(loss)
    }

    /// Apply the gradients of the last backward pass to every layer.
    ///
    /// Fails with `InvalidState`, leaving all weights untouched, when
    /// `1 - 2 * eta * lambda` is below the decay floor.
    pub fn update(&mut self) -> Result<()> {
        let decay = self
            .params
            .decay()
            .inspect_err(|err| warn!(%err, "weight update refused"))?;

        let eta = self.params.learning_rate();
        let alpha = self.params.momentum();
        for layer in &mut self.layers {
            layer.update(eta, alpha, decay);
        }
        Ok(())
    }

    /// One stochastic gradient descent step on a single instance. Returns its loss.
    pub fn train(&mut self, x: &[f64], y: &[f64], weight: f64) -> Result<f64> {
        self.propagate(x)?;
        let loss = self.backpropagate(y, weight)?;
        self.update()?;
        Ok(loss)
    }

    /// Propagate `x` and return the output layer's activations.
    pub fn predict(&mut self, x: &[f64]) -> Result<&[f64]> {
        self.propagate(x)?;
        Ok(self.output())
    }
}
