//! Epoch-level training loop.
//!
//! `Network::fit` repeatedly walks a `Dataset` calling `Network::train` on each
//! instance with unit weight. Apart from a visiting-order buffer allocated once per
//! call, the loop reuses the network's own buffers.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Dataset, Error, Inputs, Network, Result};

/// Order in which instances are visited within an epoch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Dataset order.
    #[default]
    None,
    /// A fresh permutation every epoch, drawn from an RNG seeded once per `fit` call.
    Seeded(u64),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitConfig {
    pub epochs: usize,
    pub shuffle: Shuffle,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            shuffle: Shuffle::None,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidParameter("epochs must be > 0".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    /// Mean per-instance loss of the last epoch.
    pub final_loss: f64,
    /// Mean per-instance loss of every epoch, in order.
    pub epoch_losses: Vec<f64>,
}

impl Network {
    /// Train on every instance of `train`, `cfg.epochs` times.
    ///
    /// The reported loss of an instance is the one computed before its weight update.
    /// Stops at the first failing step, e.g. when `update` refuses the configured
    /// learning rate and weight decay.
    pub fn fit(&mut self, train: &Dataset, cfg: &FitConfig) -> Result<FitReport> {
        cfg.validate()?;
        if train.is_empty() {
            return Err(Error::InvalidData(
                "train dataset must not be empty".to_owned(),
            ));
        }
        if train.input_dim() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "train input_dim {} does not match network input_dim {}",
                train.input_dim(),
                self.input_dim()
            )));
        }
        if train.target_dim() != self.output_dim() {
            return Err(Error::InvalidData(format!(
                "train target_dim {} does not match network output_dim {}",
                train.target_dim(),
                self.output_dim()
            )));
        }

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut rng = match cfg.shuffle {
            Shuffle::None => None,
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };

        let mut epoch_losses = Vec::with_capacity(cfg.epochs);
        for epoch in 0..cfg.epochs {
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }

            let mut total = 0.0_f64;
            for &idx in &order {
                total += self.train(train.input(idx), train.target(idx), 1.0)?;
            }

            let mean = total / train.len() as f64;
            debug!(epoch, loss = mean, "epoch finished");
            epoch_losses.push(mean);
        }

        let final_loss = epoch_losses.last().copied().unwrap_or(0.0);
        info!(
            epochs = cfg.epochs,
            instances = train.len(),
            final_loss,
            "training finished"
        );

        Ok(FitReport {
            final_loss,
            epoch_losses,
        })
    }

    /// Mean loss over `data` without touching the weights.
    pub fn evaluate(&mut self, data: &Dataset) -> Result<f64> {
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if data.input_dim() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "dataset input_dim {} does not match network input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::InvalidData(format!(
                "dataset target_dim {} does not match network output_dim {}",
                data.target_dim(),
                self.output_dim()
            )));
        }

        let mut total = 0.0_f64;
        for (x, t) in data.iter() {
            self.propagate(x)?;
            total += self.compute_output_error(t, 1.0)?;
        }
        Ok(total / data.len() as f64)
    }

    /// Predict outputs for inputs (X).
    ///
    /// Returns a flat buffer with shape `(len, output_dim)`.
    pub fn predict_inputs(&mut self, inputs: &Inputs) -> Result<Vec<f64>> {
        if inputs.is_empty() {
            return Err(Error::InvalidData("inputs must not be empty".to_owned()));
        }
        if inputs.input_dim() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "inputs input_dim {} does not match network input_dim {}",
                inputs.input_dim(),
                self.input_dim()
            )));
        }

        let out_dim = self.output_dim();
        let mut preds = vec![0.0_f64; inputs.len() * out_dim];

        for (idx, row) in preds.chunks_exact_mut(out_dim).enumerate() {
            let y = self.predict(inputs.input(idx))?;
            row.copy_from_slice(y);
        }

        Ok(preds)
    }
}
