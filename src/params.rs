//! Training hyper-parameters.
//!
//! Every setter validates its argument and leaves the struct untouched on error, so
//! a `Hyperparameters` value is always individually valid. Whether the combination
//! of learning rate and weight decay is usable is only checked by [`Hyperparameters::decay`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Largest accepted weight decay factor.
pub const MAX_WEIGHT_DECAY: f64 = 0.1;

/// Default lower bound on the per-step decay multiplier `1 - 2 * eta * lambda`.
pub const DEFAULT_DECAY_FLOOR: f64 = 0.9;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    learning_rate: f64,
    momentum: f64,
    weight_decay: f64,
    decay_floor: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: 0.3,
            momentum: 0.3,
            weight_decay: 0.1,
            decay_floor: DEFAULT_DECAY_FLOOR,
        }
    }
}

impl Hyperparameters {
    /// Validate all fields (used for values that did not go through the setters,
    /// e.g. deserialized ones).
    pub fn validate(&self) -> Result<()> {
        check_learning_rate(self.learning_rate)?;
        check_momentum(self.momentum)?;
        check_weight_decay(self.weight_decay)?;
        check_decay_floor(self.decay_floor)
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    #[inline]
    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    #[inline]
    pub fn weight_decay(&self) -> f64 {
        self.weight_decay
    }

    #[inline]
    pub fn decay_floor(&self) -> f64 {
        self.decay_floor
    }

    /// Set the learning rate `eta`. Must be finite and > 0.
    pub fn set_learning_rate(&mut self, eta: f64) -> Result<()> {
        check_learning_rate(eta)?;
        self.learning_rate = eta;
        Ok(())
    }

    /// Set the momentum factor `alpha` in `[0, 1)`. Zero disables momentum.
    pub fn set_momentum(&mut self, alpha: f64) -> Result<()> {
        check_momentum(alpha)?;
        self.momentum = alpha;
        Ok(())
    }

    /// Set the weight decay factor `lambda` in `[0, 0.1]`.
    ///
    /// After each update every weight is shrunk by `1 - 2 * eta * lambda`.
    pub fn set_weight_decay(&mut self, lambda: f64) -> Result<()> {
        check_weight_decay(lambda)?;
        self.weight_decay = lambda;
        Ok(())
    }

    /// Set the smallest decay multiplier `update` accepts, in `(0, 1]`.
    pub fn set_decay_floor(&mut self, floor: f64) -> Result<()> {
        check_decay_floor(floor)?;
        self.decay_floor = floor;
        Ok(())
    }

    /// Per-step weight multiplier `1 - 2 * eta * lambda`.
    ///
    /// Fails with `InvalidState` when it falls below the decay floor, i.e. the learning
    /// rate and weight decay together would erase too much of each weight per step.
    pub fn decay(&self) -> Result<f64> {
        let decay = 1.0 - 2.0 * self.learning_rate * self.weight_decay;
        if decay < self.decay_floor {
            return Err(Error::InvalidState(format!(
                "invalid learning rate (eta = {:.2}) and/or weight decay (lambda = {:.2}): \
                 decay {decay:.4} is below {}",
                self.learning_rate, self.weight_decay, self.decay_floor
            )));
        }
        Ok(decay)
    }
}

fn check_learning_rate(eta: f64) -> Result<()> {
    if !(eta.is_finite() && eta > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "invalid learning rate: {eta}"
        )));
    }
    Ok(())
}

fn check_momentum(alpha: f64) -> Result<()> {
    if !(0.0..1.0).contains(&alpha) {
        return Err(Error::InvalidParameter(format!(
            "invalid momentum factor: {alpha}"
        )));
    }
    Ok(())
}

fn check_weight_decay(lambda: f64) -> Result<()> {
    if !(0.0..=MAX_WEIGHT_DECAY).contains(&lambda) {
        return Err(Error::InvalidParameter(format!(
            "invalid weight decay factor: {lambda}"
        )));
    }
    Ok(())
}

fn check_decay_floor(floor: f64) -> Result<()> {
    if !(floor > 0.0 && floor <= 1.0) {
        return Err(Error::InvalidParameter(format!(
            "invalid decay floor: {floor}"
        )));
    }
    Ok(())
}
