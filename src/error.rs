use thiserror::Error;

use crate::{ActivationFunction, ObjectiveFunction};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid layer topology. Only raised while constructing a network.
    #[error("invalid architecture: {0}")]
    Architecture(String),
    /// A hyper-parameter, input vector or target vector is out of range or has the wrong shape.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Individually valid hyper-parameters that are unsafe in combination.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// No gradient rule exists for this objective/activation pair.
    #[error("unsupported activation function {activation:?} for objective function {objective:?}")]
    UnsupportedCombination {
        objective: ObjectiveFunction,
        activation: ActivationFunction,
    },
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
