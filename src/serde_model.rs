//! Network serialization/deserialization (feature: `serde`).
//!
//! This module defines a versioned, stable on-disk format for `Network`.
//!
//! Design notes:
//! - Internal `Network`/`Layer` structs are not serialized directly, so the file
//!   format stays stable even if the internal representation changes.
//! - Momentum (velocity) and scratch buffers are not persisted; a loaded network
//!   starts with zero velocity.
//! - Deserialization validates dimensions, parameter lengths and finiteness, then
//!   rebuilds through `Network::new` so architecture rules apply.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    ActivationFunction, Error, Hyperparameters, Layer, Network, ObjectiveFunction, Result,
};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNetwork {
    pub format_version: u32,
    pub objective: SerializedObjective,
    pub hyperparameters: Hyperparameters,
    pub layers: Vec<SerializedLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLayer {
    pub in_dim: usize,
    pub out_dim: usize,
    pub activation: SerializedActivation,
    /// Row-major (out_dim, in_dim + 1); the last column is the bias.
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializedActivation {
    Linear,
    LogisticSigmoid,
    Tanh,
    Rectifier,
    Softmax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializedObjective {
    LeastMeanSquares,
    CrossEntropy,
}

impl From<ActivationFunction> for SerializedActivation {
    fn from(value: ActivationFunction) -> Self {
        match value {
            ActivationFunction::Linear => SerializedActivation::Linear,
            ActivationFunction::LogisticSigmoid => SerializedActivation::LogisticSigmoid,
            ActivationFunction::Tanh => SerializedActivation::Tanh,
            ActivationFunction::Rectifier => SerializedActivation::Rectifier,
            ActivationFunction::Softmax => SerializedActivation::Softmax,
        }
    }
}

impl From<SerializedActivation> for ActivationFunction {
    fn from(value: SerializedActivation) -> Self {
        match value {
            SerializedActivation::Linear => ActivationFunction::Linear,
            SerializedActivation::LogisticSigmoid => ActivationFunction::LogisticSigmoid,
            SerializedActivation::Tanh => ActivationFunction::Tanh,
            SerializedActivation::Rectifier => ActivationFunction::Rectifier,
            SerializedActivation::Softmax => ActivationFunction::Softmax,
        }
    }
}

impl From<ObjectiveFunction> for SerializedObjective {
    fn from(value: ObjectiveFunction) -> Self {
        match value {
            ObjectiveFunction::LeastMeanSquares => SerializedObjective::LeastMeanSquares,
            ObjectiveFunction::CrossEntropy => SerializedObjective::CrossEntropy,
        }
    }
}

impl From<SerializedObjective> for ObjectiveFunction {
    fn from(value: SerializedObjective) -> Self {
        match value {
            SerializedObjective::LeastMeanSquares => ObjectiveFunction::LeastMeanSquares,
            SerializedObjective::CrossEntropy => ObjectiveFunction::CrossEntropy,
        }
    }
}

impl SerializedNetwork {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.layers.len() < 2 {
            return Err(Error::InvalidData(format!(
                "serialized network must have at least two layers, got {}",
                self.layers.len()
            )));
        }
        self.hyperparameters
            .validate()
            .map_err(|e| Error::InvalidData(format!("invalid hyper-parameters: {e}")))?;

        for (i, layer) in self.layers.iter().enumerate() {
            layer
                .validate()
                .map_err(|e| Error::InvalidData(format!("layer {i} invalid: {e}")))?;

            if i > 0 {
                let prev_out = self.layers[i - 1].out_dim;
                if layer.in_dim != prev_out {
                    return Err(Error::InvalidData(format!(
                        "layer {i} in_dim {} does not match previous out_dim {}",
                        layer.in_dim, prev_out
                    )));
                }
            }
        }

        Ok(())
    }
}

impl SerializedLayer {
    fn validate(&self) -> Result<()> {
        if self.in_dim == 0 || self.out_dim == 0 {
            return Err(Error::InvalidData(format!(
                "layer dims must be > 0, got in_dim={} out_dim={}",
                self.in_dim, self.out_dim
            )));
        }

        let expected_w = (self.in_dim + 1)
            .checked_mul(self.out_dim)
            .ok_or_else(|| Error::InvalidData("layer weight shape overflow".to_owned()))?;
        if self.weights.len() != expected_w {
            return Err(Error::InvalidData(format!(
                "weights length {} does not match out_dim * (in_dim + 1) ({} * {})",
                self.weights.len(),
                self.out_dim,
                self.in_dim + 1
            )));
        }
        if self.weights.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "weights must contain only finite values".to_owned(),
            ));
        }

        Ok(())
    }
}

impl From<&Network> for SerializedNetwork {
    fn from(net: &Network) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            objective: net.objective().into(),
            hyperparameters: *net.hyperparameters(),
            layers: net.layers().iter().map(SerializedLayer::from).collect(),
        }
    }
}

impl From<&Layer> for SerializedLayer {
    fn from(layer: &Layer) -> Self {
        Self {
            in_dim: layer.input_dim(),
            out_dim: layer.output_dim(),
            activation: layer.activation().into(),
            weights: layer.weights().to_vec(),
        }
    }
}

impl TryFrom<SerializedNetwork> for Network {
    type Error = Error;

    fn try_from(value: SerializedNetwork) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let mut layers = Vec::with_capacity(value.layers.len());
        for (i, layer) in value.layers.into_iter().enumerate() {
            let l = Layer::from_weights(
                layer.activation.into(),
                layer.in_dim,
                layer.out_dim,
                layer.weights,
            )
            .map_err(|e| Error::InvalidData(format!("layer {i} invalid: {e}")))?;
            layers.push(l);
        }

        Network::new(value.objective.into(), layers)?.with_hyperparameters(value.hyperparameters)
    }
}

impl Network {
    /// Serialize the network to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        let ser = SerializedNetwork::from(self);
        serde_json::to_string_pretty(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    /// Serialize the network to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        let ser = SerializedNetwork::from(self);
        serde_json::to_string(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    /// Parse a network from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedNetwork = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse network json: {e}")))?;
        ser.try_into()
    }

    /// Save the network to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s)
            .map_err(|e| Error::InvalidData(format!("failed to write {}: {e}", p.display())))?;
        Ok(())
    }

    /// Load a network from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::InvalidData(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}
