//! Supervised models built on a `Network`.
//!
//! Both models learn online: one instance per `learn` call, one SGD step each.

use tracing::debug;

use crate::{ActivationFunction, Error, Network, ObjectiveFunction, Result};

/// A model trained one instance at a time.
pub trait OnlineLearner {
    type Target;
    type Prediction;

    /// One training step on `(x, y)` with instance weight `weight`. Returns the loss.
    fn learn(&mut self, x: &[f64], y: Self::Target, weight: f64) -> Result<f64>;

    fn predict(&mut self, x: &[f64]) -> Result<Self::Prediction>;

    /// Learn every sample in order with unit weight. Returns the mean loss.
    ///
    /// Stops at the first failing step.
    fn learn_many<'a, I>(&mut self, samples: I) -> Result<f64>
    where
        I: IntoIterator<Item = (&'a [f64], Self::Target)>,
    {
        let mut total = 0.0_f64;
        let mut n = 0_usize;
        for (x, y) in samples {
            total += self.learn(x, y, 1.0)?;
            n += 1;
        }
        if n == 0 {
            return Err(Error::InvalidData("no samples to learn".to_owned()));
        }
        Ok(total / n as f64)
    }
}

/// Classifier trained with cross-entropy.
///
/// A single logistic-sigmoid output unit gives a binary classifier (labels 0 and 1);
/// `k >= 2` softmax output units give a `k`-class classifier.
#[derive(Debug, Clone)]
pub struct MlpClassifier {
    net: Network,
    classes: usize,
    /// One-hot (or 0/1 for binary) encoding of the current label.
    target: Vec<f64>,
}

impl MlpClassifier {
    pub fn new(net: Network) -> Result<Self> {
        if net.objective() != ObjectiveFunction::CrossEntropy {
            return Err(Error::Architecture(format!(
                "classifier requires the cross-entropy objective, got {:?}",
                net.objective()
            )));
        }

        let units = net.output_dim();
        let activation = net.output_layer().activation();
        let classes = match (units, activation) {
            (1, ActivationFunction::LogisticSigmoid) => 2,
            (k, ActivationFunction::Softmax) if k >= 2 => k,
            _ => {
                return Err(Error::Architecture(format!(
                    "classifier output layer must be 1 logistic sigmoid unit or >= 2 softmax \
                     units, got {units} {activation:?} units"
                )));
            }
        };

        debug!(classes, "classifier constructed");
        Ok(Self {
            net,
            classes,
            target: vec![0.0; units],
        })
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.classes
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &self.net
    }

    /// Mutable access, e.g. to change hyper-parameters between steps.
    #[inline]
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.net
    }

    pub fn into_network(self) -> Network {
        self.net
    }

    /// Write the posterior probability of every class into `out` and return the most
    /// probable class.
    pub fn posteriori(&mut self, x: &[f64], out: &mut [f64]) -> Result<usize> {
        if out.len() != self.classes {
            return Err(Error::InvalidParameter(format!(
                "invalid posteriori vector size: {}, expected: {}",
                out.len(),
                self.classes
            )));
        }

        let y = self.net.predict(x)?;
        if self.classes == 2 && y.len() == 1 {
            out[0] = 1.0 - y[0];
            out[1] = y[0];
        } else {
            out.copy_from_slice(y);
        }
        Ok(decide(y))
    }

    fn encode(&mut self, label: usize) -> Result<()> {
        if label >= self.classes {
            return Err(Error::InvalidParameter(format!(
                "invalid class label: {label}, expected < {}",
                self.classes
            )));
        }

        if self.target.len() == 1 {
            self.target[0] = label as f64;
        } else {
            self.target.fill(0.0);
            self.target[label] = 1.0;
        }
        Ok(())
    }
}

impl OnlineLearner for MlpClassifier {
    type Target = usize;
    type Prediction = usize;

    fn learn(&mut self, x: &[f64], label: usize, weight: f64) -> Result<f64> {
        self.encode(label)?;
        self.net.train(x, &self.target, weight)
    }

    fn predict(&mut self, x: &[f64]) -> Result<usize> {
        let y = self.net.predict(x)?;
        Ok(decide(y))
    }
}

/// Class decision from the output activations.
fn decide(y: &[f64]) -> usize {
    if y.len() == 1 {
        return usize::from(y[0] > 0.5);
    }

    let mut best = 0;
    for (i, &v) in y.iter().enumerate().skip(1) {
        if v > y[best] {
            best = i;
        }
    }
    best
}

/// Regressor trained with least-mean-squares on a single output unit.
#[derive(Debug, Clone)]
pub struct MlpRegressor {
    net: Network,
}

impl MlpRegressor {
    pub fn new(net: Network) -> Result<Self> {
        if net.objective() != ObjectiveFunction::LeastMeanSquares {
            return Err(Error::Architecture(format!(
                "regressor requires the least-mean-squares objective, got {:?}",
                net.objective()
            )));
        }
        if net.output_dim() != 1 {
            return Err(Error::Architecture(format!(
                "regressor requires a single output unit, got {}",
                net.output_dim()
            )));
        }

        debug!(input_dim = net.input_dim(), "regressor constructed");
        Ok(Self { net })
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &self.net
    }

    #[inline]
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.net
    }

    pub fn into_network(self) -> Network {
        self.net
    }
}

impl OnlineLearner for MlpRegressor {
    type Target = f64;
    type Prediction = f64;

    fn learn(&mut self, x: &[f64], y: f64, weight: f64) -> Result<f64> {
        self.net.train(x, &[y], weight)
    }

    fn predict(&mut self, x: &[f64]) -> Result<f64> {
        Ok(self.net.predict(x)?[0])
    }
}
