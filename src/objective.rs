//! Objective functions and output-layer gradient rules.
//!
//! The output error of a network depends on the pair (objective, output activation).
//! `GradientRule::lookup` resolves that pair once; `GradientRule::evaluate` is then a
//! pure per-unit function of `(target, output)`.
//!
//! All rules start from the raw error `g = target - output`. A rule contributes a
//! loss term and a factor that `g` is multiplied by before it is stored in the output
//! layer's error buffer.

use crate::{ActivationFunction, Error, Result};

/// Natural log of anything below this threshold is replaced by [`LN_FLOOR`].
pub const LN_UNDERFLOW_THRESHOLD: f64 = 1e-300;

/// Substitute for `ln(x)` when `x < LN_UNDERFLOW_THRESHOLD` (approximately `ln(1e-300)`).
pub const LN_FLOOR: f64 = -690.7755;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Loss formulation driving training.
pub enum ObjectiveFunction {
    /// Half squared error, `0.5 * (t - o)^2` per output unit.
    LeastMeanSquares,
    /// Cross-entropy. Requires a softmax or logistic-sigmoid output layer.
    CrossEntropy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Gradient rule for one supported (objective, activation) pair.
pub enum GradientRule {
    /// Least-mean-squares with a non-sigmoid output; the raw error is used as is.
    LeastMeanSquares,
    /// Least-mean-squares with a logistic-sigmoid output.
    LeastMeanSquaresSigmoid,
    /// Cross-entropy with a softmax output.
    SoftmaxCrossEntropy,
    /// Binary cross-entropy with a logistic-sigmoid output.
    SigmoidCrossEntropy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Result of evaluating a rule on a single output unit.
pub struct UnitTerm {
    /// Factor applied to the raw error `target - output`.
    pub scale: f64,
    /// Loss contribution of the unit.
    pub loss: f64,
}

impl GradientRule {
    /// Resolve the rule for an objective and an output activation.
    pub fn lookup(objective: ObjectiveFunction, activation: ActivationFunction) -> Result<Self> {
        use ActivationFunction as A;

        match (objective, activation) {
            (ObjectiveFunction::LeastMeanSquares, A::LogisticSigmoid) => {
                Ok(GradientRule::LeastMeanSquaresSigmoid)
            }
            (ObjectiveFunction::LeastMeanSquares, _) => Ok(GradientRule::LeastMeanSquares),
            (ObjectiveFunction::CrossEntropy, A::Softmax) => Ok(GradientRule::SoftmaxCrossEntropy),
            (ObjectiveFunction::CrossEntropy, A::LogisticSigmoid) => {
                Ok(GradientRule::SigmoidCrossEntropy)
            }
            (ObjectiveFunction::CrossEntropy, A::Linear | A::Tanh | A::Rectifier) => {
                Err(Error::UnsupportedCombination {
                    objective,
                    activation,
                })
            }
        }
    }

    /// Evaluate the rule for one unit with desired value `t` and actual output `o`.
    #[inline]
    pub fn evaluate(self, t: f64, o: f64) -> UnitTerm {
        match self {
            GradientRule::LeastMeanSquares => {
                let g = t - o;
                UnitTerm {
                    scale: 1.0,
                    loss: 0.5 * g * g,
                }
            }
            GradientRule::LeastMeanSquaresSigmoid => {
                let g = t - o;
                UnitTerm {
                    scale: o * (1.0 - o),
                    loss: 0.5 * g * g,
                }
            }
            // softmax + cross-entropy: dL/dz is already `t - o`.
            GradientRule::SoftmaxCrossEntropy => UnitTerm {
                scale: 1.0,
                loss: -t * guarded_ln(o),
            },
            GradientRule::SigmoidCrossEntropy => UnitTerm {
                scale: o * (1.0 - o),
                loss: -t * guarded_ln(o) - (1.0 - t) * guarded_ln(1.0 - o),
            },
        }
    }
}

/// Natural logarithm that never returns `-inf` for tiny or zero inputs.
#[inline]
pub fn guarded_ln(x: f64) -> f64 {
    if x < LN_UNDERFLOW_THRESHOLD {
        LN_FLOOR
    } else {
        x.ln()
    }
}
