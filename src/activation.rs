//! Activation functions.
//!
//! A layer computes a pre-activation value `z = W [x; 1]` (the bias is the last
//! column of `W`) and then applies an activation function: element-wise for every
//! variant except `Softmax`, which normalizes the whole output vector.
//!
//! Layers cache the *post-activation* outputs `y`. During backpropagation the
//! derivative `dy/dz` is expressed in terms of `y`, so no separate `z` buffer is kept.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Activation function of a layer.
pub enum ActivationFunction {
    /// Identity, `f(z) = z`.
    Linear,
    /// Logistic sigmoid, `f(z) = 1 / (1 + e^-z)`.
    LogisticSigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// Rectified linear unit, `f(z) = max(0, z)`.
    Rectifier,
    /// Softmax over all units of the layer. Only valid for the output layer.
    Softmax,
}

impl ActivationFunction {
    /// Apply the activation in place to the pre-activation values `z`.
    #[inline]
    pub(crate) fn apply(self, z: &mut [f64]) {
        match self {
            ActivationFunction::Linear => {}
            ActivationFunction::LogisticSigmoid => {
                for v in z.iter_mut() {
                    *v = sigmoid(*v);
                }
            }
            ActivationFunction::Tanh => {
                for v in z.iter_mut() {
                    *v = v.tanh();
                }
            }
            ActivationFunction::Rectifier => {
                for v in z.iter_mut() {
                    *v = v.max(0.0);
                }
            }
            ActivationFunction::Softmax => softmax(z),
        }
    }

    /// Derivative of the activation with respect to its input, expressed in terms
    /// of the cached post-activation output `y`.
    ///
    /// For `Softmax` this is the diagonal of the Jacobian; softmax layers are never
    /// backpropagated through since they can only be the output layer.
    #[inline]
    pub(crate) fn grad_from_output(self, y: f64) -> f64 {
        match self {
            ActivationFunction::Linear => 1.0,
            ActivationFunction::LogisticSigmoid | ActivationFunction::Softmax => y * (1.0 - y),
            ActivationFunction::Tanh => 1.0 - y * y,
            ActivationFunction::Rectifier => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[inline]
fn softmax(z: &mut [f64]) {
    if z.is_empty() {
        return;
    }

    let mut max = z[0];
    for &v in z.iter().skip(1) {
        if v > max {
            max = v;
        }
    }

    let mut sum = 0.0;
    for v in z.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }

    let inv_sum = 1.0 / sum;
    for v in z.iter_mut() {
        *v *= inv_sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_one(act: ActivationFunction, x: f64) -> f64 {
        let mut z = [x];
        act.apply(&mut z);
        z[0]
    }

    #[test]
    fn sigmoid_basic_values() {
        let y0 = apply_one(ActivationFunction::LogisticSigmoid, 0.0);
        assert!((y0 - 0.5).abs() < 1e-12);

        let y_pos = apply_one(ActivationFunction::LogisticSigmoid, 10.0);
        let y_neg = apply_one(ActivationFunction::LogisticSigmoid, -10.0);
        assert!(y_pos > 0.999);
        assert!(y_neg < 0.001);

        // Far in the tail the output underflows to exactly zero instead of NaN.
        assert_eq!(apply_one(ActivationFunction::LogisticSigmoid, -1000.0), 0.0);
    }

    #[test]
    fn rectifier_and_linear_shapes() {
        assert_eq!(apply_one(ActivationFunction::Rectifier, -2.0), 0.0);
        assert_eq!(apply_one(ActivationFunction::Rectifier, 3.0), 3.0);
        assert_eq!(apply_one(ActivationFunction::Linear, -2.5), -2.5);

        assert_eq!(ActivationFunction::Rectifier.grad_from_output(0.0), 0.0);
        assert_eq!(ActivationFunction::Rectifier.grad_from_output(1.0), 1.0);
        assert_eq!(ActivationFunction::Linear.grad_from_output(7.0), 1.0);
    }

    #[test]
    fn tanh_and_sigmoid_gradients_from_output() {
        let y_tanh = apply_one(ActivationFunction::Tanh, 0.3);
        let g_tanh = ActivationFunction::Tanh.grad_from_output(y_tanh);
        assert!((g_tanh - (1.0 - y_tanh * y_tanh)).abs() < 1e-12);

        let y_sig = apply_one(ActivationFunction::LogisticSigmoid, 0.0);
        let g_sig = ActivationFunction::LogisticSigmoid.grad_from_output(y_sig);
        assert!((g_sig - 0.25).abs() < 1e-12);
    }

    #[test]
    fn softmax_is_a_distribution() {
        let mut z = [1.0, 2.0, 3.0];
        ActivationFunction::Softmax.apply(&mut z);

        let sum: f64 = z.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(z[0] < z[1] && z[1] < z[2]);

        // Large logits must not overflow.
        let mut big = [1000.0, 1000.0];
        ActivationFunction::Softmax.apply(&mut big);
        assert!((big[0] - 0.5).abs() < 1e-12);
        assert!((big[1] - 0.5).abs() < 1e-12);
    }
}
