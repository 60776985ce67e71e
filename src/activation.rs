//! Activation functions.
//!
//! A layer computes a pre-activation potential `z = x W` and then applies its
//! activation: `y = activation(z)`.
//!
//! Two capabilities are kept separate:
//!
//! - element-wise activations map every potential independently (`apply_scalar`);
//! - [`Activation::Softmax`] is a whole-vector transform and has no meaningful scalar
//!   form. Its scalar `apply`/`derivative` are the constant `0` and are never used.
//!
//! Derivatives are evaluated at the potential `z`, not at the output `y`. The network
//! caches them during the forward pass so backprop never recomputes `z`.

use crate::{Error, Matrix, Result};

/// Self-normalizing SELU scale.
pub const SELU_LAMBDA: f64 = 1.0507;
/// Self-normalizing SELU alpha.
pub const SELU_ALPHA: f64 = 1.6733;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// `lambda * x` for `x >= 0`, `lambda * alpha * (e^x - 1)` otherwise.
    Selu { lambda: f64, alpha: f64 },
    /// Numerically stabilized softmax over the whole vector. Output layer only.
    Softmax,
    Tanh,
    Relu,
    LeakyRelu { alpha: f64 },
    Sigmoid,
    Identity,
}

impl Activation {
    /// SELU with the standard self-normalizing constants.
    pub const fn selu() -> Self {
        Activation::Selu {
            lambda: SELU_LAMBDA,
            alpha: SELU_ALPHA,
        }
    }

    /// Validate activation parameters.
    pub fn validate(self) -> Result<()> {
        match self {
            Activation::Selu { lambda, alpha } => {
                if !(lambda.is_finite() && lambda > 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "selu lambda must be finite and > 0, got {lambda}"
                    )));
                }
                if !(alpha.is_finite() && alpha >= 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "selu alpha must be finite and >= 0, got {alpha}"
                    )));
                }
            }
            Activation::LeakyRelu { alpha } => {
                if !(alpha.is_finite() && alpha >= 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "leaky ReLU alpha must be finite and >= 0, got {alpha}"
                    )));
                }
            }
            Activation::Softmax
            | Activation::Tanh
            | Activation::Relu
            | Activation::Sigmoid
            | Activation::Identity => {}
        }

        Ok(())
    }

    /// Whether `apply` is an independent per-cell map.
    #[inline]
    pub fn is_elementwise(self) -> bool {
        !matches!(self, Activation::Softmax)
    }

    #[inline]
    pub fn apply_scalar(self, x: f64) -> f64 {
        match self {
            Activation::Selu { lambda, alpha } => {
                if x < 0.0 {
                    lambda * alpha * (x.exp() - 1.0)
                } else {
                    lambda * x
                }
            }
            Activation::Softmax => 0.0,
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu { alpha } => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
            Activation::Sigmoid => sigmoid(x),
            Activation::Identity => x,
        }
    }

    #[inline]
    pub fn derivative_scalar(self, x: f64) -> f64 {
        match self {
            Activation::Selu { lambda, alpha } => {
                if x < 0.0 {
                    lambda * alpha * x.exp()
                } else {
                    lambda
                }
            }
            Activation::Softmax => 0.0,
            Activation::Tanh => {
                let y = x.tanh();
                1.0 - y * y
            }
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu { alpha } => {
                if x > 0.0 {
                    1.0
                } else {
                    alpha
                }
            }
            Activation::Sigmoid => {
                let y = sigmoid(x);
                y * (1.0 - y)
            }
            Activation::Identity => 1.0,
        }
    }

    /// Apply to a whole matrix of potentials, returning a new matrix.
    pub fn apply(self, potentials: &Matrix) -> Result<Matrix> {
        let mut out = potentials.clone();
        self.apply_in_place(&mut out)?;
        Ok(out)
    }

    /// Apply in place.
    ///
    /// Fails only for softmax over an empty matrix.
    pub fn apply_in_place(self, potentials: &mut Matrix) -> Result<()> {
        match self {
            Activation::Softmax => softmax_in_place(potentials),
            act => {
                potentials.map_in_place(|x| act.apply_scalar(x));
                Ok(())
            }
        }
    }

    /// Derivative at each potential, returning a new matrix.
    pub fn derivative(self, potentials: &Matrix) -> Matrix {
        potentials.map(|x| self.derivative_scalar(x))
    }

    pub fn derivative_in_place(self, potentials: &mut Matrix) {
        potentials.map_in_place(|x| self.derivative_scalar(x));
    }

    /// Variance of the zero-mean Gaussian used to initialize weights feeding this
    /// activation.
    pub fn weight_init_variance(self, fan_in: usize, fan_out: usize) -> f64 {
        match self {
            Activation::Selu { .. } => 1.0 / fan_in as f64,
            Activation::Relu | Activation::LeakyRelu { .. } => 2.0 / fan_in as f64,
            Activation::Softmax
            | Activation::Tanh
            | Activation::Sigmoid
            | Activation::Identity => 2.0 / (fan_in + fan_out) as f64,
        }
    }
}

fn softmax_in_place(potentials: &mut Matrix) -> Result<()> {
    let max = potentials.max()?;

    let mut sum = 0.0;
    for v in potentials.as_mut_slice() {
        *v = (*v - max).exp();
        sum += *v;
    }
    potentials.map_in_place(|v| v / sum);
    Ok(())
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
