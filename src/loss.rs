//! Cross-entropy loss for a softmax output layer.
//!
//! Training never differentiates the loss generically. The output layer is pinned to
//! [`Activation::Softmax`](crate::Activation::Softmax) and the target is one-hot, so the
//! derivative of cross-entropy with respect to the output potentials collapses to
//! `output - target`. [`softmax_cross_entropy_delta`] returns the negation of that,
//! `target - output`, which is the direction the optimizer adds to the weights.
//!
//! Swapping the output activation or the loss invalidates this shortcut; it would have
//! to become the chain-rule product of the loss derivative and the activation
//! derivative. `NetworkBuilder` rejects any output activation other than softmax for
//! this reason.

use crate::{Error, Matrix, Result};

/// Probabilities are clamped to this before taking the log.
pub const PROB_FLOOR: f64 = 1e-12;

/// `-sum(target_i * ln(output_i))`.
///
/// Shape contract: `output.shape() == target.shape()`.
pub fn cross_entropy(output: &Matrix, target: &Matrix) -> Result<f64> {
    check_same_shape("cross_entropy", output, target)?;

    let mut loss = 0.0;
    for (&y, &t) in output.iter().zip(target.iter()) {
        if t != 0.0 {
            loss -= t * y.max(PROB_FLOOR).ln();
        }
    }
    Ok(loss)
}

/// Error signal at the output potentials: `target - output`.
///
/// Valid only for a softmax output paired with cross-entropy and a one-hot target.
pub fn softmax_cross_entropy_delta(target: &Matrix, output: &Matrix) -> Result<Matrix> {
    target.try_sub(output)
}

fn check_same_shape(op: &'static str, lhs: &Matrix, rhs: &Matrix) -> Result<()> {
    if lhs.shape() != rhs.shape() {
        return Err(Error::ShapeMismatch {
            op,
            lhs: lhs.shape(),
            rhs: rhs.shape(),
        });
    }
    Ok(())
}
