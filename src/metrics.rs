//! Metrics.
//!
//! Evaluation helpers; they do not participate in backprop.

use crate::{Error, Matrix, Result};

/// Fraction of `predictions` equal to the argmax of the matching one-hot label.
pub fn accuracy(predictions: &[usize], labels: &[Matrix]) -> Result<f64> {
    if predictions.len() != labels.len() {
        return Err(Error::InvalidData(format!(
            "predictions/labels length mismatch: {} vs {}",
            predictions.len(),
            labels.len()
        )));
    }
    if predictions.is_empty() {
        return Err(Error::InvalidData(
            "accuracy needs at least one prediction".to_owned(),
        ));
    }

    let mut hits = 0usize;
    for (&pred, label) in predictions.iter().zip(labels) {
        if pred == label.argmax()? {
            hits += 1;
        }
    }
    Ok(hits as f64 / predictions.len() as f64)
}
