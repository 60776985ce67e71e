//! Labeled training data.
//!
//! Examples and labels are row-vector [`Matrix`] values: examples hold standardized
//! features, labels hold one-hot class indicators.

use crate::{Error, Matrix, Result};

/// A supervised dataset: example rows paired with one-hot label rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    examples: Vec<Matrix>,
    labels: Vec<Matrix>,
}

impl Dataset {
    /// Pair `examples` with `labels`.
    ///
    /// Both must be non-empty, equally long, and consist of row vectors sharing one
    /// column count per side.
    pub fn new(examples: Vec<Matrix>, labels: Vec<Matrix>) -> Result<Self> {
        if examples.len() != labels.len() {
            return Err(Error::InvalidData(format!(
                "examples/labels length mismatch: {} vs {}",
                examples.len(),
                labels.len()
            )));
        }
        if examples.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }

        check_rows("example", &examples)?;
        check_rows("label", &labels)?;

        Ok(Self { examples, labels })
    }

    /// Build from plain feature rows and class ids.
    pub fn from_class_ids(rows: &[Vec<f64>], ids: &[usize], num_classes: usize) -> Result<Self> {
        let examples = rows.iter().map(|r| Matrix::row(r.clone())).collect();
        let labels = ids
            .iter()
            .map(|&id| crate::io::one_hot(id, num_classes))
            .collect::<Result<Vec<_>>>()?;
        Self::new(examples, labels)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Returns the per-example feature count.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.examples[0].cols()
    }

    /// Returns the one-hot width.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.labels[0].cols()
    }

    /// Panics if `idx >= len`.
    #[inline]
    pub fn example(&self, idx: usize) -> &Matrix {
        &self.examples[idx]
    }

    /// Panics if `idx >= len`.
    #[inline]
    pub fn label(&self, idx: usize) -> &Matrix {
        &self.labels[idx]
    }

    pub fn examples(&self) -> &[Matrix] {
        &self.examples
    }

    pub fn labels(&self) -> &[Matrix] {
        &self.labels
    }
}

fn check_rows(kind: &str, rows: &[Matrix]) -> Result<()> {
    let cols = rows[0].cols();
    if cols == 0 {
        return Err(Error::InvalidData(format!("{kind} rows must not be empty")));
    }
    for (i, row) in rows.iter().enumerate() {
        if !row.is_row_vector() || row.cols() != cols {
            return Err(Error::InvalidData(format!(
                "{kind} {i} has shape {}x{}, expected 1x{cols}",
                row.rows(),
                row.cols()
            )));
        }
    }
    Ok(())
}
