use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{Activation, Error, Matrix, Result};

/// One weight transition between two adjacent layers.
///
/// The weight matrix has shape `(in_dim + 1, out_dim)`: the last row holds the bias,
/// which the forward pass feeds with a constant `1` appended to the input.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    activation: Activation,
}

impl Layer {
    /// Gaussian init with variance chosen by `activation`.
    ///
    /// The bias row counts towards `fan_in`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }
        activation.validate()?;

        let fan_in = in_dim + 1;
        let std_dev = activation.weight_init_variance(fan_in, out_dim).sqrt();
        let normal = Normal::new(0.0, std_dev)
            .map_err(|e| Error::InvalidConfig(format!("weight init: {e}")))?;
        let weights = Matrix::from_fn(fan_in, out_dim, || normal.sample(&mut *rng));

        Ok(Self {
            weights,
            activation,
        })
    }

    /// Build a layer from an existing weight matrix (bias row last).
    pub fn from_parts(weights: Matrix, activation: Activation) -> Result<Self> {
        if weights.rows() < 2 || weights.cols() == 0 {
            return Err(Error::InvalidConfig(format!(
                "weights must be at least 2x1 (one input row plus the bias row), got {}x{}",
                weights.rows(),
                weights.cols()
            )));
        }
        activation.validate()?;
        Ok(Self {
            weights,
            activation,
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.weights.rows() - 1
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.weights.cols()
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    #[inline]
    pub(crate) fn weights_mut(&mut self) -> &mut Matrix {
        &mut self.weights
    }
}
