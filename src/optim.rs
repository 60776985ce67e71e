//! Mini-batch momentum optimizer with decoupled weight decay.
//!
//! Per weight layer `i`, after a batch of `n` examples whose descent directions sum to
//! `g[i]`:
//!
//! ```text
//! v[i] = (lr / n) * g[i] + momentum * v[i]
//! W[i] = W[i] * (1 - weight_decay) + v[i]
//! ```
//!
//! `n` is the realized batch length, so a short final batch is not under-weighted.
//! Optimizer state lives outside the network; the training loop owns it.

use crate::{Error, Matrix, Network, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    pub learning_rate: f64,
    pub momentum: f64,
    pub weight_decay: f64,
}

impl Momentum {
    pub fn new(learning_rate: f64, momentum: f64, weight_decay: f64) -> Result<Self> {
        let opt = Self {
            learning_rate,
            momentum,
            weight_decay,
        };
        opt.validate()?;
        Ok(opt)
    }

    /// Validate hyperparameters.
    pub fn validate(self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && (0.0..1.0).contains(&self.momentum)) {
            return Err(Error::InvalidConfig(format!(
                "momentum must be finite and in [0,1), got {}",
                self.momentum
            )));
        }
        if !(self.weight_decay.is_finite() && (0.0..1.0).contains(&self.weight_decay)) {
            return Err(Error::InvalidConfig(format!(
                "weight_decay must be finite and in [0,1), got {}",
                self.weight_decay
            )));
        }
        Ok(())
    }

    /// Allocate zeroed velocity buffers for `network`.
    pub fn state(self, network: &Network) -> Result<OptimizerState> {
        self.validate()?;
        let velocity = network
            .layers()
            .iter()
            .map(|l| {
                let (rows, cols) = l.weights().shape();
                Matrix::zeros(rows, cols)
            })
            .collect();
        Ok(OptimizerState {
            config: self,
            velocity,
        })
    }
}

/// Owned optimizer state: one velocity matrix per weight layer.
#[derive(Debug, Clone)]
pub struct OptimizerState {
    config: Momentum,
    velocity: Vec<Matrix>,
}

impl OptimizerState {
    pub fn velocity(&self) -> &[Matrix] {
        &self.velocity
    }

    /// Apply one update from the summed descent directions of a batch of
    /// `batch_len` examples.
    ///
    /// Shapes are checked for every layer before any weight moves, so an error leaves
    /// the network and the velocities untouched.
    pub fn step(
        &mut self,
        network: &mut Network,
        grad_sum: &[Matrix],
        batch_len: usize,
    ) -> Result<()> {
        if batch_len == 0 {
            return Err(Error::InvalidData("batch_len must be > 0".to_owned()));
        }
        if grad_sum.len() != self.velocity.len() || network.num_layers() != self.velocity.len() {
            return Err(Error::InvalidData(format!(
                "expected {} gradient layers, got {} (network has {})",
                self.velocity.len(),
                grad_sum.len(),
                network.num_layers()
            )));
        }

        for (v, g) in self.velocity.iter().zip(grad_sum) {
            if g.shape() != v.shape() {
                return Err(Error::ShapeMismatch {
                    op: "optimizer step",
                    lhs: v.shape(),
                    rhs: g.shape(),
                });
            }
        }

        let Momentum {
            learning_rate,
            momentum,
            weight_decay,
        } = self.config;
        let rate = learning_rate / batch_len as f64;

        for ((layer, v), g) in network
            .layers_mut()
            .iter_mut()
            .zip(&mut self.velocity)
            .zip(grad_sum)
        {
            for (v, &g) in v.as_mut_slice().iter_mut().zip(g.as_slice()) {
                *v = rate * g + momentum * *v;
            }

            layer.weights_mut().scale(1.0 - weight_decay).add_in_place(v)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activation, Layer};

    fn one_weight_network(w: f64, b: f64) -> Network {
        let weights = Matrix::from_rows(&[vec![w, 0.0], vec![b, 0.0]]).unwrap();
        let layer = Layer::from_parts(weights, Activation::Softmax).unwrap();
        Network::from_layers(vec![layer]).unwrap()
    }

    #[test]
    fn validation_rejects_bad_hyperparams() {
        assert!(Momentum::new(-0.1, 0.9, 0.0).is_err());
        assert!(Momentum::new(f64::NAN, 0.9, 0.0).is_err());
        assert!(Momentum::new(0.1, 1.0, 0.0).is_err());
        assert!(Momentum::new(0.1, -0.1, 0.0).is_err());
        assert!(Momentum::new(0.1, 0.9, 1.0).is_err());
        assert!(Momentum::new(0.0, 0.0, 0.5).is_ok());
    }

    #[test]
    fn step_blends_velocity_and_scales_by_realized_batch() {
        let mut net = one_weight_network(1.0, 2.0);
        let mut opt = Momentum::new(0.5, 0.5, 0.0).unwrap().state(&net).unwrap();

        let g = Matrix::from_rows(&[vec![4.0, 0.0], vec![-2.0, 0.0]]).unwrap();

        // v = (0.5 / 2) * g = [1, -0.5]
        opt.step(&mut net, std::slice::from_ref(&g), 2).unwrap();
        let w = net.layer(0).unwrap().weights();
        assert_eq!(w[(0, 0)], 2.0);
        assert_eq!(w[(1, 0)], 1.5);

        // v = 0.5 * g + 0.5 * v = [2.5, -1.25]
        opt.step(&mut net, std::slice::from_ref(&g), 1).unwrap();
        let w = net.layer(0).unwrap().weights();
        assert_eq!(opt.velocity()[0][(0, 0)], 2.5);
        assert_eq!(w[(0, 0)], 4.5);
        assert_eq!(w[(1, 0)], 0.25);
    }

    #[test]
    fn decay_applies_before_velocity() {
        let mut net = one_weight_network(2.0, -4.0);
        let mut opt = Momentum::new(1.0, 0.0, 0.5).unwrap().state(&net).unwrap();
        let g = Matrix::from_rows(&[vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();

        opt.step(&mut net, &[g], 1).unwrap();
        let w = net.layer(0).unwrap().weights();
        assert_eq!(w[(0, 0)], 2.0);
        assert_eq!(w[(1, 0)], -1.0);
    }

    #[test]
    fn step_rejects_mismatched_gradients() {
        let mut net = one_weight_network(1.0, 1.0);
        let mut opt = Momentum::new(0.1, 0.0, 0.0).unwrap().state(&net).unwrap();
        assert!(opt.step(&mut net, &[], 1).is_err());
        assert!(opt.step(&mut net, &[Matrix::zeros(1, 1)], 1).is_err());
        assert!(opt.step(&mut net, &[Matrix::zeros(2, 2)], 0).is_err());
    }

    #[test]
    fn failed_step_leaves_every_layer_untouched() {
        let hidden = Layer::from_parts(
            Matrix::from_rows(&[vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap(),
            Activation::Tanh,
        )
        .unwrap();
        let output = Layer::from_parts(
            Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]]).unwrap(),
            Activation::Softmax,
        )
        .unwrap();
        let mut net = Network::from_layers(vec![hidden, output]).unwrap();
        let mut opt = Momentum::new(1.0, 0.0, 0.5).unwrap().state(&net).unwrap();
        let before: Vec<Matrix> = net.layers().iter().map(|l| l.weights().clone()).collect();

        let good = Matrix::from_rows(&[vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let bad = Matrix::zeros(1, 1);
        let err = opt.step(&mut net, &[good, bad], 1).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));

        for (layer, old) in net.layers().iter().zip(&before) {
            assert_eq!(layer.weights(), old);
        }
        assert!(opt.velocity().iter().all(|v| v.iter().all(|&x| x == 0.0)));
    }
}
