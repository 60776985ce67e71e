use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::optim::Momentum;
use crate::{Dataset, Error, Matrix, Network, Result, loss};

/// Hyperparameters for [`Network::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub weight_decay: f64,
    /// Seeds the per-epoch shuffle.
    pub seed: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 25,
            batch_size: 256,
            learning_rate: 0.01,
            momentum: 0.9,
            weight_decay: 0.0002,
            seed: 0,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        self.optimizer().validate()
    }

    pub fn optimizer(&self) -> Momentum {
        Momentum {
            learning_rate: self.learning_rate,
            momentum: self.momentum,
            weight_decay: self.weight_decay,
        }
    }
}

/// Training statistics for one epoch.
///
/// Measured on the forward passes made while training, so each batch is scored with
/// the weights it saw before its own update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based.
    pub epoch: usize,
    /// Mean cross-entropy.
    pub loss: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub epochs: Vec<EpochReport>,
}

impl FitReport {
    pub fn last(&self) -> Option<&EpochReport> {
        self.epochs.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    pub loss: f64,
    pub accuracy: f64,
}

impl Network {
    /// Train with mini-batch momentum SGD and decoupled weight decay.
    ///
    /// Every epoch reshuffles the whole dataset with an RNG seeded from `cfg.seed`,
    /// splits it into chunks of `cfg.batch_size` (the last may be shorter) and applies
    /// one optimizer step per chunk. Runs exactly `cfg.epochs` epochs.
    pub fn fit(&mut self, train: &Dataset, cfg: FitConfig) -> Result<FitReport> {
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        self.fit_with_rng(train, cfg, &mut rng)
    }

    /// [`Network::fit`] with a caller-provided shuffle RNG (`cfg.seed` is ignored).
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        train: &Dataset,
        cfg: FitConfig,
        rng: &mut R,
    ) -> Result<FitReport> {
        self.check_dataset("train", train)?;
        cfg.validate()?;

        let mut opt = cfg.optimizer().state(self)?;
        let mut grad_sum: Vec<Matrix> = self
            .layers()
            .iter()
            .map(|l| {
                let (rows, cols) = l.weights().shape();
                Matrix::zeros(rows, cols)
            })
            .collect();
        let mut order: Vec<usize> = (0..train.len()).collect();

        debug!(
            examples = train.len(),
            batch_size = cfg.batch_size,
            epochs = cfg.epochs,
            "starting fit"
        );

        let mut epochs = Vec::with_capacity(cfg.epochs);
        for epoch in 1..=cfg.epochs {
            order.shuffle(&mut *rng);

            let mut total_loss = 0.0;
            let mut hits = 0usize;
            for batch in order.chunks(cfg.batch_size) {
                for g in &mut grad_sum {
                    g.as_mut_slice().fill(0.0);
                }

                for &idx in batch {
                    let label = train.label(idx);
                    let out = self.forward(train.example(idx))?;
                    total_loss += loss::cross_entropy(out, label)?;
                    if out.argmax()? == label.argmax()? {
                        hits += 1;
                    }

                    let grads = self.backward(label)?;
                    for (acc, g) in grad_sum.iter_mut().zip(&grads) {
                        acc.add_in_place(g)?;
                    }
                }

                opt.step(self, &grad_sum, batch.len())?;
            }

            let n = train.len() as f64;
            let report = EpochReport {
                epoch,
                loss: total_loss / n,
                accuracy: hits as f64 / n,
            };
            info!(
                epoch = report.epoch,
                loss = report.loss,
                accuracy = report.accuracy,
                "epoch complete"
            );
            epochs.push(report);
        }

        info!(epochs = cfg.epochs, "fit finished");
        Ok(FitReport { epochs })
    }

    /// Mean cross-entropy and accuracy over `data`, without updating weights.
    pub fn evaluate(&mut self, data: &Dataset) -> Result<EvalReport> {
        self.check_dataset("eval", data)?;

        let mut total_loss = 0.0;
        let mut hits = 0usize;
        for (x, y) in data.examples().iter().zip(data.labels()) {
            let out = self.forward(x)?;
            total_loss += loss::cross_entropy(out, y)?;
            if out.argmax()? == y.argmax()? {
                hits += 1;
            }
        }

        let n = data.len() as f64;
        Ok(EvalReport {
            loss: total_loss / n,
            accuracy: hits as f64 / n,
        })
    }

    fn check_dataset(&self, name: &str, data: &Dataset) -> Result<()> {
        if data.input_dim() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "{name} input_dim {} does not match network input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.num_classes() != self.output_dim() {
            return Err(Error::InvalidData(format!(
                "{name} num_classes {} does not match network output_dim {}",
                data.num_classes(),
                self.output_dim()
            )));
        }
        Ok(())
    }
}
