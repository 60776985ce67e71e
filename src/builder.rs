//! Network builder.
//!
//! `NetworkBuilder` is the recommended way to define a network. It makes the topology
//! explicit (layer sizes + one activation per non-input layer) and draws the initial
//! weights from a caller-owned, seedable RNG so runs are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::{Activation, Error, Layer, Network, Result};

#[derive(Debug, Clone, Copy)]
struct LayerSpec {
    size: usize,
    activation: Activation,
}

#[derive(Debug, Clone)]
/// Builder for a `Network`.
///
/// Example:
///
/// ```rust
/// use dense_mlp::{Activation, NetworkBuilder};
///
/// # fn main() -> dense_mlp::Result<()> {
/// let net = NetworkBuilder::new(784)?
///     .add_layer(100, Activation::selu())?
///     .add_layer(10, Activation::Softmax)?
///     .build_with_seed(0)?;
/// assert_eq!(net.sizes(), &[784, 100, 10]);
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    input_dim: usize,
    layers: Vec<LayerSpec>,
}

impl NetworkBuilder {
    /// Start building a network that accepts rows of `input_dim` features.
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidConfig("input_dim must be > 0".to_owned()));
        }
        Ok(Self {
            input_dim,
            layers: Vec::new(),
        })
    }

    /// Convenience constructor from a sizes list + activations.
    ///
    /// `sizes` includes input and output dimensions, so its length must be at least 2.
    /// `activations` must have length `sizes.len() - 1`.
    pub fn from_sizes(sizes: &[usize], activations: &[Activation]) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "sizes must include input and output dims".to_owned(),
            ));
        }
        if activations.len() != sizes.len() - 1 {
            return Err(Error::InvalidConfig(format!(
                "activations length {} does not match sizes.len() - 1 ({})",
                activations.len(),
                sizes.len() - 1
            )));
        }

        let mut b = Self::new(sizes[0])?;
        for (&size, &act) in sizes[1..].iter().zip(activations) {
            b = b.add_layer(size, act)?;
        }
        Ok(b)
    }

    /// Add a layer of `size` units using `activation`.
    pub fn add_layer(mut self, size: usize, activation: Activation) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig("layer size must be > 0".to_owned()));
        }
        activation.validate()?;

        self.layers.push(LayerSpec { size, activation });
        Ok(self)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        if self.layers.is_empty() {
            return Err(Error::InvalidConfig(
                "network must have at least one layer besides the input".to_owned(),
            ));
        }

        let mut layers = Vec::with_capacity(self.layers.len());
        let mut in_dim = self.input_dim;
        for spec in self.layers {
            layers.push(Layer::new_with_rng(in_dim, spec.size, spec.activation, rng)?);
            in_dim = spec.size;
        }

        let network = Network::from_layers(layers)?;
        debug!(sizes = ?network.sizes(), "built network");
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_sizes_validates_lengths() {
        assert!(NetworkBuilder::from_sizes(&[3], &[]).is_err());
        assert!(NetworkBuilder::from_sizes(&[3, 2], &[]).is_err());
        assert!(
            NetworkBuilder::from_sizes(&[3, 0, 2], &[Activation::selu(), Activation::Softmax])
                .is_err()
        );
        assert!(NetworkBuilder::new(0).is_err());
    }

    #[test]
    fn build_requires_an_output_layer() {
        assert!(NetworkBuilder::new(3).unwrap().build_with_seed(0).is_err());
    }

    #[test]
    fn weights_have_bias_row() {
        let net = NetworkBuilder::from_sizes(
            &[784, 100, 100, 10],
            &[Activation::selu(), Activation::selu(), Activation::Softmax],
        )
        .unwrap()
        .build_with_seed(0)
        .unwrap();

        let shapes: Vec<_> = net.layers().iter().map(|l| l.weights().shape()).collect();
        assert_eq!(shapes, vec![(785, 100), (101, 100), (101, 10)]);
        assert_eq!(net.input_dim(), 784);
        assert_eq!(net.output_dim(), 10);
        assert_eq!(net.num_layers(), 3);
    }

    #[test]
    fn rejects_non_softmax_output() {
        let res = NetworkBuilder::from_sizes(&[2, 2], &[Activation::selu()])
            .unwrap()
            .build_with_seed(0);
        assert!(matches!(res, Err(Error::InvalidConfig(_))));
    }
}
