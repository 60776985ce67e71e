use crate::{Activation, Error, Layer, Matrix, Result, loss};

/// A dense feed-forward classifier.
///
/// Owns one [`Layer`] per weight transition and the [`Scratch`] caches filled by
/// [`Network::forward`] and consumed by [`Network::backward`]. Both take `&mut self`,
/// so a single instance can never interleave two passes.
#[derive(Debug, Clone)]
pub struct Network {
    sizes: Vec<usize>,
    layers: Vec<Layer>,
    scratch: Scratch,
}

/// Per-example caches reused across every forward/backward pair.
///
/// Only the most recent example is held; nothing carries over between unrelated
/// passes.
#[derive(Debug, Clone)]
pub struct Scratch {
    /// `outputs[l]` is the post-activation row of layer `l` with a bias `1` appended,
    /// except the final layer, which is stored without it.
    outputs: Vec<Matrix>,
    /// Activation derivative at the potentials of each hidden layer.
    potential_derivatives: Vec<Matrix>,
    /// Backward error signal at the potentials of each non-input layer.
    partial_derivatives: Vec<Matrix>,
    has_forward: bool,
}

impl Network {
    /// Assemble a network from its weight transitions.
    ///
    /// Consecutive layers must agree on their dimensions. The output layer must use
    /// [`Activation::Softmax`] and no hidden layer may, because backprop seeds the error
    /// with the softmax + cross-entropy shortcut (see [`crate::loss`]).
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        let Some(last) = layers.last() else {
            return Err(Error::InvalidConfig(
                "network must have at least one layer".to_owned(),
            ));
        };
        if last.activation() != Activation::Softmax {
            return Err(Error::InvalidConfig(format!(
                "output activation must be Softmax, got {:?}",
                last.activation()
            )));
        }

        let mut sizes = Vec::with_capacity(layers.len() + 1);
        sizes.push(layers[0].in_dim());
        for (i, layer) in layers.iter().enumerate() {
            if layer.in_dim() != sizes[i] {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} in_dim {} does not match previous out_dim {}",
                    layer.in_dim(),
                    sizes[i]
                )));
            }
            if i + 1 < layers.len() && !layer.activation().is_elementwise() {
                return Err(Error::InvalidConfig(format!(
                    "hidden layer {i} cannot use {:?}",
                    layer.activation()
                )));
            }
            sizes.push(layer.out_dim());
        }

        let scratch = Scratch::new(&sizes);
        Ok(Self {
            sizes,
            layers,
            scratch,
        })
    }

    /// Layer sizes, input first, output last.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.sizes[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// Number of weight transitions (`sizes().len() - 1`).
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// Weights of transition `idx`, bias row last.
    pub fn weights(&self, idx: usize) -> Option<&Matrix> {
        self.layers.get(idx).map(Layer::weights)
    }

    /// Cells of transition `idx` in row-major order, for in-place edits. The shape is
    /// fixed at construction.
    pub fn weights_mut(&mut self, idx: usize) -> Option<&mut [f64]> {
        self.layers
            .get_mut(idx)
            .map(|layer| layer.weights_mut().as_mut_slice())
    }

    pub fn activation(&self, idx: usize) -> Option<Activation> {
        self.layers.get(idx).map(Layer::activation)
    }

    /// Cached layer outputs of the latest forward pass; see [`Scratch::outputs`].
    pub fn outputs(&self) -> &[Matrix] {
        self.scratch.outputs()
    }

    /// Forward pass for a single example.
    ///
    /// `input` must be a row vector with `input_dim()` columns. Overwrites the output and
    /// derivative caches and returns the output distribution (bias stripped).
    pub fn forward(&mut self, input: &Matrix) -> Result<&Matrix> {
        if input.shape() != (1, self.input_dim()) {
            return Err(Error::ShapeMismatch {
                op: "forward",
                lhs: input.shape(),
                rhs: (1, self.input_dim()),
            });
        }

        let scratch = &mut self.scratch;
        let mut with_bias = input.clone();
        with_bias.add_val(1.0)?;
        scratch.outputs[0] = with_bias;

        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            let act = layer.activation();
            let mut potential = scratch.outputs[i].matmul(layer.weights())?;
            let mut out = act.apply(&potential)?;

            if i < last {
                out.add_val(1.0)?;
                act.derivative_in_place(&mut potential);
                scratch.potential_derivatives[i] = potential;
            }
            scratch.outputs[i + 1] = out;
        }

        scratch.has_forward = true;
        Ok(scratch.output())
    }

    /// Backward pass for the example last passed to [`Network::forward`].
    ///
    /// `desired` is the one-hot target row. Returns one matrix per weight layer, shaped
    /// like that layer's weights, holding the descent direction `-dL/dW` for the
    /// cross-entropy loss.
    pub fn backward(&mut self, desired: &Matrix) -> Result<Vec<Matrix>> {
        let scratch = &mut self.scratch;
        if !scratch.has_forward {
            return Err(Error::InvalidData(
                "backward requires a preceding forward pass".to_owned(),
            ));
        }

        let n = self.layers.len();
        scratch.partial_derivatives[n - 1] =
            loss::softmax_cross_entropy_delta(desired, &scratch.outputs[n])?;

        for i in (0..n - 1).rev() {
            let next = &scratch.partial_derivatives[i + 1];
            let mut delta = self.layers[i + 1]
                .weights()
                .matmul(&next.transpose())?
                .transpose();
            // The bias unit has no incoming weights.
            delta.remove_last()?;
            delta.hadamard_product(&scratch.potential_derivatives[i])?;
            scratch.partial_derivatives[i] = delta;
        }

        Ok(scratch
            .outputs
            .iter()
            .zip(&scratch.partial_derivatives)
            .map(|(out, delta)| out.transpose().kronecker_product(delta))
            .collect())
    }

    /// `forward` followed by `backward` for one example.
    pub fn example_gradient(&mut self, input: &Matrix, desired: &Matrix) -> Result<Vec<Matrix>> {
        self.forward(input)?;
        self.backward(desired)
    }

    /// Index of the largest output; ties go to the lowest index.
    pub fn predict(&mut self, example: &Matrix) -> Result<usize> {
        self.forward(example)?.argmax()
    }

    /// [`Network::predict`] over `examples`, in input order.
    pub fn make_predictions(&mut self, examples: &[Matrix]) -> Result<Vec<usize>> {
        examples.iter().map(|x| self.predict(x)).collect()
    }
}

impl Scratch {
    fn new(sizes: &[usize]) -> Self {
        let last = sizes.len() - 1;
        let outputs = sizes
            .iter()
            .enumerate()
            .map(|(l, &s)| Matrix::zeros(1, if l == last { s } else { s + 1 }))
            .collect();
        let potential_derivatives = sizes[1..last].iter().map(|&s| Matrix::zeros(1, s)).collect();
        let partial_derivatives = sizes[1..].iter().map(|&s| Matrix::zeros(1, s)).collect();

        Self {
            outputs,
            potential_derivatives,
            partial_derivatives,
            has_forward: false,
        }
    }

    #[inline]
    pub fn output(&self) -> &Matrix {
        &self.outputs[self.outputs.len() - 1]
    }

    pub fn outputs(&self) -> &[Matrix] {
        &self.outputs
    }

    pub fn potential_derivatives(&self) -> &[Matrix] {
        &self.potential_derivatives
    }

    pub fn partial_derivatives(&self) -> &[Matrix] {
        &self.partial_derivatives
    }
}
