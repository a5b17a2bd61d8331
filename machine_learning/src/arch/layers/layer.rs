use std::ops::Range;

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{concat, dense, dropout, input};
use crate::{MlErr, Result, arch::activations::ActFn};

#[derive(Clone, Debug)]
pub enum Layer {
    Input(input::Input),
    Dense(dense::Dense),
    Dropout(dropout::Dropout),
    Concat(concat::Concat),
}
use Layer::*;

impl Layer {
    pub fn input(dim: usize) -> Self {
        Input(input::Input::new(dim))
    }

    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>, bias: f32) -> Self {
        Dense(dense::Dense::new(dim, act_fn, bias))
    }

    pub fn dropout(dim: usize, p: f32) -> Result<Self> {
        Ok(Dropout(dropout::Dropout::new(dim, p)?))
    }

    pub fn concat(dims: Vec<usize>) -> Self {
        Concat(concat::Concat::new(dims))
    }

    /// A short lowercase name of the layer's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Input(_) => "input",
            Dense(_) => "dense",
            Dropout(_) => "dropout",
            Concat(_) => "concat",
        }
    }

    /// Returns the amount of learnable parameters of this layer.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
            Input(_) | Dropout(_) | Concat(_) => 0,
        }
    }

    /// Returns the amount of features this layer outputs per sample.
    pub fn output_dim(&self) -> usize {
        match self {
            Input(l) => l.dim(),
            Dense(l) => l.dim().1,
            Dropout(l) => l.dim(),
            Concat(l) => l.dim(),
        }
    }

    /// The features expected from each incoming layer, in order.
    pub fn input_dims(&self) -> Vec<usize> {
        match self {
            Input(_) => vec![],
            Dense(l) => vec![l.dim().0],
            Dropout(l) => vec![l.dim()],
            Concat(l) => l.dims().to_vec(),
        }
    }

    /// The shapes of this layer's parameter tensors, named the way they're exported.
    pub fn param_shapes(&self) -> Vec<(&'static str, Vec<usize>)> {
        match self {
            Dense(l) => {
                let (n, m) = l.dim();
                vec![("W", vec![n, m]), ("b", vec![m])]
            }
            Input(_) | Dropout(_) | Concat(_) => vec![],
        }
    }

    /// The range of this layer's parameters subject to weight penalties, biases are excluded.
    pub fn regularizable(&self) -> Option<Range<usize>> {
        match self {
            Dense(l) => Some(0..l.weights_len()),
            Input(_) | Dropout(_) | Concat(_) => None,
        }
    }

    /// Samples the initial values for this layer's parameters.
    pub fn init_params<R: Rng>(&self, rng: &mut R) -> Result<Vec<f32>> {
        match self {
            Dense(l) => l.init_params(rng),
            Input(_) | Dropout(_) | Concat(_) => Ok(vec![]),
        }
    }

    /// Makes a forward pass through this layer.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `inputs` - The outputs of the incoming layers, or the network input for `Input`.
    /// * `rng` - The random number generator used by stochastic layers.
    /// * `deterministic` - Whether stochastic layers should behave as when evaluating.
    ///
    /// # Returns
    /// The output of the layer or an error if the inputs don't fit it.
    pub fn forward<R: Rng>(
        &mut self,
        params: &[f32],
        inputs: &[ArrayView2<f32>],
        rng: &mut R,
        deterministic: bool,
    ) -> Result<Array2<f32>> {
        match self {
            Input(l) => l.forward(single(inputs)?),
            Dense(l) => l.forward(params, single(inputs)?),
            Dropout(l) => Ok(l.forward(single(inputs)?, rng, deterministic)),
            Concat(l) => l.forward(inputs),
        }
    }

    /// Makes a backward pass through this layer.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `grad` - This layer's slice of the gradient, overwritten.
    /// * `inputs` - The inputs of the last forward pass.
    /// * `output` - The output of the last forward pass.
    /// * `d` - The delta with respect to the output.
    ///
    /// # Returns
    /// One delta per incoming layer.
    pub fn backward(
        &self,
        params: &[f32],
        grad: &mut [f32],
        inputs: &[ArrayView2<f32>],
        output: ArrayView2<f32>,
        d: ArrayView2<f32>,
    ) -> Result<Vec<Array2<f32>>> {
        let deltas = match self {
            Input(_) => vec![],
            Dense(l) => vec![l.backward(params, grad, single(inputs)?, output, d)?],
            Dropout(l) => vec![l.backward(d)],
            Concat(l) => l.backward(d),
        };

        Ok(deltas)
    }
}

fn single<'b>(inputs: &[ArrayView2<'b, f32>]) -> Result<ArrayView2<'b, f32>> {
    match inputs {
        [x] => Ok(x.clone()),
        _ => Err(MlErr::SizeMismatch {
            what: "layer inputs",
            got: inputs.len(),
            expected: 1,
        }),
    }
}
