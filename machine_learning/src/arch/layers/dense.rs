use ndarray::{linalg, prelude::*};
use rand::Rng;

use crate::{
    MlErr, Result,
    arch::activations::ActFn,
    initialization::{ConstParamGen, ParamGen, RandParamGen},
};

/// A fully connected layer: `a = f(x · W + b)`.
///
/// The parameters are laid out as the row major `W` of shape `(in, out)` followed by `b`.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    bias: f32,
    size: usize,

    // Forward metadata
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of input and output units.
    /// * `act_fn` - The nonlinearity, `None` outputs the pre-activations.
    /// * `bias` - The constant the biases are initialized with.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>, bias: f32) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            bias,
            z: Array2::zeros((0, dim.1)),
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn act_fn(&self) -> Option<&ActFn> {
        self.act_fn.as_ref()
    }

    /// The amount of weights, the biases come right after them.
    pub fn weights_len(&self) -> usize {
        self.size - self.dim.1
    }

    /// Samples the initial weights with Glorot uniform and the biases with a constant.
    pub fn init_params<R: Rng>(&self, rng: &mut R) -> Result<Vec<f32>> {
        let (fan_in, fan_out) = self.dim;
        let w_len = self.weights_len();

        let mut params =
            RandParamGen::glorot_uniform(rng, w_len, fan_in, fan_out)?.sample_exact(w_len)?;
        params.extend(ConstParamGen::new(self.bias, fan_out).sample_exact(fan_out)?);

        Ok(params)
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (w, b) = self.view_params(params)?;

        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        let a = match &self.act_fn {
            Some(act_fn) => act_fn.forward(z.view()),
            None => z.clone(),
        };

        self.z = z;
        Ok(a)
    }

    /// Writes the gradient of this layer's parameters into `grad` and returns the delta with
    /// respect to its input.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `grad` - This layer's slice of the gradient.
    /// * `x` - The input of the last forward pass.
    /// * `a` - The output of the last forward pass.
    /// * `d` - The delta with respect to the output.
    pub fn backward(
        &self,
        params: &[f32],
        grad: &mut [f32],
        x: ArrayView2<f32>,
        a: ArrayView2<f32>,
        d: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        let d = match &self.act_fn {
            Some(act_fn) => act_fn.backward(self.z.view(), a, d),
            None => d.to_owned(),
        };

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        let len = grad.len();
        if len != self.size {
            return Err(self.mismatch(len));
        }

        let (dw_raw, db_raw) = grad.split_at_mut(self.weights_len());
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.mismatch(len))?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).map_err(|_| self.mismatch(len))?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    pub fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        if params.len() != self.size {
            return Err(self.mismatch(params.len()));
        }

        let w_size = self.weights_len();
        let weights = ArrayView2::from_shape(self.dim, &params[..w_size])
            .map_err(|_| self.mismatch(params.len()))?;
        let biases = ArrayView1::from_shape(self.dim.1, &params[w_size..])
            .map_err(|_| self.mismatch(params.len()))?;
        Ok((weights, biases))
    }

    fn mismatch(&self, got: usize) -> MlErr {
        MlErr::SizeMismatch {
            what: "dense layer parameters",
            got,
            expected: self.size,
        }
    }
}
