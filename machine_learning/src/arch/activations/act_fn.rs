use ndarray::{Array2, ArrayView2, Zip};

use super::{rectify, sigmoid, softmax, tanh};

/// The nonlinearity applied to the output of a layer.
#[derive(Clone, Debug, PartialEq)]
pub enum ActFn {
    Rectify(rectify::Rectify),
    Sigmoid(sigmoid::Sigmoid),
    Softmax(softmax::Softmax),
    Tanh(tanh::Tanh),
}
use ActFn::*;

impl ActFn {
    pub fn rectify() -> Self {
        Rectify(rectify::Rectify)
    }

    pub fn sigmoid(amp: f32) -> Self {
        Sigmoid(sigmoid::Sigmoid::new(amp))
    }

    pub fn softmax() -> Self {
        Softmax(softmax::Softmax)
    }

    pub fn tanh() -> Self {
        Tanh(tanh::Tanh)
    }

    /// Resolves a nonlinearity by name. `identity` and `linear` resolve to `Ok(None)`, meaning
    /// the layer outputs its pre-activations as is.
    ///
    /// # Arguments
    /// * `name` - The name of the nonlinearity.
    ///
    /// # Returns
    /// The activation function, or `Err` with the unknown name.
    pub fn from_name(name: &str) -> std::result::Result<Option<Self>, String> {
        let act_fn = match name {
            "identity" | "linear" => return Ok(None),
            "rectify" | "relu" => Self::rectify(),
            "sigmoid" => Self::sigmoid(1.),
            "softmax" => Self::softmax(),
            "tanh" => Self::tanh(),
            other => return Err(other.to_string()),
        };

        Ok(Some(act_fn))
    }

    /// Applies the function over the pre-activations `z`.
    pub fn forward(&self, z: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Rectify(a) => z.mapv(|z| a.f(z)),
            Sigmoid(a) => z.mapv(|z| a.f(z)),
            Tanh(a) => z.mapv(|z| a.f(z)),
            Softmax(a) => a.forward(z),
        }
    }

    /// Turns the delta with respect to the activations into the delta with respect to the
    /// pre-activations.
    ///
    /// # Arguments
    /// * `z` - The pre-activations of the forward pass.
    /// * `a` - The activations of the forward pass.
    /// * `d` - The delta with respect to `a`.
    pub fn backward(
        &self,
        z: ArrayView2<f32>,
        a: ArrayView2<f32>,
        d: ArrayView2<f32>,
    ) -> Array2<f32> {
        let elementwise = |df: &dyn Fn(f32) -> f32| {
            let mut dz = d.to_owned();
            Zip::from(&mut dz).and(&z).for_each(|d, &z| *d *= df(z));
            dz
        };

        match self {
            Rectify(f) => elementwise(&|z| f.df(z)),
            Sigmoid(f) => elementwise(&|z| f.df(z)),
            Tanh(f) => elementwise(&|z| f.df(z)),
            Softmax(f) => f.backward(a, d),
        }
    }
}
