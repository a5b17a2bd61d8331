use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::{MlErr, Result};

/// Randomly zeroes out inputs while training, scaling the survivors by `1 / (1 - p)` so the
/// expected activation is kept. It's the identity when evaluating.
#[derive(Clone, Debug)]
pub struct Dropout {
    dim: usize,
    p: f32,
    mask: Option<Array2<f32>>,
}

impl Dropout {
    /// Creates a new `Dropout` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of units flowing through.
    /// * `p` - The probability of dropping a unit, in `[0, 1)`.
    pub fn new(dim: usize, p: f32) -> Result<Self> {
        if !(0.0..1.0).contains(&p) {
            return Err(MlErr::InvalidHyperparameter { name: "p", value: p });
        }

        Ok(Self { dim, p, mask: None })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn p(&self) -> f32 {
        self.p
    }

    pub fn forward<R: Rng>(
        &mut self,
        x: ArrayView2<f32>,
        rng: &mut R,
        deterministic: bool,
    ) -> Array2<f32> {
        if deterministic || self.p == 0. {
            self.mask = None;
            return x.to_owned();
        }

        let keep = 1. - self.p;
        let mask = Array2::from_shape_fn(x.raw_dim(), |_| {
            if rng.random::<f32>() < keep { 1. / keep } else { 0. }
        });

        let a = &x * &mask;
        self.mask = Some(mask);
        a
    }

    pub fn backward(&self, d: ArrayView2<f32>) -> Array2<f32> {
        match &self.mask {
            Some(mask) => &d * mask,
            None => d.to_owned(),
        }
    }
}
