use ndarray::{Array2, ArrayView2};

use crate::{MlErr, Result};

/// The entry point of a graph, it forwards the data fed to the network.
#[derive(Clone, Debug)]
pub struct Input {
    dim: usize,
}

impl Input {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Checks that `x` has the expected amount of features and copies it.
    pub fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim {
            return Err(MlErr::SizeMismatch {
                what: "input features",
                got: x.ncols(),
                expected: self.dim,
            });
        }

        Ok(x.to_owned())
    }
}
