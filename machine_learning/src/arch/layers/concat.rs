use ndarray::{Array2, ArrayView2, Axis, concatenate, s};

use crate::{MlErr, Result};

/// Merges several incoming layers by concatenating their features.
#[derive(Clone, Debug)]
pub struct Concat {
    dims: Vec<usize>,
}

impl Concat {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn dim(&self) -> usize {
        self.dims.iter().sum()
    }

    pub fn forward(&self, inputs: &[ArrayView2<f32>]) -> Result<Array2<f32>> {
        concatenate(Axis(1), inputs).map_err(|_| MlErr::SizeMismatch {
            what: "concatenated inputs",
            got: inputs.len(),
            expected: self.dims.len(),
        })
    }

    /// Splits the delta back into one delta per incoming layer.
    pub fn backward(&self, d: ArrayView2<f32>) -> Vec<Array2<f32>> {
        let mut start = 0;

        self.dims
            .iter()
            .map(|&dim| {
                let part = d.slice(s![.., start..start + dim]).to_owned();
                start += dim;
                part
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn backward_splits_in_order() {
        let concat = Concat::new(vec![1, 2]);
        let a = array![[1.0f32], [2.0]];
        let b = array![[3.0f32, 4.0], [5.0, 6.0]];

        let out = concat.forward(&[a.view(), b.view()]).unwrap();
        assert_eq!(out, array![[1.0, 3.0, 4.0], [2.0, 5.0, 6.0]]);

        let parts = concat.backward(out.view());
        assert_eq!(parts, vec![a, b]);
    }
}
