use ndarray::{Array2, ArrayView2, Axis, Zip};

/// Row-wise softmax. Unlike the other activations it can't be applied element by element,
/// every output depends on the whole row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Softmax;

impl Softmax {
    /// Applies the softmax to every row of `z`.
    ///
    /// # Arguments
    /// * `z` - The pre-activations, one sample per row.
    ///
    /// # Returns
    /// A matrix of the same shape whose rows sum up to one.
    pub fn forward(&self, z: ArrayView2<f32>) -> Array2<f32> {
        let mut a = z.to_owned();

        for mut row in a.rows_mut() {
            let max = row.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
            row.mapv_inplace(|x| (x - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|x| x / sum);
        }

        a
    }

    /// Multiplies the incoming delta by the softmax jacobian, row by row.
    ///
    /// # Arguments
    /// * `a` - The output of the forward pass.
    /// * `d` - The delta with respect to `a`.
    ///
    /// # Returns
    /// The delta with respect to the pre-activations.
    pub fn backward(&self, a: ArrayView2<f32>, d: ArrayView2<f32>) -> Array2<f32> {
        let dot = (&a * &d).sum_axis(Axis(1)).insert_axis(Axis(1));
        let mut dz = Array2::zeros(a.raw_dim());

        Zip::from(&mut dz)
            .and(&a)
            .and(&d)
            .and_broadcast(&dot)
            .for_each(|dz, &a, &d, &dot| *dz = a * (d - dot));

        dz
    }
}
