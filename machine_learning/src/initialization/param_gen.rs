use crate::{MlErr, Result};

/// Produces the initial values of a layer's parameters, up to a fixed amount.
pub trait ParamGen {
    /// Draws the next `n` values, fewer once the generator is running out.
    ///
    /// # Returns
    /// `None` once the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;

    /// Draws exactly `n` values.
    ///
    /// # Returns
    /// An error if the generator can't produce that many.
    fn sample_exact(&mut self, n: usize) -> Result<Vec<f32>> {
        let values = match self.sample(n) {
            Some(values) => values,
            None if n == 0 => vec![],
            None => return Err(MlErr::SizeMismatch {
                what: "initial parameters",
                got: 0,
                expected: n,
            }),
        };

        if values.len() != n {
            return Err(MlErr::SizeMismatch {
                what: "initial parameters",
                got: values.len(),
                expected: n,
            });
        }

        Ok(values)
    }
}
