use ndarray::{Array2, ArrayView2, Zip};

use super::LossFn;

const EPS: f32 = 1e-7;

/// Categorical cross entropy between predicted probabilities and one-hot targets, averaged over
/// the samples of the batch.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for CategoricalCrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let n = y_pred.nrows().max(1) as f32;
        let mut total = 0.;

        Zip::from(&y_pred).and(&y).for_each(|&p, &t| {
            total -= t * p.clamp(EPS, 1. - EPS).ln();
        });

        total / n
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let n = y_pred.nrows().max(1) as f32;
        let mut d = Array2::zeros(y_pred.raw_dim());

        Zip::from(&mut d)
            .and(&y_pred)
            .and(&y)
            .for_each(|d, &p, &t| *d = -t / (p.clamp(EPS, 1. - EPS) * n));

        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn perfect_prediction_has_almost_no_loss() {
        let y = array![[0.0f32, 1.0], [1.0, 0.0]];
        let loss = CategoricalCrossEntropy.loss(y.view(), y.view());
        assert!(loss < 1e-5);
    }

    #[test]
    fn uniform_prediction_costs_ln_of_classes() {
        let y_pred = array![[0.25f32, 0.25, 0.25, 0.25]];
        let y = array![[0.0f32, 0.0, 1.0, 0.0]];
        let loss = CategoricalCrossEntropy.loss(y_pred.view(), y.view());
        assert!((loss - 4f32.ln()).abs() < 1e-5);
    }
}
