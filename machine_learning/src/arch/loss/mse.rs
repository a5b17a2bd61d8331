use ndarray::{Array2, ArrayView2, Zip};

use super::LossFn;

/// Squared error averaged over every output of the batch, for regression.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mse;

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let n = y.len().max(1) as f32;
        Zip::from(&y_pred)
            .and(&y)
            .fold(0., |acc, &p, &t| acc + (p - t).powi(2))
            / n
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let scale = 2. / y.len().max(1) as f32;
        Zip::from(&y_pred)
            .and(&y)
            .map_collect(|&p, &t| scale * (p - t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn averages_over_every_output() {
        let y_pred = array![[1.0f32, 2.0], [3.0, 4.0]];
        let y = array![[1.0f32, 0.0], [3.0, 5.0]];

        assert_eq!(Mse.loss(y_pred.view(), y.view()), 1.25);
        assert_eq!(
            Mse.loss_prime(y_pred.view(), y.view()),
            array![[0.0f32, 1.0], [0.0, -0.5]]
        );
    }
}
