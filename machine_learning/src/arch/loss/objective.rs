use std::ops::Range;

use ndarray::{Array2, ArrayView2};

use super::{CategoricalCrossEntropy, LossFn, Mse};

/// The loss functions an objective can be built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Loss {
    Mse(Mse),
    CategoricalCrossEntropy(CategoricalCrossEntropy),
}

impl Loss {
    /// Resolves a loss function by name.
    ///
    /// # Returns
    /// The loss, or `None` if the name is unknown.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mse" | "squared_error" => Some(Self::Mse(Mse)),
            "categorical_crossentropy" => Some(Self::CategoricalCrossEntropy(CategoricalCrossEntropy)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mse(_) => "mse",
            Self::CategoricalCrossEntropy(_) => "categorical_crossentropy",
        }
    }
}

impl LossFn for Loss {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        match self {
            Self::Mse(l) => l.loss(y_pred, y),
            Self::CategoricalCrossEntropy(l) => l.loss(y_pred, y),
        }
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Self::Mse(l) => l.loss_prime(y_pred, y),
            Self::CategoricalCrossEntropy(l) => l.loss_prime(y_pred, y),
        }
    }
}

/// L1 and L2 weight penalties added on top of the data loss.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub l1: f32,
    pub l2: f32,
}

impl Penalty {
    pub fn new(l1: f32, l2: f32) -> Self {
        Self { l1, l2 }
    }

    pub fn is_zero(&self) -> bool {
        self.l1 == 0. && self.l2 == 0.
    }

    /// The penalty over the given parameter ranges.
    pub fn value(&self, params: &[f32], ranges: &[Range<usize>]) -> f32 {
        if self.is_zero() {
            return 0.;
        }

        ranges
            .iter()
            .flat_map(|r| &params[r.clone()])
            .map(|w| self.l1 * w.abs() + self.l2 * w * w)
            .sum()
    }

    /// Adds the penalty gradient over the given parameter ranges into `grad`.
    pub fn add_grad(&self, params: &[f32], grad: &mut [f32], ranges: &[Range<usize>]) {
        if self.is_zero() {
            return;
        }

        for r in ranges {
            for (g, w) in grad[r.clone()].iter_mut().zip(&params[r.clone()]) {
                let sign = if *w > 0. {
                    1.
                } else if *w < 0. {
                    -1.
                } else {
                    0.
                };
                *g += self.l1 * sign + 2. * self.l2 * w;
            }
        }
    }
}

/// What the training minimizes: a loss function and its weight penalties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    loss: Loss,
    penalty: Penalty,
}

impl Objective {
    pub fn new(loss: Loss, penalty: Penalty) -> Self {
        Self { loss, penalty }
    }

    pub fn loss_fn(&self) -> &Loss {
        &self.loss
    }

    pub fn penalty(&self) -> &Penalty {
        &self.penalty
    }
}
