use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// What a network is fitted to: class labels for classifiers, values for regressors.
#[derive(Clone, Debug, PartialEq)]
pub enum Targets {
    Classes(Array1<i64>),
    Values(Array2<f32>),
}

impl Targets {
    pub fn len(&self) -> usize {
        match self {
            Self::Classes(y) => y.len(),
            Self::Values(y) => y.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn classes(&self) -> Option<ArrayView1<'_, i64>> {
        match self {
            Self::Classes(y) => Some(y.view()),
            Self::Values(_) => None,
        }
    }

    pub fn values(&self) -> Option<ArrayView2<'_, f32>> {
        match self {
            Self::Classes(_) => None,
            Self::Values(y) => Some(y.view()),
        }
    }

    /// The samples at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        match self {
            Self::Classes(y) => Self::Classes(y.select(Axis(0), indices)),
            Self::Values(y) => Self::Values(y.select(Axis(0), indices)),
        }
    }
}

impl From<Array1<i64>> for Targets {
    fn from(y: Array1<i64>) -> Self {
        Self::Classes(y)
    }
}

impl From<Vec<i64>> for Targets {
    fn from(y: Vec<i64>) -> Self {
        Self::Classes(Array1::from(y))
    }
}

impl From<Array2<f32>> for Targets {
    fn from(y: Array2<f32>) -> Self {
        Self::Values(y)
    }
}
