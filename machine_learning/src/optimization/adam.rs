use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Adam: steps scaled by bias corrected running averages of the gradient and its square.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: i32,
    m: Box<[f32]>,
    v: Box<[f32]>,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1` - The decay of the gradient's running average.
    /// * `beta2` - The decay of the squared gradient's running average.
    /// * `epsilon` - Keeps the step finite when the squared average is close to zero.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
            m: vec![0.; len].into_boxed_slice(),
            v: vec![0.; len].into_boxed_slice(),
        }
    }

    /// The amount of steps taken so far.
    pub fn steps(&self) -> i32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_sizes(params, grad)?;
        check_sizes(&self.m, grad)?;

        self.t += 1;
        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);
        let a_t = self.learning_rate * (1. - b2.powi(self.t)).sqrt() / (1. - b1.powi(self.t));

        for (i, (p, &g)) in params.iter_mut().zip(grad).enumerate() {
            let m = &mut self.m[i];
            let v = &mut self.v[i];

            *m = b1 * *m + (1. - b1) * g;
            *v = b2 * *v + (1. - b2) * g * g;
            *p -= a_t * *m / (v.sqrt() + eps);
        }

        Ok(())
    }
}
