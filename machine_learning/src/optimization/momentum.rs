use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// The velocity both momentum rules keep per parameter: `v = mu * v - lr * g`.
#[derive(Debug, Clone)]
struct Velocity {
    learning_rate: f32,
    momentum: f32,
    v: Box<[f32]>,
}

impl Velocity {
    fn new(len: usize, learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            v: vec![0.; len].into_boxed_slice(),
        }
    }

    /// Updates the velocity and moves every parameter by `step(v, lr * g)`.
    fn apply(
        &mut self,
        params: &mut [f32],
        grad: &[f32],
        step: impl Fn(f32, f32) -> f32,
    ) -> Result<()> {
        check_sizes(params, grad)?;
        check_sizes(&self.v, grad)?;

        let (lr, mu) = (self.learning_rate, self.momentum);
        for ((p, &g), v) in params.iter_mut().zip(grad).zip(self.v.iter_mut()) {
            *v = mu * *v - lr * g;
            *p += step(*v, lr * g);
        }

        Ok(())
    }
}

/// Gradient descent with classical momentum, parameters move by the velocity.
#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    velocity: Velocity,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `momentum` - How much of the previous velocity is kept on every step.
    pub fn new(len: usize, learning_rate: f32, momentum: f32) -> Self {
        Self {
            velocity: Velocity::new(len, learning_rate, momentum),
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        self.velocity.apply(params, grad, |v, _| v)
    }
}

/// Gradient descent with Nesterov momentum, the velocity is applied once more as a look ahead:
/// parameters move by `mu * v - lr * g`.
#[derive(Debug, Clone)]
pub struct NesterovMomentum {
    velocity: Velocity,
}

impl NesterovMomentum {
    /// Creates a new `NesterovMomentum` optimizer, same arguments as
    /// `GradientDescentWithMomentum::new`.
    pub fn new(len: usize, learning_rate: f32, momentum: f32) -> Self {
        Self {
            velocity: Velocity::new(len, learning_rate, momentum),
        }
    }
}

impl Optimizer for NesterovMomentum {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        let mu = self.velocity.momentum;
        self.velocity.apply(params, grad, |v, scaled| mu * v - scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classical_momentum_accumulates() {
        let mut optimizer = GradientDescentWithMomentum::new(1, 0.1, 0.5);
        let mut params = [1.0];

        optimizer.update_params(&mut params, &[1.0]).unwrap();
        assert!((params[0] - 0.9).abs() < 1e-6);

        // v = 0.5 * -0.1 - 0.1
        optimizer.update_params(&mut params, &[1.0]).unwrap();
        assert!((params[0] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn nesterov_first_step_overshoots_plain_descent() {
        let mut optimizer = NesterovMomentum::new(1, 0.1, 0.9);
        let mut params = [1.0];

        optimizer.update_params(&mut params, &[1.0]).unwrap();

        // v = -0.1, p = 1 + 0.9 * -0.1 - 0.1
        assert!((params[0] - 0.81).abs() < 1e-6);
    }

    #[test]
    fn velocity_size_is_checked() {
        let mut optimizer = NesterovMomentum::new(2, 0.1, 0.9);
        assert!(optimizer.update_params(&mut [0.0; 3], &[0.0; 3]).is_err());
    }
}
