mod adam;
mod gradient_descent;
mod momentum;
mod optimizer;

pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use momentum::{GradientDescentWithMomentum, NesterovMomentum};
pub use optimizer::Optimizer;
