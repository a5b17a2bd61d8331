mod cross_entropy;
mod loss_fn;
mod mse;
mod objective;

pub use cross_entropy::CategoricalCrossEntropy;
pub use loss_fn::LossFn;
pub use mse::Mse;
pub use objective::{Loss, Objective, Penalty};
