mod act_fn;
mod rectify;
mod sigmoid;
mod softmax;
mod tanh;

pub use act_fn::ActFn;
pub use rectify::Rectify;
pub use sigmoid::Sigmoid;
pub use softmax::Softmax;
pub use tanh::Tanh;
