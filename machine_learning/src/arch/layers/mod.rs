mod concat;
mod dense;
mod dropout;
mod input;
mod layer;

pub use concat::Concat;
pub use dense::Dense;
pub use dropout::Dropout;
pub use input::Input;
pub use layer::Layer;
