//! A neural network estimator configured through a layer list and flat keyword parameters,
//! trained with a loop that reports every epoch to pluggable handlers.

pub mod error;
pub mod handlers;
pub mod history;
pub mod layers;
pub mod net;
pub mod params;
pub mod persist;

pub use error::{NetErr, Result};
pub use net::{NetConfig, NeuralNet, Targets, UpdateRule};
