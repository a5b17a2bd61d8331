mod early_stopping;
mod layer_info;
mod print_log;
mod save_weights;
pub mod table;

pub use early_stopping::EarlyStopping;
pub use layer_info::PrintLayerInfo;
pub use print_log::{PrintLog, TableLayout, format_table};
pub use save_weights::{Checkpoint, SaveWeights};

use crate::{NeuralNet, Result};

/// Whether training should go on after an epoch handler ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Stop,
}

/// Called after every epoch, once the epoch's record was appended to the history.
pub trait EpochHandler: EpochHandlerClone {
    /// # Returns
    /// `Signal::Stop` to end training gracefully, or an error to abort it.
    fn on_epoch_finished(&mut self, net: &mut NeuralNet) -> Result<Signal>;
}

/// Called when a training call starts or finishes.
pub trait TrainingHandler: TrainingHandlerClone {
    fn on_training(&mut self, net: &mut NeuralNet) -> Result<()>;
}

pub trait EpochHandlerClone {
    fn clone_box(&self) -> Box<dyn EpochHandler>;
}

impl<T: EpochHandler + Clone + 'static> EpochHandlerClone for T {
    fn clone_box(&self) -> Box<dyn EpochHandler> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn EpochHandler> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub trait TrainingHandlerClone {
    fn clone_box(&self) -> Box<dyn TrainingHandler>;
}

impl<T: TrainingHandler + Clone + 'static> TrainingHandlerClone for T {
    fn clone_box(&self) -> Box<dyn TrainingHandler> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn TrainingHandler> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An epoch handler out of a closure.
#[derive(Clone)]
pub struct EpochFn<F>(pub F);

impl<F> EpochHandler for EpochFn<F>
where
    F: FnMut(&mut NeuralNet) -> Result<Signal> + Clone + 'static,
{
    fn on_epoch_finished(&mut self, net: &mut NeuralNet) -> Result<Signal> {
        (self.0)(net)
    }
}

/// A training handler out of a closure.
#[derive(Clone)]
pub struct TrainingFn<F>(pub F);

impl<F> TrainingHandler for TrainingFn<F>
where
    F: FnMut(&mut NeuralNet) -> Result<()> + Clone + 'static,
{
    fn on_training(&mut self, net: &mut NeuralNet) -> Result<()> {
        (self.0)(net)
    }
}
