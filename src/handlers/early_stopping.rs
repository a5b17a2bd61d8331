use log::info;

use super::{EpochHandler, Signal};
use crate::{NeuralNet, Result, persist::ParamValues};

/// Stops training once the validation loss hasn't improved for `patience` epochs, restoring the
/// parameters of the best epoch.
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    patience: usize,
    best_valid: f64,
    best_valid_epoch: usize,
    best_weights: Option<ParamValues>,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_valid: f64::INFINITY,
            best_valid_epoch: 0,
            best_weights: None,
        }
    }

    pub fn best_valid(&self) -> f64 {
        self.best_valid
    }

    pub fn best_valid_epoch(&self) -> usize {
        self.best_valid_epoch
    }
}

impl EpochHandler for EarlyStopping {
    fn on_epoch_finished(&mut self, net: &mut NeuralNet) -> Result<Signal> {
        let Some(last) = net.history().last() else {
            return Ok(Signal::Continue);
        };
        let (current, epoch) = (last.valid_loss, last.epoch);

        if current < self.best_valid {
            self.best_valid = current;
            self.best_valid_epoch = epoch;
            self.best_weights = Some(net.get_all_params_values()?);
            return Ok(Signal::Continue);
        }

        if self.best_valid_epoch + self.patience >= epoch {
            return Ok(Signal::Continue);
        }

        info!(
            "Early stopping. Best valid loss was {:.6} at epoch {}.",
            self.best_valid, self.best_valid_epoch
        );
        if let Some(weights) = &self.best_weights {
            net.load_params_from(weights)?;
        }

        Ok(Signal::Stop)
    }
}
