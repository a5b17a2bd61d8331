use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use super::{EpochHandler, Signal};
use crate::{NeuralNet, Result, history::EpochInfo};

/// Something that can be checkpointed.
pub trait Checkpoint {
    /// Writes the learnable parameters to `path`.
    fn save_params_to(&self, path: &Path) -> Result<()>;

    /// Writes a full snapshot to `path`.
    fn dump(&self, path: &Path) -> Result<()>;
}

/// Saves the network's parameters after an epoch, either every few epochs or whenever the
/// validation loss improves.
///
/// The path may contain `{epoch}`, `{timestamp}` and `{loss}`, which are replaced by the epoch
/// number padded to four digits, the current local time and the last validation loss.
#[derive(Clone, Debug)]
pub struct SaveWeights {
    path: String,
    every_n_epochs: usize,
    only_best: bool,
    pickle: bool,
    verbose: u8,
}

impl SaveWeights {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            every_n_epochs: 1,
            only_best: false,
            pickle: false,
            verbose: 0,
        }
    }

    /// Saves only on epochs that are multiples of `n`.
    pub fn every_n_epochs(mut self, n: usize) -> Self {
        self.every_n_epochs = n.max(1);
        self
    }

    /// Saves only when the last validation loss is lower than every previous one.
    pub fn only_best(mut self, only_best: bool) -> Self {
        self.only_best = only_best;
        self
    }

    /// Dumps the whole network instead of only its parameters.
    pub fn pickle(mut self, pickle: bool) -> Self {
        self.pickle = pickle;
        self
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    fn should_save(&self, history: &[EpochInfo]) -> bool {
        let Some((last, earlier)) = history.split_last() else {
            return false;
        };

        if self.only_best {
            earlier.iter().all(|info| last.valid_loss < info.valid_loss)
        } else {
            last.epoch % self.every_n_epochs == 0
        }
    }

    fn interpolate(&self, info: &EpochInfo) -> PathBuf {
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();

        self.path
            .replace("{epoch}", &format!("{:04}", info.epoch))
            .replace("{timestamp}", &timestamp)
            .replace("{loss}", &float_repr(info.valid_loss))
            .into()
    }

    /// Applies the saving policy to the latest record.
    ///
    /// # Arguments
    /// * `target` - What gets saved.
    /// * `history` - The training history so far.
    ///
    /// # Returns
    /// The path written to, if anything was saved.
    pub fn handle<C: Checkpoint + ?Sized>(
        &self,
        target: &C,
        history: &[EpochInfo],
    ) -> Result<Option<PathBuf>> {
        if !self.should_save(history) {
            return Ok(None);
        }

        let Some(last) = history.last() else {
            return Ok(None);
        };

        let path = self.interpolate(last);
        if self.verbose > 0 {
            println!("Writing {} for epoch {}", path.display(), last.epoch);
        }
        info!("checkpointing epoch {} to {}", last.epoch, path.display());

        if self.pickle {
            target.dump(&path)?;
        } else {
            target.save_params_to(&path)?;
        }

        Ok(Some(path))
    }
}

impl EpochHandler for SaveWeights {
    fn on_epoch_finished(&mut self, net: &mut NeuralNet) -> Result<Signal> {
        let net: &NeuralNet = net;
        self.handle(net, net.history())?;
        Ok(Signal::Continue)
    }
}

/// Formats a float the shortest way that reads back the same, always with a decimal part.
fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0. { "inf" } else { "-inf" }.into();
    }

    let s = x.to_string();
    if s.contains('.') { s } else { format!("{s}.0") }
}
