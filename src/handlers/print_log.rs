use super::{
    EpochHandler, Signal,
    table::{self, Align, Column},
};
use crate::{NeuralNet, Result, history::EpochInfo};

const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Which columns the epoch table has.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableLayout {
    /// Regressors have no accuracy column.
    pub regression: bool,
    /// The name of the custom score column, if any.
    pub custom_score: Option<String>,
}

fn loss_cell(loss: f64, best: bool, color: &str) -> String {
    if best {
        format!("{color}{loss:.5}{RESET}")
    } else {
        format!("{loss:.5}")
    }
}

/// Formats the epoch table for the given records.
///
/// # Arguments
/// * `layout` - The columns to show.
/// * `history` - The records, one row each.
///
/// # Returns
/// The header, a dash separator and the rows, without a trailing newline.
pub fn format_table(layout: &TableLayout, history: &[EpochInfo]) -> String {
    let mut epoch = Column::new("epoch", Align::Right);
    let mut train = Column::new("train loss", Align::Right);
    let mut valid = Column::new("valid loss", Align::Right);
    let mut ratio = Column::new("train/val", Align::Right);
    let mut acc = Column::new("valid acc", Align::Right);
    let mut custom = layout
        .custom_score
        .as_ref()
        .map(|name| Column::new(name.as_str(), Align::Right));
    let mut dur = Column::new("dur", Align::Left);

    for info in history {
        epoch.cells.push(info.epoch.to_string());
        train
            .cells
            .push(loss_cell(info.train_loss, info.train_loss_best, CYAN));
        valid
            .cells
            .push(loss_cell(info.valid_loss, info.valid_loss_best, GREEN));
        ratio
            .cells
            .push(format!("{:.5}", info.train_loss / info.valid_loss));
        acc.cells
            .push(format!("{:.5}", info.valid_accuracy.unwrap_or(f64::NAN)));
        if let Some(column) = custom.as_mut() {
            let score = info.custom.get(&column.header).copied();
            column.cells.push(format!("{:.5}", score.unwrap_or(f64::NAN)));
        }
        dur.cells.push(format!("{:.2}s", info.dur));
    }

    let mut columns = vec![epoch, train, valid, ratio];
    if !layout.regression {
        columns.push(acc);
    }
    columns.extend(custom);
    columns.push(dur);

    table::render(&columns)
}

/// Prints the epoch table as training goes: the header and the first row on its first call,
/// only the newest row afterwards. Best losses are highlighted.
#[derive(Clone, Debug)]
pub struct PrintLog {
    first_iteration: bool,
}

impl Default for PrintLog {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintLog {
    pub fn new() -> Self {
        Self {
            first_iteration: true,
        }
    }

    /// The text printed for the latest record.
    pub fn table(&mut self, layout: &TableLayout, history: &[EpochInfo]) -> String {
        let Some(last) = history.len().checked_sub(1) else {
            return String::new();
        };

        let out = format_table(layout, &history[last..]);
        if std::mem::take(&mut self.first_iteration) {
            out
        } else {
            out.rsplit('\n').next().unwrap_or_default().to_string()
        }
    }
}

impl EpochHandler for PrintLog {
    fn on_epoch_finished(&mut self, net: &mut NeuralNet) -> Result<Signal> {
        let layout = net.table_layout();
        println!("{}", self.table(&layout, net.history()));
        Ok(Signal::Continue)
    }
}
