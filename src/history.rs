use std::{collections::BTreeMap, ops::Deref};

use serde::{Deserialize, Serialize};

use crate::persist::non_finite;

/// What happened on a single epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochInfo {
    pub epoch: usize,
    #[serde(with = "non_finite")]
    pub train_loss: f64,
    pub train_loss_best: bool,
    /// `NaN` when there's no validation data.
    #[serde(with = "non_finite")]
    pub valid_loss: f64,
    pub valid_loss_best: bool,
    /// Only set for classifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_accuracy: Option<f64>,
    /// Seconds the epoch took.
    #[serde(with = "non_finite")]
    pub dur: f64,
    /// Custom validation scores by name.
    #[serde(flatten, with = "non_finite::f64_map")]
    pub custom: BTreeMap<String, f64>,
}

impl EpochInfo {
    /// A record with only the epoch number and losses set.
    pub fn new(epoch: usize, train_loss: f64, valid_loss: f64) -> Self {
        Self {
            epoch,
            train_loss,
            train_loss_best: false,
            valid_loss,
            valid_loss_best: false,
            valid_accuracy: None,
            dur: 0.,
            custom: BTreeMap::new(),
        }
    }
}

/// The records of every epoch trained so far, in order. Records are only ever appended.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<EpochInfo>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, info: EpochInfo) {
        self.0.push(info);
    }

    /// The number the next epoch gets, numbering continues across training calls.
    pub fn next_epoch(&self) -> usize {
        self.0.last().map_or(1, |info| info.epoch + 1)
    }

    /// The lowest training and validation losses so far.
    pub fn best_losses(&self) -> (f64, f64) {
        self.0.iter().fold((f64::INFINITY, f64::INFINITY), |(t, v), info| {
            (t.min(info.train_loss), v.min(info.valid_loss))
        })
    }
}

impl Deref for History {
    type Target = [EpochInfo];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<EpochInfo>> for History {
    fn from(records: Vec<EpochInfo>) -> Self {
        Self(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epochs_continue_from_last_record() {
        let mut history = History::new();
        assert_eq!(history.next_epoch(), 1);

        history.push(EpochInfo::new(1, 0.5, 0.6));
        history.push(EpochInfo::new(2, 0.4, 0.7));

        assert_eq!(history.next_epoch(), 3);
        assert_eq!(history.best_losses(), (0.4, 0.6));
    }

    #[test]
    fn missing_validation_survives_json() {
        let mut info = EpochInfo::new(1, 0.5, f64::NAN);
        info.custom.insert("my_score".into(), 0.25);

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains(r#""valid_loss":null"#));
        assert!(json.contains(r#""my_score":0.25"#));

        let back: EpochInfo = serde_json::from_str(&json).unwrap();
        assert!(back.valid_loss.is_nan());
        assert_eq!(back.custom["my_score"], 0.25);
    }

    #[test]
    fn diverged_losses_survive_json() {
        let mut info = EpochInfo::new(3, f64::NAN, f64::INFINITY);
        info.custom.insert("my_score".into(), f64::NAN);

        let json = serde_json::to_string(&info).unwrap();
        let back: EpochInfo = serde_json::from_str(&json).unwrap();

        assert!(back.train_loss.is_nan());
        assert_eq!(back.valid_loss, f64::INFINITY);
        assert!(back.custom["my_score"].is_nan());
    }
}
