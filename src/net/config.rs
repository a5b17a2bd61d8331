use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    NetErr, Result,
    layers::LayerSpec,
    params::{ParamValue, Params},
};

/// The update rule used to train the network. Its hyperparameters are given as `update_*`
/// keyword parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    Sgd,
    Momentum,
    #[default]
    NesterovMomentum,
    Adam,
}

impl UpdateRule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sgd => "sgd",
            Self::Momentum => "momentum",
            Self::NesterovMomentum => "nesterov_momentum",
            Self::Adam => "adam",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sgd" => Some(Self::Sgd),
            "momentum" => Some(Self::Momentum),
            "nesterov_momentum" => Some(Self::NesterovMomentum),
            "adam" => Some(Self::Adam),
            _ => None,
        }
    }
}

/// The configuration of a `NeuralNet`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    pub layers: Vec<LayerSpec>,
    pub update: UpdateRule,
    pub regression: bool,
    pub max_epochs: usize,
    /// The fraction of the data held out for validation.
    pub eval_size: f64,
    pub batch_size: usize,
    /// Whether the training data is shuffled before every epoch.
    pub shuffle: bool,
    /// Whether class labels are mapped to their sorted position. Otherwise labels must already
    /// be indices of the output units.
    pub use_label_encoder: bool,
    pub verbose: u8,
    pub seed: u64,
    /// Flat `<scope>_<option>` parameters routed to layers, `update` and `objective`.
    pub kwargs: Params,
    /// Like `kwargs`, but they win over them and keys matching no scope are ignored.
    pub more_params: Params,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            layers: vec![],
            update: UpdateRule::default(),
            regression: false,
            max_epochs: 100,
            eval_size: 0.2,
            batch_size: 128,
            shuffle: false,
            use_label_encoder: false,
            verbose: 0,
            seed: 42,
            kwargs: Params::new(),
            more_params: Params::new(),
        }
    }
}

impl NetConfig {
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        Self {
            layers,
            ..Default::default()
        }
    }

    /// Adds a keyword parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Checks the values that can be checked without building the network.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NetErr::InvalidConfig("batch_size must be positive".into()));
        }

        if !(0.0..1.0).contains(&self.eval_size) {
            return Err(NetErr::InvalidConfig(format!(
                "eval_size must be in [0, 1), got {}",
                self.eval_size
            )));
        }

        Ok(())
    }

    /// The configuration as flat parameters: every scalar setting, `more_params` as a map and
    /// the keyword parameters. The layer list isn't included.
    pub fn to_params(&self) -> Params {
        let mut params = self.kwargs.clone();

        params.insert("update".into(), self.update.name().into());
        params.insert("regression".into(), self.regression.into());
        params.insert("max_epochs".into(), self.max_epochs.into());
        params.insert("eval_size".into(), self.eval_size.into());
        params.insert("batch_size".into(), self.batch_size.into());
        params.insert("shuffle".into(), self.shuffle.into());
        params.insert("use_label_encoder".into(), self.use_label_encoder.into());
        params.insert("verbose".into(), u32::from(self.verbose).into());
        params.insert("seed".into(), self.seed.into());
        params.insert("more_params".into(), self.more_params.clone().into());

        params
    }

    /// Sets parameters by name. Names that aren't settings are stored as keyword parameters.
    pub fn set_params(&mut self, params: Params) -> Result<()> {
        for (key, value) in params {
            let invalid = |expected: &str| NetErr::InvalidParam {
                scope: "net".into(),
                param: key.clone(),
                reason: format!("expected {expected}"),
            };

            match key.as_str() {
                "update" => {
                    self.update = value
                        .as_str()
                        .and_then(UpdateRule::from_name)
                        .ok_or_else(|| invalid("an update rule name"))?;
                }
                "regression" => self.regression = value.as_bool().ok_or_else(|| invalid("a bool"))?,
                "max_epochs" => {
                    self.max_epochs = value.as_usize().ok_or_else(|| invalid("an integer"))?
                }
                "eval_size" => self.eval_size = value.as_f64().ok_or_else(|| invalid("a number"))?,
                "batch_size" => {
                    self.batch_size = value.as_usize().ok_or_else(|| invalid("an integer"))?
                }
                "shuffle" => self.shuffle = value.as_bool().ok_or_else(|| invalid("a bool"))?,
                "use_label_encoder" => {
                    self.use_label_encoder = value.as_bool().ok_or_else(|| invalid("a bool"))?
                }
                "verbose" => {
                    self.verbose = value
                        .as_i64()
                        .and_then(|v| u8::try_from(v).ok())
                        .ok_or_else(|| invalid("a small integer"))?
                }
                "seed" => {
                    self.seed = value
                        .as_u64()
                        .ok_or_else(|| invalid("a non negative integer"))?
                }
                "more_params" => {
                    self.more_params = value.as_map().cloned().ok_or_else(|| invalid("a map"))?
                }
                _ => {
                    self.kwargs.insert(key.clone(), value);
                }
            }
        }

        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn loads_json_with_defaults() {
        let config = NetConfig::from_json_str(
            r#"{
                "layers": [{"name": "input", "kind": "input"}, {"name": "output", "kind": "dense"}],
                "update": "adam",
                "kwargs": {"input_shape": [null, 4], "output_num_units": 3}
            }"#,
        )
        .unwrap();

        assert_eq!(config.update, UpdateRule::Adam);
        assert_eq!(config.max_epochs, 100);
        assert_eq!(config.batch_size, 128);
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.kwargs["output_num_units"], ParamValue::Int(3));
    }

    #[test]
    fn invalid_eval_size_is_rejected() {
        let err = NetConfig::from_json_str(r#"{"eval_size": 1.5}"#).unwrap_err();
        assert!(matches!(err, NetErr::InvalidConfig(_)));
    }

    #[test]
    fn set_params_splits_settings_and_kwargs() {
        let mut config = NetConfig::default();
        config
            .set_params(params! {
                "max_epochs" => 5,
                "update" => "sgd",
                "update_learning_rate" => 0.1,
                "more_params" => params! { "hidden_num_units" => 10 },
            })
            .unwrap();

        assert_eq!(config.max_epochs, 5);
        assert_eq!(config.update, UpdateRule::Sgd);
        assert_eq!(config.kwargs, params! { "update_learning_rate" => 0.1 });

        let params = config.to_params();
        assert_eq!(params["max_epochs"], ParamValue::Int(5));
        assert_eq!(params["update_learning_rate"], ParamValue::Float(0.1));
        assert_eq!(
            params["more_params"],
            ParamValue::Map(params! { "hidden_num_units" => 10 })
        );
    }

    #[test]
    fn large_seeds_survive_get_and_set() {
        let mut config = NetConfig::default();
        config.seed = u64::MAX;

        let mut other = NetConfig::default();
        other.set_params(config.to_params()).unwrap();

        assert_eq!(other.seed, u64::MAX);
    }
}
