use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use super::LayerFactory;
use crate::params::{ParamValue, Params};

/// Where a layer comes from: a kind looked up in the registry, or a factory instance.
#[derive(Clone)]
pub enum LayerSource {
    Kind(String),
    Custom(Arc<dyn LayerFactory>),
}

impl LayerSource {
    /// The kind name, for custom factories the one they report.
    pub fn kind(&self) -> &str {
        match self {
            Self::Kind(kind) => kind,
            Self::Custom(factory) => factory.kind(),
        }
    }
}

impl fmt::Debug for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            Self::Custom(factory) => f.debug_tuple("Custom").field(&factory.kind()).finish(),
        }
    }
}

impl PartialEq for LayerSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Kind(a), Self::Kind(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// One entry of a network's layer list.
///
/// Custom factories are serialized by their kind name, so a dumped network using them can only
/// be loaded back with a registry where that kind is registered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "LayerSpecDef", from = "LayerSpecDef")]
pub struct LayerSpec {
    pub name: Option<String>,
    pub source: LayerSource,
    pub params: Params,
}

impl LayerSpec {
    /// The `(name, kind)` form, its options are given through keyword parameters.
    pub fn named(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            source: LayerSource::Kind(kind.into()),
            params: Params::new(),
        }
    }

    /// The `(kind, {params})` form, the name may be given as the `name` parameter.
    pub fn kind(kind: impl Into<String>, params: Params) -> Self {
        Self {
            name: None,
            source: LayerSource::Kind(kind.into()),
            params,
        }
    }

    /// The `(name, factory)` form for a factory that isn't registered.
    pub fn named_custom(name: impl Into<String>, factory: Arc<dyn LayerFactory>) -> Self {
        Self {
            name: Some(name.into()),
            source: LayerSource::Custom(factory),
            params: Params::new(),
        }
    }

    /// The `(factory, {params})` form for a factory that isn't registered.
    pub fn custom(factory: Arc<dyn LayerFactory>, params: Params) -> Self {
        Self {
            name: None,
            source: LayerSource::Custom(factory),
            params,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[derive(Serialize, Deserialize)]
struct LayerSpecDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    kind: String,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    params: Params,
}

impl From<LayerSpec> for LayerSpecDef {
    fn from(spec: LayerSpec) -> Self {
        Self {
            kind: spec.source.kind().to_string(),
            name: spec.name,
            params: spec.params,
        }
    }
}

impl From<LayerSpecDef> for LayerSpec {
    fn from(def: LayerSpecDef) -> Self {
        Self {
            name: def.name,
            source: LayerSource::Kind(def.kind),
            params: def.params,
        }
    }
}
