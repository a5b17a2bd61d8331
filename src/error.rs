use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use machine_learning::MlErr;

/// The result type used in the entire estimator.
pub type Result<T> = std::result::Result<T, NetErr>;

/// All errors that can occur while configuring, training or persisting a network.
#[derive(Debug)]
pub enum NetErr {
    /// A keyword parameter whose prefix matches no layer nor the update rule.
    UnusedKwarg(String),
    DuplicateLayer(String),
    UnknownIncoming {
        layer: String,
        incoming: String,
    },
    UnknownFactory(String),
    MissingParam {
        scope: String,
        param: String,
    },
    InvalidParam {
        scope: String,
        param: String,
        reason: String,
    },
    UnexpectedParam {
        scope: String,
        param: String,
    },
    InvalidConfig(String),
    NotInitialized,
    TargetMismatch(String),
    Ml(MlErr),
    Io(io::Error),
    Json(serde_json::Error),
    SafeTensors(String),
}

impl Display for NetErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnusedKwarg(key) => write!(f, "Unused kwarg: {key}"),
            Self::DuplicateLayer(name) => write!(f, "Two layers with name {name}."),
            Self::UnknownIncoming { layer, incoming } => {
                write!(f, "Layer {layer} refers to an unknown incoming layer {incoming}")
            }
            Self::UnknownFactory(kind) => write!(f, "No layer factory registered for {kind}"),
            Self::MissingParam { scope, param } => {
                write!(f, "Missing parameter {param} for {scope}")
            }
            Self::InvalidParam {
                scope,
                param,
                reason,
            } => write!(f, "Invalid parameter {param} for {scope}: {reason}"),
            Self::UnexpectedParam { scope, param } => {
                write!(f, "Unexpected parameter {param} for {scope}")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::NotInitialized => write!(f, "The network hasn't been initialized"),
            Self::TargetMismatch(msg) => write!(f, "target mismatch: {msg}"),
            Self::Ml(e) => write!(f, "backend error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::SafeTensors(msg) => write!(f, "safetensors error: {msg}"),
        }
    }
}

impl Error for NetErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ml(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for NetErr {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<io::Error> for NetErr {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NetErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<safetensors::SafeTensorError> for NetErr {
    fn from(e: safetensors::SafeTensorError) -> Self {
        Self::SafeTensors(e.to_string())
    }
}
