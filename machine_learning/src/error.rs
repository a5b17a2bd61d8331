use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidArity {
        layer: String,
        got: usize,
        expected: usize,
    },
    UnknownNode {
        node: usize,
        len: usize,
    },
    DuplicateNode(String),
    EmptyGraph,
    InvalidHyperparameter {
        name: &'static str,
        value: f32,
    },
    Distribution(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::InvalidArity {
                layer,
                got,
                expected,
            } => write!(
                f,
                "Layer {layer} takes {expected} incoming layer(s) but was given {got}"
            ),
            MlErr::UnknownNode { node, len } => write!(
                f,
                "Tried to wire node {node} into a graph that only has {len} nodes"
            ),
            MlErr::DuplicateNode(name) => write!(f, "The graph already has a node named {name}"),
            MlErr::EmptyGraph => write!(f, "The graph has no nodes"),
            MlErr::InvalidHyperparameter { name, value } => {
                write!(f, "Invalid value {value} for hyperparameter {name}")
            }
            MlErr::Distribution(msg) => write!(f, "Failed to build distribution: {msg}"),
        }
    }
}

impl Error for MlErr {}
