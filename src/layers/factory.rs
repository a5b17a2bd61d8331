use machine_learning::arch::layers::Layer;

use crate::{Result, params::Params};

/// A layer already added to the graph, as seen by the layers wired after it.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerRef {
    pub name: String,
    pub index: usize,
    pub units: usize,
}

/// The predecessors handed to a factory.
#[derive(Clone, Debug, PartialEq)]
pub enum Incoming {
    None,
    Single(LayerRef),
    Many(Vec<LayerRef>),
}

impl Incoming {
    /// The predecessors in order.
    pub fn refs(&self) -> Vec<&LayerRef> {
        match self {
            Self::None => vec![],
            Self::Single(layer) => vec![layer],
            Self::Many(layers) => layers.iter().collect(),
        }
    }
}

/// Everything a factory is called with.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerArgs {
    pub name: String,
    pub incoming: Incoming,
    pub params: Params,
}

/// Constructs a layer out of its resolved arguments. The set of layer kinds is open, any
/// implementor can be placed in a network's layer list or registered by kind name.
pub trait LayerFactory: Send + Sync {
    /// The kind name, used for registry lookups and default layer names.
    fn kind(&self) -> &str;

    /// Whether the layer is an entry point and so never gets a predecessor by default.
    fn is_input(&self) -> bool {
        false
    }

    /// Builds the layer.
    ///
    /// # Returns
    /// The backend layer, or an error if the parameters don't describe a valid one.
    fn build(&self, args: &LayerArgs) -> Result<Layer>;
}
