mod builder;
mod builtin;
mod factory;
mod registry;
mod spec;

pub use builder::{BuiltGraph, build_graph, default_name, layer_names};
pub use builtin::{ConcatFactory, DenseFactory, DropoutFactory, InputFactory};
pub use factory::{Incoming, LayerArgs, LayerFactory, LayerRef};
pub use registry::{LayerRegistry, normalize_kind};
pub use spec::{LayerSource, LayerSpec};
