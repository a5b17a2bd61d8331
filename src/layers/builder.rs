use std::{collections::BTreeMap, sync::Arc};

use log::debug;
use machine_learning::arch::Graph;

use super::{
    Incoming, LayerArgs, LayerFactory, LayerRef, LayerRegistry, LayerSource, LayerSpec,
    registry::normalize_kind,
};
use crate::{
    NetErr, Result,
    params::{ParamValue, RoutedParams},
};

/// The instantiated layer graph.
#[derive(Clone, Debug)]
pub struct BuiltGraph {
    pub graph: Graph,
    /// The name of the terminal layer.
    pub output: String,
    /// Node indices by layer name.
    pub layers: BTreeMap<String, usize>,
}

/// The name a layer gets when none is given: its kind, lowercased and without `layer`, followed
/// by its position.
pub fn default_name(kind: &str, index: usize) -> String {
    format!("{}{index}", normalize_kind(kind))
}

/// Resolves the name of every layer, in order, without building anything.
pub fn layer_names(specs: &[LayerSpec]) -> Vec<String> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| layer_name(spec, i))
        .collect()
}

fn layer_name(spec: &LayerSpec, index: usize) -> String {
    spec.name
        .clone()
        .or_else(|| {
            spec.params
                .get("name")
                .and_then(ParamValue::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| default_name(spec.source.kind(), index))
}

/// Instantiates the layers in order, wiring each one to its predecessors.
///
/// # Arguments
/// * `specs` - The layer list.
/// * `routed` - The keyword parameters routed by layer name, they override the specs' own.
/// * `registry` - Where kinds are looked up.
///
/// # Returns
/// The built graph, or the first error found.
pub fn build_graph(
    specs: &[LayerSpec],
    routed: &RoutedParams,
    registry: &LayerRegistry,
) -> Result<BuiltGraph> {
    let mut graph = Graph::new();
    let mut layers = BTreeMap::new();
    let mut prev: Option<String> = None;

    for (i, spec) in specs.iter().enumerate() {
        let factory: Arc<dyn LayerFactory> = match &spec.source {
            LayerSource::Custom(factory) => factory.clone(),
            LayerSource::Kind(kind) => registry
                .get(kind)
                .ok_or_else(|| NetErr::UnknownFactory(kind.clone()))?,
        };

        let name = layer_name(spec, i);
        if layers.contains_key(&name) {
            return Err(NetErr::DuplicateLayer(name));
        }

        let mut params = spec.params.clone();
        params.remove("name");
        if let Some(overrides) = routed.get(&name) {
            params.extend(overrides.clone());
        }

        let lookup = |value: &ParamValue| -> Result<LayerRef> {
            let incoming = value.as_str().ok_or_else(|| NetErr::InvalidParam {
                scope: name.clone(),
                param: "incoming".into(),
                reason: "expected a layer name".into(),
            })?;
            layer_ref(&graph, &layers, &name, incoming)
        };

        let incoming = if let Some(value) = params.remove("incoming") {
            Incoming::Single(lookup(&value)?)
        } else if let Some(value) = params.remove("incomings") {
            let names = value.as_list().ok_or_else(|| NetErr::InvalidParam {
                scope: name.clone(),
                param: "incomings".into(),
                reason: "expected a list of layer names".into(),
            })?;
            Incoming::Many(names.iter().map(&lookup).collect::<Result<_>>()?)
        } else {
            match &prev {
                Some(prev) if !factory.is_input() => {
                    Incoming::Single(layer_ref(&graph, &layers, &name, prev)?)
                }
                _ => Incoming::None,
            }
        };

        let args = LayerArgs {
            name,
            incoming,
            params,
        };
        let layer = factory.build(&args)?;
        let inputs = args.incoming.refs().iter().map(|l| l.index).collect();

        debug!(
            "adding layer {} ({}) fed by {:?}",
            args.name,
            layer.kind(),
            args.incoming.refs().iter().map(|l| &l.name).collect::<Vec<_>>()
        );

        let index = graph.add(args.name.clone(), layer, inputs)?;
        layers.insert(args.name.clone(), index);
        prev = Some(args.name);
    }

    let output = prev.ok_or_else(|| NetErr::InvalidConfig("the network has no layers".into()))?;

    Ok(BuiltGraph {
        graph,
        output,
        layers,
    })
}

fn layer_ref(
    graph: &Graph,
    layers: &BTreeMap<String, usize>,
    layer: &str,
    incoming: &str,
) -> Result<LayerRef> {
    let unknown = || NetErr::UnknownIncoming {
        layer: layer.to_string(),
        incoming: incoming.to_string(),
    };

    let &index = layers.get(incoming).ok_or_else(unknown)?;
    let node = graph.node(index).ok_or_else(unknown)?;

    Ok(LayerRef {
        name: incoming.to_string(),
        index,
        units: node.layer().output_dim(),
    })
}
