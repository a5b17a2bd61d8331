use std::sync::{Arc, Mutex};

use machine_learning::arch::layers::Layer;
use neural_estimator::{
    NetConfig, NetErr, NeuralNet, Result,
    layers::{Incoming, LayerArgs, LayerFactory, LayerRegistry, LayerSpec},
    params,
    params::ParamValue,
};

/// Builds inputs, dense layers or concatenations depending on the incoming layers, and records
/// every call.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<LayerArgs>>>,
}

impl Recorder {
    fn calls(&self) -> Vec<LayerArgs> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The names of the incoming layers of every call.
    fn incomings(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .map(|args| {
                let names = args.incoming.refs().iter().map(|r| r.name.clone()).collect();
                (args.name, names)
            })
            .collect()
    }
}

impl LayerFactory for Recorder {
    fn kind(&self) -> &str {
        "MockLayer"
    }

    fn build(&self, args: &LayerArgs) -> Result<Layer> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.clone());
        }

        let units = args
            .params
            .get("units")
            .and_then(ParamValue::as_usize)
            .unwrap_or(2);

        Ok(match &args.incoming {
            Incoming::None => Layer::input(units),
            Incoming::Single(prev) => Layer::dense((prev.units, units), None, 0.),
            Incoming::Many(prevs) => Layer::concat(prevs.iter().map(|p| p.units).collect()),
        })
    }
}

fn named(names: &[&str], factory: &Arc<Recorder>) -> Vec<LayerSpec> {
    names
        .iter()
        .map(|&name| LayerSpec::named_custom(name, factory.clone()))
        .collect()
}

#[test]
fn layers_are_chained_in_order() -> Result<()> {
    let recorder = Arc::new(Recorder::default());
    let config = NetConfig::new(named(&["input", "hidden1", "hidden2", "output"], &recorder))
        .with("hidden1_some", "param");

    let mut net = NeuralNet::new(config);
    net.initialize()?;

    let expected = vec![
        ("input".to_string(), vec![]),
        ("hidden1".to_string(), vec!["input".to_string()]),
        ("hidden2".to_string(), vec!["hidden1".to_string()]),
        ("output".to_string(), vec!["hidden2".to_string()]),
    ];
    assert_eq!(recorder.incomings(), expected);
    assert_eq!(recorder.calls()[1].params, params! { "some" => "param" });
    assert_eq!(net.output_layer(), Some("output"));
    Ok(())
}

#[test]
fn diamond_merges_named_predecessors_in_order() -> Result<()> {
    let recorder = Arc::new(Recorder::default());
    let mut layers = named(&["input", "hidden1", "hidden2"], &recorder);
    layers.push(LayerSpec::named_custom("concat", recorder.clone()));
    layers.push(LayerSpec::named_custom("output", recorder.clone()));

    let config = NetConfig::new(layers)
        .with("hidden1_units", 3)
        .with("hidden2_incoming", "input")
        .with("concat_incomings", vec!["hidden2", "hidden1"]);

    let mut net = NeuralNet::new(config);
    net.initialize()?;

    let incomings = recorder.incomings();
    assert_eq!(incomings[2].1, vec!["input"]);
    assert_eq!(incomings[3].1, vec!["hidden2", "hidden1"]);

    let graph = net.graph().ok_or(NetErr::NotInitialized)?;
    assert_eq!(graph.node(3).map(|n| n.inputs().to_vec()), Some(vec![2, 1]));
    assert_eq!(graph.node(3).map(|n| n.layer().output_dim()), Some(5));
    Ok(())
}

#[test]
fn unnamed_layers_get_kind_and_position() -> Result<()> {
    let recorder = Arc::new(Recorder::default());
    let config = NetConfig::new(vec![
        LayerSpec::custom(recorder.clone(), params! { "name" => "input" }),
        LayerSpec::custom(recorder.clone(), params! {}),
    ]);

    let mut net = NeuralNet::new(config);
    net.initialize()?;

    let names: Vec<_> = recorder.calls().into_iter().map(|args| args.name).collect();
    assert_eq!(names, vec!["input", "mock1"]);
    assert!(recorder.calls().iter().all(|args| !args.params.contains_key("name")));
    Ok(())
}

#[test]
fn registered_kinds_resolve_by_name() -> Result<()> {
    let recorder = Arc::new(Recorder::default());
    let mut registry = LayerRegistry::default();
    registry.register(recorder.clone());

    let config = NetConfig::new(vec![
        LayerSpec::named("input", "input"),
        LayerSpec::named("hidden", "MockLayer"),
    ])
    .with("input_shape", 4);

    let mut net = NeuralNet::new(config).with_registry(registry);
    net.initialize()?;

    assert_eq!(recorder.calls().len(), 1);
    assert_eq!(net.graph().map(|g| g.size()), Some(4 * 2 + 2));
    Ok(())
}

#[test]
fn both_layer_forms_load_from_json() -> Result<()> {
    let json = r#"{
        "layers": [
            {"name": "input", "kind": "InputLayer"},
            {"kind": "DenseLayer", "params": {"name": "hidden", "num_units": 3}},
            {"name": "output", "kind": "dense"}
        ],
        "kwargs": {
            "input_shape": [null, 2],
            "output_num_units": 2,
            "output_nonlinearity": "softmax"
        }
    }"#;

    let mut net = NeuralNet::new(NetConfig::from_json_str(json)?);
    net.initialize()?;

    assert_eq!(net.graph().map(|g| g.size()), Some((2 + 1) * 3 + (3 + 1) * 2));
    Ok(())
}
