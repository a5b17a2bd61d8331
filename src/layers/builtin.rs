use machine_learning::arch::{activations::ActFn, layers::Layer};

use super::{Incoming, LayerArgs, LayerFactory, LayerRef};
use crate::{NetErr, Result, params::Options};

/// `input`: takes `shape`, whose last dimension is the amount of features.
pub struct InputFactory;

/// `dense`: takes `num_units`, `nonlinearity` (`rectify` by default) and `b`, the constant the
/// biases start at.
pub struct DenseFactory;

/// `dropout`: takes `p`, the probability of dropping a unit (0.5 by default).
pub struct DropoutFactory;

/// `concat`: merges the layers named by `incomings`.
pub struct ConcatFactory;

impl LayerFactory for InputFactory {
    fn kind(&self) -> &str {
        "input"
    }

    fn is_input(&self) -> bool {
        true
    }

    fn build(&self, args: &LayerArgs) -> Result<Layer> {
        let mut options = Options::new(&args.name, &args.params);

        let shape = options.get("shape").ok_or_else(|| NetErr::MissingParam {
            scope: args.name.clone(),
            param: "shape".into(),
        })?;
        let features = match shape.as_list() {
            Some(dims) => dims.last().and_then(|d| d.as_usize()),
            None => shape.as_usize(),
        }
        .ok_or_else(|| options.invalid("shape", "the last dimension must be a number"))?;

        options.finish()?;
        Ok(Layer::input(features))
    }
}

impl LayerFactory for DenseFactory {
    fn kind(&self) -> &str {
        "dense"
    }

    fn build(&self, args: &LayerArgs) -> Result<Layer> {
        let incoming = single(args)?;
        let mut options = Options::new(&args.name, &args.params);

        let units = options.usize("num_units")?;
        let act_fn = match options.get_raw("nonlinearity") {
            None => Some(ActFn::rectify()),
            Some(v) if v.is_none() => None,
            Some(v) => {
                let name = v
                    .as_str()
                    .ok_or_else(|| options.invalid("nonlinearity", "expected a name"))?;
                ActFn::from_name(name).map_err(|name| {
                    options.invalid("nonlinearity", format!("unknown nonlinearity {name}"))
                })?
            }
        };
        let bias = options.f32_or("b", 0.)?;

        options.finish()?;
        Ok(Layer::dense((incoming.units, units), act_fn, bias))
    }
}

impl LayerFactory for DropoutFactory {
    fn kind(&self) -> &str {
        "dropout"
    }

    fn build(&self, args: &LayerArgs) -> Result<Layer> {
        let incoming = single(args)?;
        let mut options = Options::new(&args.name, &args.params);

        let p = options.f32_or("p", 0.5)?;

        options.finish()?;
        Ok(Layer::dropout(incoming.units, p)?)
    }
}

impl LayerFactory for ConcatFactory {
    fn kind(&self) -> &str {
        "concat"
    }

    fn build(&self, args: &LayerArgs) -> Result<Layer> {
        Options::new(&args.name, &args.params).finish()?;

        let dims = match &args.incoming {
            Incoming::Many(layers) => layers.iter().map(|l| l.units).collect(),
            _ => {
                return Err(NetErr::MissingParam {
                    scope: args.name.clone(),
                    param: "incomings".into(),
                });
            }
        };

        Ok(Layer::concat(dims))
    }
}

fn single(args: &LayerArgs) -> Result<&LayerRef> {
    match &args.incoming {
        Incoming::Single(layer) => Ok(layer),
        Incoming::None => Err(NetErr::MissingParam {
            scope: args.name.clone(),
            param: "incoming".into(),
        }),
        Incoming::Many(_) => Err(NetErr::InvalidParam {
            scope: args.name.clone(),
            param: "incomings".into(),
            reason: "this layer takes a single incoming layer".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{self, ParamValue};

    fn args(params: params::Params, incoming: Incoming) -> LayerArgs {
        LayerArgs {
            name: "layer".into(),
            incoming,
            params,
        }
    }

    fn from(units: usize) -> Incoming {
        Incoming::Single(LayerRef {
            name: "prev".into(),
            index: 0,
            units,
        })
    }

    #[test]
    fn input_reads_last_shape_dimension() {
        let shape = ParamValue::from(vec![ParamValue::None, ParamValue::Int(784)]);
        let layer = InputFactory
            .build(&args(crate::params! { "shape" => shape }, Incoming::None))
            .unwrap();

        assert_eq!(layer.output_dim(), 784);
    }

    #[test]
    fn dense_defaults_and_identity() {
        let layer = DenseFactory
            .build(&args(crate::params! { "num_units" => 4 }, from(3)))
            .unwrap();
        assert_eq!(layer.size(), 16);

        let identity = crate::params! { "num_units" => 1, "nonlinearity" => ParamValue::None };
        let layer = DenseFactory.build(&args(identity, from(3))).unwrap();
        match layer {
            Layer::Dense(dense) => assert!(dense.act_fn().is_none()),
            other => panic!("expected a dense layer, got {other:?}"),
        }
    }

    #[test]
    fn dense_rejects_unknown_options() {
        let params = crate::params! { "num_units" => 4, "W" => 1.0 };
        let err = DenseFactory.build(&args(params, from(3))).unwrap_err();

        assert!(matches!(err, NetErr::UnexpectedParam { param, .. } if param == "W"));
    }

    #[test]
    fn dense_needs_units() {
        let err = DenseFactory
            .build(&args(crate::params! {}, from(3)))
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing parameter num_units for layer");
    }
}
