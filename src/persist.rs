use std::{collections::BTreeMap, fs, path::Path};

use safetensors::{
    SafeTensors,
    tensor::{Dtype, TensorView},
};
use serde::{Deserialize, Serialize};

use crate::{NetErr, Result, history::History, net::NetConfig};

/// A named parameter tensor of a layer, such as its weights `W` or biases `b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub name: String,
    pub shape: Vec<usize>,
    #[serde(with = "non_finite::f32_vec")]
    pub data: Vec<f32>,
}

/// Parameter tensors by layer name.
pub type ParamValues = BTreeMap<String, Vec<Tensor>>;

/// Writes the parameters as a safetensors file, each tensor named `<layer>.<param>`.
pub fn write_safetensors(values: &ParamValues, path: &Path) -> Result<()> {
    let mut tensor_data: Vec<(String, Vec<u8>, Vec<usize>)> = Vec::new();

    for (layer, tensors) in values {
        for tensor in tensors {
            let bytes: Vec<u8> = bytemuck::cast_slice(&tensor.data).to_vec();
            tensor_data.push((format!("{layer}.{}", tensor.name), bytes, tensor.shape.clone()));
        }
    }

    let mut views = Vec::with_capacity(tensor_data.len());
    for (name, bytes, shape) in &tensor_data {
        views.push((name.as_str(), TensorView::new(Dtype::F32, shape.clone(), bytes)?));
    }

    let bytes = safetensors::serialize(views, &None)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Reads the parameters back from a file written by `write_safetensors`.
pub fn read_safetensors(path: &Path) -> Result<ParamValues> {
    let bytes = fs::read(path)?;
    let tensors = SafeTensors::deserialize(&bytes)?;
    let mut values = ParamValues::new();

    for (full_name, view) in tensors.tensors() {
        let (layer, name) = full_name.rsplit_once('.').ok_or_else(|| {
            NetErr::SafeTensors(format!("tensor {full_name} isn't named <layer>.<param>"))
        })?;

        if view.dtype() != Dtype::F32 {
            return Err(NetErr::SafeTensors(format!(
                "tensor {full_name} has dtype {:?}, expected F32",
                view.dtype()
            )));
        }

        let data = view
            .data()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        values.entry(layer.to_string()).or_default().push(Tensor {
            name: name.to_string(),
            shape: view.shape().to_vec(),
            data,
        });
    }

    for tensors in values.values_mut() {
        tensors.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(values)
}

/// Everything needed to rebuild a trained network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: NetConfig,
    pub params: Option<ParamValues>,
    pub history: History,
    pub classes: Option<Vec<i64>>,
}

impl Snapshot {
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_vec(self)?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }
}

/// JSON has no `NaN` or infinities. `NaN` is written as `null`, infinities as `"inf"` and
/// `"-inf"`, so a diverged network still reads back.
pub(crate) mod non_finite {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(Option<f64>),
        Text(String),
    }

    impl Repr {
        fn from_f64(x: f64) -> Self {
            if x.is_nan() {
                Self::Number(None)
            } else if x == f64::INFINITY {
                Self::Text("inf".into())
            } else if x == f64::NEG_INFINITY {
                Self::Text("-inf".into())
            } else {
                Self::Number(Some(x))
            }
        }

        fn into_f64<E: Error>(self) -> Result<f64, E> {
            match self {
                Self::Number(x) => Ok(x.unwrap_or(f64::NAN)),
                Self::Text(s) => match s.as_str() {
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    "nan" | "NaN" => Ok(f64::NAN),
                    _ => Err(E::custom(format!("invalid float {s:?}"))),
                },
            }
        }
    }

    struct F64(f64);

    impl Serialize for F64 {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            Repr::from_f64(self.0).serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for F64 {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Repr::deserialize(deserializer)?.into_f64().map(Self)
        }
    }

    struct F32(f32);

    impl Serialize for F32 {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.0.is_finite() {
                serializer.serialize_f32(self.0)
            } else {
                Repr::from_f64(f64::from(self.0)).serialize(serializer)
            }
        }
    }

    impl<'de> Deserialize<'de> for F32 {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Repr::deserialize(deserializer)?
                .into_f64()
                .map(|x| Self(x as f32))
        }
    }

    pub fn serialize<S: Serializer>(x: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        F64(*x).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        F64::deserialize(deserializer).map(|x| x.0)
    }

    pub mod f32_vec {
        use super::*;

        pub fn serialize<S: Serializer>(xs: &[f32], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(xs.iter().map(|&x| F32(x)))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<f32>, D::Error> {
            let xs = Vec::<F32>::deserialize(deserializer)?;
            Ok(xs.into_iter().map(|x| x.0).collect())
        }
    }

    pub mod f64_map {
        use super::*;

        pub fn serialize<S: Serializer>(
            map: &BTreeMap<String, f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_map(map.iter().map(|(k, &x)| (k, F64(x))))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<BTreeMap<String, f64>, D::Error> {
            let map = BTreeMap::<String, F64>::deserialize(deserializer)?;
            Ok(map.into_iter().map(|(k, x)| (k, x.0)).collect())
        }
    }
}
