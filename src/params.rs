use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{NetErr, Result};

/// A dynamically typed option value, as passed in keyword parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    /// Only holds integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

/// An ordered bag of named options.
pub type Params = BTreeMap<String, ParamValue>;

/// Options grouped by the scope they were routed to.
pub type RoutedParams = BTreeMap<String, Params>;

impl ParamValue {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(i) => u64::try_from(*i).ok(),
            Self::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        self.as_u64().and_then(|u| usize::try_from(u).ok())
    }

    /// Numeric value of either an `Int` or a `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::UInt(u) => Some(*u as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Params> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(i: $t) -> Self {
                Self::Int(i64::from(i))
            }
        })*
    };
}

from_int!(i32, i64, u32);

macro_rules! from_uint {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(u: $t) -> Self {
                let u = u as u64;
                i64::try_from(u).map_or(Self::UInt(u), Self::Int)
            }
        })*
    };
}

from_uint!(u64, usize);

impl From<f32> for ParamValue {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

impl<A: Into<ParamValue>, B: Into<ParamValue>> From<(A, B)> for ParamValue {
    fn from((a, b): (A, B)) -> Self {
        Self::List(vec![a.into(), b.into()])
    }
}

impl From<Params> for ParamValue {
    fn from(map: Params) -> Self {
        Self::Map(map)
    }
}

/// Builds a `Params` bag out of `key => value` pairs.
#[macro_export]
macro_rules! params {
    () => { $crate::params::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::params::Params::new();
        $(params.insert($key.to_string(), $crate::params::ParamValue::from($value));)+
        params
    }};
}

/// Finds the scope a key belongs to, the longest `<scope>_` prefix wins.
///
/// # Returns
/// The scope and the option name with the prefix removed.
fn match_scope<'k, 's>(key: &'k str, scopes: &[&'s str]) -> Option<(&'s str, &'k str)> {
    scopes
        .iter()
        .filter_map(|&scope| {
            let option = key.strip_prefix(scope)?.strip_prefix('_')?;
            (!option.is_empty()).then_some((scope, option))
        })
        .max_by_key(|(scope, _)| scope.len())
}

/// Routes flat `<scope>_<option>` parameters to their scopes.
///
/// # Arguments
/// * `kwargs` - The flat parameters.
/// * `scopes` - The known scopes, layer names and `update`/`objective`.
///
/// # Returns
/// The parameters grouped by scope, or `UnusedKwarg` with the first key matching no scope.
pub fn route(kwargs: &Params, scopes: &[&str]) -> Result<RoutedParams> {
    let mut routed = RoutedParams::new();

    for (key, value) in kwargs {
        let (scope, option) =
            match_scope(key, scopes).ok_or_else(|| NetErr::UnusedKwarg(key.clone()))?;
        routed
            .entry(scope.to_string())
            .or_default()
            .insert(option.to_string(), value.clone());
    }

    Ok(routed)
}

/// Like `route`, but keys matching no scope are skipped.
pub fn route_lenient(params: &Params, scopes: &[&str]) -> RoutedParams {
    let mut routed = RoutedParams::new();

    for (key, value) in params {
        match match_scope(key, scopes) {
            Some((scope, option)) => {
                routed
                    .entry(scope.to_string())
                    .or_default()
                    .insert(option.to_string(), value.clone());
            }
            None => debug!("skipping parameter {key}, it matches no scope"),
        }
    }

    routed
}

/// Merges `overrides` into `base`, the values in `overrides` win.
pub fn merge_routed(mut base: RoutedParams, overrides: RoutedParams) -> RoutedParams {
    for (scope, params) in overrides {
        base.entry(scope).or_default().extend(params);
    }

    base
}

/// Reads typed options out of a scope's parameters, keeping track of the ones consumed so the
/// leftovers can be rejected with `finish`.
pub struct Options<'a> {
    scope: &'a str,
    params: &'a Params,
    used: BTreeSet<&'a str>,
}

impl<'a> Options<'a> {
    pub fn new(scope: &'a str, params: &'a Params) -> Self {
        Self {
            scope,
            params,
            used: BTreeSet::new(),
        }
    }

    pub fn scope(&self) -> &str {
        self.scope
    }

    /// Takes an option, `None` values count as missing.
    pub fn get(&mut self, key: &'a str) -> Option<&'a ParamValue> {
        self.used.insert(key);
        self.params.get(key).filter(|v| !v.is_none())
    }

    /// Takes an option that is allowed to be `None`.
    pub fn get_raw(&mut self, key: &'a str) -> Option<&'a ParamValue> {
        self.used.insert(key);
        self.params.get(key)
    }

    pub fn f64_or(&mut self, key: &'a str, default: f64) -> Result<f64> {
        match self.get(key) {
            Some(v) => v.as_f64().ok_or_else(|| self.invalid(key, "expected a number")),
            None => Ok(default),
        }
    }

    pub fn f32_or(&mut self, key: &'a str, default: f32) -> Result<f32> {
        self.f64_or(key, f64::from(default)).map(|x| x as f32)
    }

    pub fn usize(&mut self, key: &'a str) -> Result<usize> {
        let value = self.get(key).ok_or_else(|| NetErr::MissingParam {
            scope: self.scope.to_string(),
            param: key.to_string(),
        })?;

        value
            .as_usize()
            .ok_or_else(|| self.invalid(key, "expected a non negative integer"))
    }

    pub fn str_or(&mut self, key: &'a str, default: &'a str) -> Result<&'a str> {
        match self.get(key) {
            Some(v) => v.as_str().ok_or_else(|| self.invalid(key, "expected a string")),
            None => Ok(default),
        }
    }

    pub fn invalid(&self, key: &str, reason: impl Into<String>) -> NetErr {
        NetErr::InvalidParam {
            scope: self.scope.to_string(),
            param: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Fails with the first option that was never taken.
    pub fn finish(self) -> Result<()> {
        match self.params.keys().find(|k| !self.used.contains(k.as_str())) {
            Some(key) => Err(NetErr::UnexpectedParam {
                scope: self.scope.to_string(),
                param: key.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_scope_wins() {
        let kwargs = params! {
            "hidden_1_num_units" => 3,
            "hidden_num_units" => 5,
        };

        let routed = route(&kwargs, &["hidden", "hidden_1"]).unwrap();

        assert_eq!(routed["hidden_1"], params! { "num_units" => 3 });
        assert_eq!(routed["hidden"], params! { "num_units" => 5 });
    }

    #[test]
    fn unmatched_key_is_reported() {
        let kwargs = params! {
            "mylayer_hey" => "hey",
            "yourlayer_ho" => "ho",
            "update_learning_rate" => 0.1,
        };

        let err = route(&kwargs, &["input", "mylayer", "update", "objective"]).unwrap_err();
        assert_eq!(err.to_string(), "Unused kwarg: yourlayer_ho");
    }

    #[test]
    fn lenient_routing_skips_unmatched() {
        let more = params! { "hidden_num_units" => 100, "nothing_here" => 1 };
        let routed = route_lenient(&more, &["hidden"]);

        assert_eq!(routed.len(), 1);
        assert_eq!(routed["hidden"]["num_units"], ParamValue::Int(100));
    }

    #[test]
    fn overrides_win_when_merging() {
        let base = route(&params! { "update_momentum" => 0.9 }, &["update"]).unwrap();
        let overrides = route(&params! { "update_momentum" => 0.98 }, &["update"]).unwrap();

        let merged = merge_routed(base, overrides);
        assert_eq!(merged["update"]["momentum"], ParamValue::Float(0.98));
    }

    #[test]
    fn options_reject_leftovers() {
        let params = params! { "num_units" => 3, "typo" => 1 };
        let mut options = Options::new("dense", &params);

        assert_eq!(options.usize("num_units").unwrap(), 3);
        assert!(matches!(
            options.finish(),
            Err(NetErr::UnexpectedParam { param, .. }) if param == "typo"
        ));
    }

    #[test]
    fn large_unsigned_values_keep_their_value() {
        let big = ParamValue::from(u64::MAX);
        assert_eq!(big, ParamValue::UInt(u64::MAX));
        assert_eq!(big.as_u64(), Some(u64::MAX));
        assert_eq!(big.as_i64(), None);
        assert_eq!(ParamValue::from(7usize), ParamValue::Int(7));

        let json = serde_json::to_string(&big).unwrap();
        assert_eq!(serde_json::from_str::<ParamValue>(&json).unwrap(), big);
    }

    #[test]
    fn untagged_values_round_trip_through_json() {
        let params = params! {
            "shape" => vec![ParamValue::None, ParamValue::Int(784)],
            "rate" => 0.5,
            "name" => "output",
        };

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"name":"output","rate":0.5,"shape":[null,784]}"#);
        assert_eq!(serde_json::from_str::<Params>(&json).unwrap(), params);
    }
}
