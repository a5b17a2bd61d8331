use std::collections::BTreeMap;

use neural_estimator::params::{ParamValue, Params, route};
use proptest::prelude::*;

proptest! {
    #[test]
    fn every_kwarg_lands_in_exactly_one_scope(
        options in prop::collection::btree_map(
            ("[a-z]{1,6}", "[a-z]{1,6}"),
            any::<i32>(),
            1..20,
        ),
    ) {
        let kwargs: Params = options
            .iter()
            .map(|((scope, option), &v)| (format!("{scope}_{option}"), ParamValue::from(v)))
            .collect();
        let scopes: Vec<&str> = options.keys().map(|(scope, _)| scope.as_str()).collect();

        let routed = route(&kwargs, &scopes).unwrap();

        let total: usize = routed.values().map(BTreeMap::len).sum();
        prop_assert_eq!(total, kwargs.len());
        for ((scope, option), &v) in &options {
            prop_assert_eq!(&routed[scope.as_str()][option.as_str()], &ParamValue::from(v));
        }
    }
}
