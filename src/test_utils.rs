//! Proptest strategies shared by the unit tests.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Plain field names: no path separators, so `lookup` and `get` agree.
pub fn arb_field_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_]{1,8}").unwrap()
}

/// Scalar JSON values of every kind.
pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        prop::string::string_regex("[ -~]{0,12}").unwrap().prop_map(Value::String),
    ]
}

/// Object bodies one level deep.
pub fn arb_flat_body() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(arb_field_name(), arb_scalar(), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}
