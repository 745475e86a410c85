//! Request-parameter values and the matching rules policies apply to them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use utoipa::ToSchema;

/// A JSON-like request-data value, as a closed sum.
///
/// Policies list `ParamValue`s under `allowed_parameters` and
/// `denied_parameters`; requests carry them as the values of their data map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    #[schema(value_type = f64)]
    Number(Number),
    String(String),
    #[schema(no_recursion)]
    List(Vec<ParamValue>),
    #[schema(no_recursion)]
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Whether this request value matches a value listed in a policy.
    ///
    /// A listed string may carry a leading and/or trailing `*` glob; every
    /// other pairing is structural equality. `Null` matches nothing, so a
    /// value-constrained key never matches a null request value.
    pub fn matches(&self, listed: &ParamValue) -> bool {
        match (self, listed) {
            (ParamValue::Null, _) => false,
            (ParamValue::String(value), ParamValue::String(pattern)) => {
                globbed_string_match(pattern, value)
            }
            _ => self == listed,
        }
    }
}

/// Match `value` against `pattern`, where `*` at the start and/or end of the
/// pattern globs; a `*` anywhere else is literal.
fn globbed_string_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match (pattern.strip_prefix('*'), pattern.strip_suffix('*')) {
        (Some(suffix), Some(_)) => {
            let infix = &suffix[..suffix.len() - 1];
            value.contains(infix)
        }
        (Some(suffix), None) => value.ends_with(suffix),
        (None, Some(prefix)) => value.starts_with(prefix),
        (None, None) => value == pattern,
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}
