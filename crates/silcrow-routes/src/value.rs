/// Parameter and query values exchanged with the host framework
///
/// Path parameters are plain strings (`[id]`) or ordered string lists
/// (`[...slug]`, `[[...slug]]`). Query values are arbitrary JSON values
/// produced and consumed by query parsers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A single path parameter value
///
/// Serializes untagged, so `"en"` and `["a", "b"]` round-trip through JSON
/// the way host frameworks hand them over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Value of a `[name]` segment
    Single(String),
    /// Value of a `[...name]` or `[[...name]]` segment
    List(Vec<String>),
}

impl ParamValue {
    /// Returns the string for single values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::List(_) => None,
        }
    }

    /// Returns the segments for list values
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::Single(_) => None,
            ParamValue::List(values) => Some(values),
        }
    }

    /// JSON view used in diagnostics
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Single(value) => Value::String(value.clone()),
            ParamValue::List(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(values: [&str; N]) -> Self {
        ParamValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Path parameters keyed by segment name
pub type ParamMap = HashMap<String, ParamValue>;

/// Raw query values as extracted by the host (`?a=1&a=2` → `a: ["1", "2"]`)
pub type RawQuery = HashMap<String, ParamValue>;

/// Typed query values, ordered by key
pub type QueryValues = BTreeMap<String, Value>;

/// Builds a [`ParamMap`] from key/value pairs
///
/// ```
/// use silcrow_routes::{param_map, ParamValue};
///
/// let params = param_map([("lang", ParamValue::from("en")), ("slug", ["a", "b"].into())]);
/// assert_eq!(params["lang"].as_str(), Some("en"));
/// ```
pub fn param_map<I, K, V>(entries: I) -> ParamMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Builds [`QueryValues`] from key/value pairs
///
/// ```
/// use silcrow_routes::query_values;
///
/// let query = query_values([("theme", "dark")]);
/// assert_eq!(query["theme"], "dark");
/// ```
pub fn query_values<I, K, V>(entries: I) -> QueryValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
