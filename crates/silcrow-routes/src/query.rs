/// Query parameters: per-key parsers and the query-string codec
///
/// Each declared query key owns a [`QueryParser`] that turns one raw string
/// into a typed JSON value and back. A [`QueryCodec`] applies a whole schema
/// map at once: serializing typed values into `?a=1&b=2` when building URLs,
/// and loading typed values out of a raw request query when parsing.

use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::validator::Issue;
use crate::value::{ParamValue, QueryValues, RawQuery};

/// Parser for a single query parameter
pub trait QueryParser: Send + Sync {
    /// Parses one raw value; `None` when the value is not acceptable
    fn parse(&self, raw: &str) -> Option<Value>;

    /// Serializes a typed value back to its raw form
    fn serialize(&self, value: &Value) -> Result<String, Issue>;

    /// Value used when the key is missing or unparseable
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// Parses a raw value as extracted by the host; repeated keys use the first entry
    fn parse_raw(&self, raw: &ParamValue) -> Option<Value> {
        match raw {
            ParamValue::Single(value) => self.parse(value),
            ParamValue::List(values) => values.first().and_then(|value| self.parse(value)),
        }
    }

    /// Human readable description of the accepted values
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl fmt::Debug for dyn QueryParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryParser({})", self.describe())
    }
}

/// Query parsers are shared between the tree and every resolved schema
pub type SharedQueryParser = Arc<dyn QueryParser>;

/// Query parameter name → parser, ordered by key
pub type QuerySchemaMap = BTreeMap<String, SharedQueryParser>;

// ============================================================================
// Built-in parsers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum QueryParamKind {
    String,
    Integer,
    Float,
    Boolean,
    Literal(Vec<String>),
    ArrayOf(Box<QueryParam>, String),
}

/// Built-in query parameter parser
///
/// ```
/// use silcrow_routes::QueryParam;
/// use silcrow_routes::query::QueryParser;
/// use serde_json::json;
///
/// let page = QueryParam::integer().with_default(1);
/// assert_eq!(page.parse("3"), Some(json!(3)));
/// assert_eq!(page.parse("x"), None);
/// assert_eq!(page.default_value(), Some(json!(1)));
///
/// let tags = QueryParam::array_of(QueryParam::string());
/// assert_eq!(tags.parse("a,b"), Some(json!(["a", "b"])));
/// assert_eq!(tags.serialize(&json!(["a", "b"])).unwrap(), "a,b");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    kind: QueryParamKind,
    default: Option<Value>,
}

impl QueryParam {
    fn of(kind: QueryParamKind) -> Self {
        Self {
            kind,
            default: None,
        }
    }

    /// Any string
    pub fn string() -> Self {
        Self::of(QueryParamKind::String)
    }

    /// Signed 64-bit integer
    pub fn integer() -> Self {
        Self::of(QueryParamKind::Integer)
    }

    /// Finite floating point number
    pub fn float() -> Self {
        Self::of(QueryParamKind::Float)
    }

    /// `true` / `false`, case-insensitive when parsing
    pub fn boolean() -> Self {
        Self::of(QueryParamKind::Boolean)
    }

    /// One of a fixed set of strings
    pub fn literal<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(QueryParamKind::Literal(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Comma separated list of `item` values
    pub fn array_of(item: QueryParam) -> Self {
        Self::array_of_with_separator(item, ",")
    }

    /// List of `item` values joined by `separator`
    pub fn array_of_with_separator(item: QueryParam, separator: impl Into<String>) -> Self {
        Self::of(QueryParamKind::ArrayOf(Box::new(item), separator.into()))
    }

    /// Sets the value used when the key is missing or unparseable
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Wraps this parser for use in a schema map
    pub fn shared(self) -> SharedQueryParser {
        Arc::new(self)
    }
}

impl QueryParser for QueryParam {
    fn parse(&self, raw: &str) -> Option<Value> {
        match &self.kind {
            QueryParamKind::String => Some(Value::String(raw.to_string())),
            QueryParamKind::Integer => raw.parse::<i64>().ok().map(Value::from),
            QueryParamKind::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            QueryParamKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            QueryParamKind::Literal(allowed) => allowed
                .iter()
                .find(|candidate| candidate.as_str() == raw)
                .map(|candidate| Value::String(candidate.clone())),
            QueryParamKind::ArrayOf(item, separator) => {
                if raw.is_empty() {
                    return Some(Value::Array(Vec::new()));
                }
                Some(Value::Array(
                    raw.split(separator.as_str())
                        .filter_map(|part| item.parse(part))
                        .collect(),
                ))
            }
        }
    }

    fn serialize(&self, value: &Value) -> Result<String, Issue> {
        match (&self.kind, value) {
            (QueryParamKind::String, Value::String(s)) => Ok(s.clone()),
            (QueryParamKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Ok(n.to_string())
            }
            (QueryParamKind::Float, Value::Number(n)) => Ok(n.to_string()),
            (QueryParamKind::Boolean, Value::Bool(b)) => Ok(b.to_string()),
            (QueryParamKind::Literal(allowed), Value::String(s)) => {
                if allowed.iter().any(|candidate| candidate == s) {
                    Ok(s.clone())
                } else {
                    Err(Issue::new(format!(
                        "'{}' is not one of [{}]",
                        s,
                        allowed.join(", ")
                    )))
                }
            }
            (QueryParamKind::ArrayOf(item, separator), Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    item.serialize(entry)
                        .map_err(|issue| issue.at(index.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|parts| parts.join(separator.as_str())),
            (_, other) => Err(Issue::new(format!(
                "expected {}, received {}",
                self.describe(),
                other
            ))),
        }
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }

    fn describe(&self) -> String {
        match &self.kind {
            QueryParamKind::String => "string".to_string(),
            QueryParamKind::Integer => "integer".to_string(),
            QueryParamKind::Float => "float".to_string(),
            QueryParamKind::Boolean => "boolean".to_string(),
            QueryParamKind::Literal(allowed) => format!("one of [{}]", allowed.join(", ")),
            QueryParamKind::ArrayOf(item, separator) => {
                format!("list of {} separated by '{}'", item.describe(), separator)
            }
        }
    }
}

// ============================================================================
// Codec
// ============================================================================

/// A query value rejected while serializing
#[derive(Debug, Clone, PartialEq)]
pub struct QueryIssue {
    pub key: String,
    pub expected: String,
    pub actual: Value,
    pub issues: Vec<Issue>,
}

/// Serializes and loads whole query schemas
pub trait QueryCodec: Send + Sync {
    /// Serializes `values` against `schema`; returns `""` or `"?…"`
    fn serialize(&self, schema: &QuerySchemaMap, values: &QueryValues) -> Result<String, QueryIssue>;

    /// Loads typed values for every key of `schema` out of a raw query
    fn parse(&self, schema: &QuerySchemaMap, raw: &RawQuery) -> QueryValues;
}

/// `application/x-www-form-urlencoded` style codec
///
/// - Keys absent from the schema are ignored
/// - `null` values are omitted
/// - With `clear_on_default`, values equal to the parser default are omitted
/// - Loading yields every schema key: the parsed value, else the default, else `null`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlQueryCodec {
    clear_on_default: bool,
}

impl UrlQueryCodec {
    pub fn new() -> Self {
        Self {
            clear_on_default: true,
        }
    }

    pub fn with_clear_on_default(mut self, clear_on_default: bool) -> Self {
        self.clear_on_default = clear_on_default;
        self
    }
}

impl Default for UrlQueryCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCodec for UrlQueryCodec {
    fn serialize(&self, schema: &QuerySchemaMap, values: &QueryValues) -> Result<String, QueryIssue> {
        let mut pairs = Vec::new();

        for (key, parser) in schema {
            let value = match values.get(key) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };

            if self.clear_on_default && parser.default_value().as_ref() == Some(value) {
                continue;
            }

            let raw = parser.serialize(value).map_err(|issue| QueryIssue {
                key: key.clone(),
                expected: parser.describe(),
                actual: value.clone(),
                issues: vec![issue],
            })?;

            pairs.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&raw)
            ));
        }

        if pairs.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("?{}", pairs.join("&")))
        }
    }

    fn parse(&self, schema: &QuerySchemaMap, raw: &RawQuery) -> QueryValues {
        schema
            .iter()
            .map(|(key, parser)| {
                let value = raw
                    .get(key)
                    .and_then(|raw_value| parser.parse_raw(raw_value))
                    .or_else(|| parser.default_value())
                    .unwrap_or(Value::Null);
                (key.clone(), value)
            })
            .collect()
    }
}

/// Parses a raw query string into the map hosts hand to the router
///
/// A leading `?` is optional. `+` decodes to a space, keys without `=` get an
/// empty value, and repeated keys are collected into a list in order.
///
/// ```
/// use silcrow_routes::{parse_query_string, ParamValue};
///
/// let raw = parse_query_string("?tab=a%20b&tag=x&tag=y&flag");
/// assert_eq!(raw["tab"], ParamValue::from("a b"));
/// assert_eq!(raw["tag"], ParamValue::from(["x", "y"]));
/// assert_eq!(raw["flag"], ParamValue::from(""));
/// ```
pub fn parse_query_string(query: &str) -> RawQuery {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut raw = RawQuery::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        let value = decode_component(value);

        let merged = match raw.remove(&key) {
            None => ParamValue::Single(value),
            Some(ParamValue::Single(first)) => ParamValue::List(vec![first, value]),
            Some(ParamValue::List(mut values)) => {
                values.push(value);
                ParamValue::List(values)
            }
        };
        raw.insert(key, merged);
    }

    raw
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(entries: Vec<(&str, QueryParam)>) -> QuerySchemaMap {
        entries
            .into_iter()
            .map(|(key, param)| (key.to_string(), param.shared()))
            .collect()
    }

    #[test]
    fn test_serialize_orders_by_key_and_skips_unknown() {
        let codec = UrlQueryCodec::new();
        let schema = schema(vec![("b", QueryParam::string()), ("a", QueryParam::string())]);
        let values = crate::query_values([("b", "2"), ("a", "1"), ("zzz", "ignored")]);

        assert_eq!(codec.serialize(&schema, &values).unwrap(), "?a=1&b=2");
    }

    #[test]
    fn test_serialize_empty_is_empty_string() {
        let codec = UrlQueryCodec::new();
        let schema = schema(vec![("a", QueryParam::string())]);
        let values = crate::query_values([("a", Value::Null)]);

        assert_eq!(codec.serialize(&schema, &values).unwrap(), "");
        assert_eq!(codec.serialize(&schema, &QueryValues::new()).unwrap(), "");
    }

    #[test]
    fn test_serialize_encodes_keys_and_values() {
        let codec = UrlQueryCodec::new();
        let schema = schema(vec![("q", QueryParam::string())]);
        let values = crate::query_values([("q", "a b&c")]);

        assert_eq!(codec.serialize(&schema, &values).unwrap(), "?q=a%20b%26c");
    }

    #[test]
    fn test_serialize_clear_on_default() {
        let schema = schema(vec![("page", QueryParam::integer().with_default(1))]);
        let values = crate::query_values([("page", 1)]);

        assert_eq!(UrlQueryCodec::new().serialize(&schema, &values).unwrap(), "");
        assert_eq!(
            UrlQueryCodec::new()
                .with_clear_on_default(false)
                .serialize(&schema, &values)
                .unwrap(),
            "?page=1"
        );
    }

    #[test]
    fn test_serialize_rejects_wrong_type() {
        let schema = schema(vec![("page", QueryParam::integer())]);
        let values = crate::query_values([("page", "one")]);

        let issue = UrlQueryCodec::new().serialize(&schema, &values).unwrap_err();
        assert_eq!(issue.key, "page");
        assert_eq!(issue.expected, "integer");
        assert_eq!(issue.actual, json!("one"));
    }

    #[test]
    fn test_parse_fills_defaults_and_nulls() {
        let schema = schema(vec![
            ("page", QueryParam::integer().with_default(1)),
            ("q", QueryParam::string()),
            ("sort", QueryParam::literal(["asc", "desc"])),
        ]);
        let raw = parse_query_string("page=abc&sort=desc");

        let values = UrlQueryCodec::new().parse(&schema, &raw);
        assert_eq!(values["page"], json!(1));
        assert_eq!(values["q"], Value::Null);
        assert_eq!(values["sort"], json!("desc"));
    }

    #[test]
    fn test_parse_repeated_key_uses_first() {
        let schema = schema(vec![("flag", QueryParam::boolean())]);
        let raw = parse_query_string("flag=TRUE&flag=false");

        assert_eq!(UrlQueryCodec::new().parse(&schema, &raw)["flag"], json!(true));
    }

    #[test]
    fn test_array_serialize_reports_index() {
        let tags = QueryParam::array_of(QueryParam::integer());
        let issue = tags.serialize(&json!([1, "x"])).unwrap_err();
        assert_eq!(issue.path, vec!["1".to_string()]);
    }

    #[test]
    fn test_float_and_literal() {
        assert_eq!(QueryParam::float().parse("1.5"), Some(json!(1.5)));
        assert_eq!(QueryParam::float().parse("NaN"), None);
        assert_eq!(QueryParam::literal(["a"]).parse("b"), None);
        assert!(QueryParam::literal(["a"]).serialize(&json!("b")).is_err());
    }

    #[test]
    fn test_parse_query_string_plus_is_space() {
        let raw = parse_query_string("q=hello+world");
        assert_eq!(raw["q"], ParamValue::from("hello world"));
    }
}
