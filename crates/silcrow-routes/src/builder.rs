/// URL building: resolved schema + values → URL string
///
/// Building is all-or-nothing. Either every parameter validates, every
/// segment is substituted and the query serializes, or an error comes back
/// and no partial URL is produced.

use crate::error::{InternalDefectError, RoutingError, ValidationError};
use crate::params::{require_page, validate_params};
use crate::path::join_segments;
use crate::query::{QueryCodec, QueryIssue};
use crate::resolver::ResolvedSchema;
use crate::route::{classify_segment, PatternSegmentType};
use crate::validator::Issue;
use crate::value::{ParamMap, ParamValue, QueryValues};

/// Builds the URL for a resolved page schema
///
/// `path` is the caller's path, used in error reports only.
pub(crate) fn build_url(
    schema: &ResolvedSchema,
    path: &str,
    params: &ParamMap,
    query: &QueryValues,
    codec: &dyn QueryCodec,
) -> Result<String, RoutingError> {
    require_page(schema, path)?;

    let validated = validate_params(schema, params, path)?;
    let pathname = fill_in_path_params(&schema.template, &validated, path)?;

    let search = codec
        .serialize(&schema.query.page, query)
        .map_err(|issue| query_validation_error(issue, path))?;

    Ok(format!("{}{}", pathname, search))
}

/// Substitutes validated values into the authored template
///
/// Static segments are copied as they are, groups are dropped, dynamic
/// values are percent-encoded per segment. An absent or empty optional
/// catch-all removes its segment.
pub(crate) fn fill_in_path_params(
    template: &[String],
    values: &ParamMap,
    path: &str,
) -> Result<String, RoutingError> {
    let mut segments = Vec::with_capacity(template.len());

    for authored in template {
        match classify_segment(authored) {
            PatternSegmentType::Static(text) => segments.push(text),
            PatternSegmentType::Group(_) => {}
            PatternSegmentType::Dynamic(name) => match values.get(&name) {
                Some(ParamValue::Single(value)) => {
                    segments.push(urlencoding::encode(value).into_owned())
                }
                other => return Err(substitution_defect(&name, other, path)),
            },
            PatternSegmentType::CatchAll(name) => match values.get(&name) {
                Some(ParamValue::List(parts)) if !parts.is_empty() => {
                    segments.push(encode_all(parts))
                }
                other => return Err(substitution_defect(&name, other, path)),
            },
            PatternSegmentType::OptionalCatchAll(name) => match values.get(&name) {
                None => {}
                Some(ParamValue::List(parts)) if parts.is_empty() => {}
                Some(ParamValue::List(parts)) => segments.push(encode_all(parts)),
                other => return Err(substitution_defect(&name, other, path)),
            },
        }
    }

    Ok(join_segments(segments))
}

fn encode_all(parts: &[String]) -> String {
    parts
        .iter()
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn substitution_defect(name: &str, value: Option<&ParamValue>, path: &str) -> RoutingError {
    let message = match value {
        None => format!("missing value for path parameter '{}'", name),
        Some(_) => format!("value of path parameter '{}' has the wrong shape", name),
    };
    tracing::error!(path = %path, param = %name, "{}", message);
    InternalDefectError::new(message)
        .with_meta("path", path)
        .with_meta("param", name)
        .into()
}

fn query_validation_error(issue: QueryIssue, path: &str) -> RoutingError {
    let QueryIssue {
        key,
        expected,
        actual,
        issues,
    } = issue;

    let issues = issues
        .into_iter()
        .map(|inner| {
            let mut located = Issue::new(inner.message).at(key.clone());
            located.path.extend(inner.path);
            located
        })
        .collect();

    ValidationError {
        expected,
        actual,
        path: path.to_string(),
        issues,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::param_map;
    use pretty_assertions::assert_eq;

    fn template(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_static_and_groups() {
        let url = fill_in_path_params(&template(&["(marketing)", "about"]), &ParamMap::new(), "/").unwrap();
        assert_eq!(url, "/about");
    }

    #[test]
    fn test_root_only_is_slash() {
        assert_eq!(fill_in_path_params(&[], &ParamMap::new(), "/").unwrap(), "/");
        assert_eq!(
            fill_in_path_params(&template(&["(g)"]), &ParamMap::new(), "/(g)").unwrap(),
            "/"
        );
    }

    #[test]
    fn test_dynamic_values_are_encoded() {
        let values = param_map([("id", "a b/c")]);
        let url = fill_in_path_params(&template(&["users", "[id]"]), &values, "/users/[id]").unwrap();
        assert_eq!(url, "/users/a%20b%2Fc");
    }

    #[test]
    fn test_catch_all_joins_encoded_parts() {
        let values = param_map([("slug", ["a", "b c"])]);
        let url = fill_in_path_params(&template(&["docs", "[...slug]"]), &values, "/docs/[...slug]").unwrap();
        assert_eq!(url, "/docs/a/b%20c");
    }

    #[test]
    fn test_optional_catch_all_absent_or_empty_is_removed() {
        let tpl = template(&["docs", "[[...slug]]"]);
        assert_eq!(fill_in_path_params(&tpl, &ParamMap::new(), "/docs/[[...slug]]").unwrap(), "/docs");

        let empty = param_map([("slug", ParamValue::List(Vec::new()))]);
        assert_eq!(fill_in_path_params(&tpl, &empty, "/docs/[[...slug]]").unwrap(), "/docs");
    }

    #[test]
    fn test_missing_value_is_defect() {
        let err = fill_in_path_params(&template(&["[id]"]), &ParamMap::new(), "/[id]").unwrap_err();
        assert!(matches!(err, RoutingError::InternalDefect(_)));
    }

    #[test]
    fn test_query_issue_is_located_under_key() {
        let err = query_validation_error(
            QueryIssue {
                key: "tags".to_string(),
                expected: "list of integer separated by ','".to_string(),
                actual: serde_json::json!([1, "x"]),
                issues: vec![Issue::new("bad").at("1")],
            },
            "/search",
        );
        match err {
            RoutingError::Validation(err) => {
                assert_eq!(err.issues[0].path, vec!["tags".to_string(), "1".to_string()]);
                assert_eq!(err.path, "/search");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
