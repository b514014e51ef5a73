/// Path parameter validation shared by URL building and request parsing

use serde_json::Value;
use tracing::error;

use crate::error::{
    InternalDefectError, NoMatchKind, NoMatchingRouteError, RouteCandidate, RoutingError,
    ValidationError,
};
use crate::resolver::{ResolvedParam, ResolvedSchema};
use crate::route::{classify_segment, RouteKind, SegmentKind};
use crate::validator::{check_non_empty, check_shape, ShapeValidator, Validation, Validator};
use crate::value::{ParamMap, ParamValue};

/// Fails with `matchedWrongType` unless the path ended on a page
pub(crate) fn require_page(schema: &ResolvedSchema, path: &str) -> Result<(), RoutingError> {
    if schema.matched_kind == RouteKind::Page {
        return Ok(());
    }

    let segment = schema.template.last().map(String::as_str).unwrap_or("");
    Err(NoMatchingRouteError {
        path: path.to_string(),
        segment: None,
        candidates: vec![RouteCandidate {
            segment: segment.to_string(),
            kind: schema.matched_kind,
            segment_kind: classify_segment(segment).kind(),
        }],
        expected_kinds: vec![RouteKind::Page],
        kind: NoMatchKind::MatchedWrongType,
    }
    .into())
}

/// Runs every resolved parameter's validator over `supplied`
///
/// Parameters are checked in declaration order and the first failure wins.
/// The result holds the validated (possibly transformed) values; absent
/// optional catch-alls are left out.
pub(crate) fn validate_params(
    schema: &ResolvedSchema,
    supplied: &ParamMap,
    path: &str,
) -> Result<ParamMap, RoutingError> {
    let mut validated = ParamMap::with_capacity(schema.params.len());

    for param in &schema.params {
        let raw = supplied.get(&param.name);

        // An omitted optional catch-all never reaches a declared validator
        if param.kind == SegmentKind::OptionalCatchAll && raw.is_none() {
            continue;
        }

        if let Some(value) = validate_one(param, raw, path)? {
            validated.insert(param.name.clone(), value);
        }
    }

    Ok(validated)
}

fn validate_one(
    param: &ResolvedParam,
    raw: Option<&ParamValue>,
    path: &str,
) -> Result<Option<ParamValue>, RoutingError> {
    let fallback = ShapeValidator::for_kind(param.kind);
    let validator: &dyn Validator = match &param.validator {
        Some(validator) => validator.as_ref(),
        None => &fallback,
    };

    if let Err(issue) = check_non_empty(raw) {
        return Err(ValidationError {
            expected: validator.describe(),
            actual: raw.map(ParamValue::to_json).unwrap_or(Value::Null),
            path: path.to_string(),
            issues: vec![issue],
        }
        .into());
    }

    match validator.validate(raw) {
        Validation::Valid(value) => {
            check_shape(param.kind, value.as_ref()).map_err(|issue| {
                error!(
                    path = %path,
                    param = %param.name,
                    validator = %validator.describe(),
                    "validator produced a value of the wrong shape"
                );
                InternalDefectError::new(format!(
                    "validator for '{}' produced a value that does not fit a {} segment: {}",
                    param.name, param.kind, issue
                ))
                .with_meta("path", path)
                .with_meta("param", param.name.as_str())
            })?;
            Ok(value)
        }
        Validation::Invalid(issues) => Err(ValidationError {
            expected: validator.describe(),
            actual: raw.map(ParamValue::to_json).unwrap_or(Value::Null),
            path: path.to_string(),
            issues,
        }
        .into()),
        Validation::Pending => {
            error!(
                path = %path,
                param = %param.name,
                "parameter validator completed asynchronously"
            );
            Err(InternalDefectError::new(
                "path parameter validators must be synchronous",
            )
            .with_meta("path", path)
            .with_meta("param", param.name.as_str())
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolvedQuery;
    use crate::validator::{from_fn, ParameterConstraint};
    use crate::value::param_map;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn schema(params: Vec<ResolvedParam>) -> ResolvedSchema {
        ResolvedSchema {
            params,
            query: ResolvedQuery::default(),
            matched_kind: RouteKind::Page,
            template: Vec::new(),
        }
    }

    fn param(name: &str, kind: SegmentKind) -> ResolvedParam {
        ResolvedParam {
            name: name.to_string(),
            kind,
            validator: None,
        }
    }

    #[test]
    fn test_require_page() {
        let mut layout_schema = schema(Vec::new());
        layout_schema.matched_kind = RouteKind::Layout;
        layout_schema.template = vec!["admin".to_string()];

        let err = require_page(&layout_schema, "/admin").unwrap_err();
        assert_eq!(err.no_match_kind(), Some(NoMatchKind::MatchedWrongType));
        match err {
            RoutingError::NoMatchingRoute(err) => {
                assert_eq!(err.candidates[0].segment, "admin");
                assert_eq!(err.candidates[0].kind, RouteKind::Layout);
                assert_eq!(err.expected_kinds, vec![RouteKind::Page]);
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert!(require_page(&schema(Vec::new()), "/").is_ok());
    }

    #[test]
    fn test_missing_dynamic_is_validation_error() {
        let schema = schema(vec![param("id", SegmentKind::Dynamic)]);
        let err = validate_params(&schema, &ParamMap::new(), "/[id]").unwrap_err();
        match err {
            RoutingError::Validation(err) => {
                assert_eq!(err.expected, "string");
                assert_eq!(err.actual, Value::Null);
                assert_eq!(err.path, "/[id]");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_absent_optional_catch_all_skips_validator() {
        let mut slug = param("slug", SegmentKind::OptionalCatchAll);
        slug.validator = Some(Arc::new(ParameterConstraint::Slug));
        let validated = validate_params(&schema(vec![slug]), &ParamMap::new(), "/[[...slug]]").unwrap();
        assert!(validated.is_empty());
    }

    #[test]
    fn test_first_failure_wins() {
        let mut lang = param("lang", SegmentKind::Dynamic);
        lang.validator = Some(Arc::new(ParameterConstraint::Alpha));
        let mut id = param("id", SegmentKind::Dynamic);
        id.validator = Some(Arc::new(ParameterConstraint::Int));

        let supplied = param_map([("lang", "e1"), ("id", "x")]);
        let err = validate_params(&schema(vec![lang, id]), &supplied, "/[lang]/[id]").unwrap_err();
        match err {
            RoutingError::Validation(err) => assert_eq!(err.expected, "alpha"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_wrong_output_shape_is_defect() {
        let mut id = param("id", SegmentKind::Dynamic);
        id.validator = Some(from_fn("listify", |_| {
            Validation::Valid(Some(ParamValue::from(["a"])))
        }));
        let err = validate_params(&schema(vec![id]), &param_map([("id", "1")]), "/[id]").unwrap_err();
        assert_eq!(err.tag(), "RoutingInternalDefectError");
        assert_eq!(err.path(), Some("/[id]"));
    }

    #[test]
    fn test_empty_segment_is_validation_error_before_validator_runs() {
        let mut id = param("id", SegmentKind::Dynamic);
        id.validator = Some(from_fn("echo", |raw| Validation::Valid(raw.cloned())));
        let err = validate_params(&schema(vec![id]), &param_map([("id", "")]), "/[id]").unwrap_err();
        match err {
            RoutingError::Validation(err) => {
                assert_eq!(err.expected, "echo");
                assert_eq!(err.actual, Value::String(String::new()));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let slug = param("slug", SegmentKind::CatchAll);
        let supplied = param_map([("slug", ParamValue::from(["a", ""]))]);
        let err = validate_params(&schema(vec![slug]), &supplied, "/[...slug]").unwrap_err();
        match err {
            RoutingError::Validation(err) => assert_eq!(err.issues[0].path, vec!["1".to_string()]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_pending_is_defect() {
        let mut id = param("id", SegmentKind::Dynamic);
        id.validator = Some(from_fn("async", |_| Validation::Pending));
        let err = validate_params(&schema(vec![id]), &param_map([("id", "1")]), "/[id]").unwrap_err();
        assert!(matches!(err, RoutingError::InternalDefect(_)));
    }
}
