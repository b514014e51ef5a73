/// Routing errors
///
/// Three disjoint kinds, all carrying the path they were raised for:
/// - [`ValidationError`]: a supplied value failed its declared validator
/// - [`NoMatchingRouteError`]: no node matched, or the wrong kind of node did
/// - [`InternalDefectError`]: an integration contract was broken (never user input)

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::route::{RouteKind, SegmentKind};
use crate::validator::Issue;

/// A supplied parameter or query value failed validation
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("expected {expected}, got {actual} at path {path}: {}", join_issues(.issues))]
pub struct ValidationError {
    /// Description of the validator or parser that rejected the value
    pub expected: String,
    pub actual: Value,
    pub path: String,
    pub issues: Vec<Issue>,
}

/// Why a path did not resolve to a usable node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoMatchKind {
    /// A segment matched none of the candidates at its level
    NoMatch,
    /// Every segment matched, but the terminal node has the wrong kind
    MatchedWrongType,
}

impl fmt::Display for NoMatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchKind::NoMatch => f.write_str("noMatch"),
            NoMatchKind::MatchedWrongType => f.write_str("matchedWrongType"),
        }
    }
}

/// A node considered while matching one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCandidate {
    pub segment: String,
    pub kind: RouteKind,
    pub segment_kind: SegmentKind,
}

impl fmt::Display for RouteCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.segment, self.kind)
    }
}

/// No route node matches the path, or the match has the wrong kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error(
    "no matching route found for path {path} ({kind}), expected a {} out of [{}]",
    join_kinds(.expected_kinds),
    join_candidates(.candidates)
)]
pub struct NoMatchingRouteError {
    pub path: String,
    /// The literal segment that failed to match, for `NoMatch`
    pub segment: Option<String>,
    pub candidates: Vec<RouteCandidate>,
    pub expected_kinds: Vec<RouteKind>,
    pub kind: NoMatchKind,
}

/// A broken integration contract, e.g. an asynchronous validator
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct InternalDefectError {
    pub message: String,
    pub metadata: BTreeMap<String, Value>,
}

impl InternalDefectError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Any failure of a routing operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NoMatchingRoute(#[from] NoMatchingRouteError),

    #[error(transparent)]
    InternalDefect(#[from] InternalDefectError),
}

impl RoutingError {
    /// Stable tag for logs and assertions
    pub fn tag(&self) -> &'static str {
        match self {
            RoutingError::Validation(_) => "RoutingValidationError",
            RoutingError::NoMatchingRoute(_) => "RoutingNoMatchingRouteError",
            RoutingError::InternalDefect(_) => "RoutingInternalDefectError",
        }
    }

    /// The path the error was raised for, when known
    pub fn path(&self) -> Option<&str> {
        match self {
            RoutingError::Validation(err) => Some(&err.path),
            RoutingError::NoMatchingRoute(err) => Some(&err.path),
            RoutingError::InternalDefect(err) => {
                err.metadata.get("path").and_then(Value::as_str)
            }
        }
    }

    pub fn no_match_kind(&self) -> Option<NoMatchKind> {
        match self {
            RoutingError::NoMatchingRoute(err) => Some(err.kind),
            RoutingError::Validation(_) | RoutingError::InternalDefect(_) => None,
        }
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_kinds(kinds: &[RouteKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_candidates(candidates: &[RouteCandidate]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_match_message() {
        let err = NoMatchingRouteError {
            path: "/nope".to_string(),
            segment: Some("nope".to_string()),
            candidates: vec![RouteCandidate {
                segment: "about".to_string(),
                kind: RouteKind::Page,
                segment_kind: SegmentKind::Static,
            }],
            expected_kinds: vec![RouteKind::Page, RouteKind::Layout, RouteKind::Group],
            kind: NoMatchKind::NoMatch,
        };
        assert_eq!(
            err.to_string(),
            "no matching route found for path /nope (noMatch), expected a page, layout, group out of [about (page)]"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError {
            expected: "uuid".to_string(),
            actual: Value::String("x".to_string()),
            path: "/[id]".to_string(),
            issues: vec![Issue::new("'x' is not a valid uuid")],
        };
        assert_eq!(
            err.to_string(),
            "expected uuid, got \"x\" at path /[id]: 'x' is not a valid uuid"
        );
    }

    #[test]
    fn test_routing_error_accessors() {
        let err: RoutingError = InternalDefectError::new("async validator")
            .with_meta("path", "/[id]")
            .into();
        assert_eq!(err.tag(), "RoutingInternalDefectError");
        assert_eq!(err.path(), Some("/[id]"));
        assert_eq!(err.no_match_kind(), None);
        assert_eq!(err.to_string(), "async validator");
    }

    #[test]
    fn test_no_match_kind_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&NoMatchKind::MatchedWrongType).unwrap(),
            "\"matchedWrongType\""
        );
    }
}
