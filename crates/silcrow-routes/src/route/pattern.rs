/// Pattern parsing for authored route segments
///
/// Pure functional parsing of segment strings (`about`, `[id]`, `[...slug]`,
/// `[[...slug]]`, `(marketing)`) into typed segments.
/// All functions are **pure**: same input → same output, no side effects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an authored segment, without its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    /// Literal text, matched by equality
    Static,
    /// `[name]`: exactly one non-empty segment
    Dynamic,
    /// `[...name]`: one or more trailing segments
    CatchAll,
    /// `[[...name]]`: zero or more trailing segments
    OptionalCatchAll,
    /// `(name)`: organizational, never part of a URL
    Group,
}

impl SegmentKind {
    /// Whether this kind binds a route parameter
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            SegmentKind::Dynamic | SegmentKind::CatchAll | SegmentKind::OptionalCatchAll
        )
    }

    /// Whether this kind swallows every remaining path segment
    pub fn is_catch_all(self) -> bool {
        matches!(self, SegmentKind::CatchAll | SegmentKind::OptionalCatchAll)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentKind::Static => "static",
            SegmentKind::Dynamic => "dynamic",
            SegmentKind::CatchAll => "catch-all",
            SegmentKind::OptionalCatchAll => "optional catch-all",
            SegmentKind::Group => "group",
        };
        f.write_str(name)
    }
}

/// Represents the different types of authored route segments
///
/// Functional sum type for pattern matching route segments.
/// Dynamic variants carry the parameter name, the others carry the literal text.
///
/// # Examples
///
/// ```
/// use silcrow_routes::route::pattern::{classify_segment, PatternSegmentType};
///
/// assert!(matches!(classify_segment("about"), PatternSegmentType::Static(_)));
/// assert!(matches!(classify_segment("[id]"), PatternSegmentType::Dynamic(_)));
/// assert!(matches!(classify_segment("[...slug]"), PatternSegmentType::CatchAll(_)));
/// assert!(matches!(classify_segment("[[...slug]]"), PatternSegmentType::OptionalCatchAll(_)));
/// assert!(matches!(classify_segment("(marketing)"), PatternSegmentType::Group(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegmentType {
    /// Optional catch-all segment: [[...slug]]
    OptionalCatchAll(String),
    /// Catch-all segment: [...slug]
    CatchAll(String),
    /// Dynamic segment: [id]
    Dynamic(String),
    /// Route group: (marketing)
    Group(String),
    /// Static text segment
    Static(String),
}

impl PatternSegmentType {
    /// Returns the kind of this segment
    pub fn kind(&self) -> SegmentKind {
        match self {
            PatternSegmentType::OptionalCatchAll(_) => SegmentKind::OptionalCatchAll,
            PatternSegmentType::CatchAll(_) => SegmentKind::CatchAll,
            PatternSegmentType::Dynamic(_) => SegmentKind::Dynamic,
            PatternSegmentType::Group(_) => SegmentKind::Group,
            PatternSegmentType::Static(_) => SegmentKind::Static,
        }
    }

    /// Returns the parameter name for dynamic segments
    ///
    /// ```
    /// use silcrow_routes::route::pattern::classify_segment;
    ///
    /// assert_eq!(classify_segment("[[...slug]]").param_name(), Some("slug"));
    /// assert_eq!(classify_segment("about").param_name(), None);
    /// ```
    pub fn param_name(&self) -> Option<&str> {
        match self {
            PatternSegmentType::OptionalCatchAll(name)
            | PatternSegmentType::CatchAll(name)
            | PatternSegmentType::Dynamic(name) => Some(name),
            PatternSegmentType::Group(_) | PatternSegmentType::Static(_) => None,
        }
    }
}

/// Classifies an authored segment into a pattern type (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. **Optional catch-all**: `[[...name]]`
/// 2. **Catch-all**: `[...name]`
/// 3. **Dynamic**: `[name]`
/// 4. **Group**: `(name)`
/// 5. **Static**: any other text
///
/// Malformed brackets fall through to `Static`; use [`validate_segment`]
/// to reject them when a tree is assembled.
pub fn classify_segment(segment: &str) -> PatternSegmentType {
    if let Some(name) = segment
        .strip_prefix("[[...")
        .and_then(|s| s.strip_suffix("]]"))
    {
        return PatternSegmentType::OptionalCatchAll(name.to_string());
    }

    if let Some(inner) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return match inner.strip_prefix("...") {
            Some(name) => PatternSegmentType::CatchAll(name.to_string()),
            None => PatternSegmentType::Dynamic(inner.to_string()),
        };
    }

    match segment.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(_) => PatternSegmentType::Group(segment.to_string()),
        None => PatternSegmentType::Static(segment.to_string()),
    }
}

/// Checks that an authored segment is well formed
///
/// Rejects separators inside a segment, empty parameter or group names,
/// and brackets or parentheses that do not form one of the known patterns.
///
/// ```
/// use silcrow_routes::route::pattern::validate_segment;
///
/// assert!(validate_segment("[id]").is_ok());
/// assert!(validate_segment("[id").is_err());
/// assert!(validate_segment("[]").is_err());
/// assert!(validate_segment("a/b").is_err());
/// ```
pub fn validate_segment(segment: &str) -> Result<(), String> {
    if segment.contains('/') {
        return Err("segment must not contain '/'".to_string());
    }

    match classify_segment(segment) {
        PatternSegmentType::OptionalCatchAll(name)
        | PatternSegmentType::CatchAll(name)
        | PatternSegmentType::Dynamic(name) => {
            if name.is_empty() {
                Err("parameter name must not be empty".to_string())
            } else if name.contains(['[', ']', '.', '(', ')']) {
                Err(format!("invalid parameter name '{}'", name))
            } else {
                Ok(())
            }
        }
        PatternSegmentType::Group(label) => {
            if label.len() <= 2 {
                Err("group name must not be empty".to_string())
            } else {
                Ok(())
            }
        }
        PatternSegmentType::Static(text) => {
            if text.contains(['[', ']']) || text.starts_with('(') || text.ends_with(')') {
                Err(format!("unbalanced brackets in '{}'", text))
            } else {
                Ok(())
            }
        }
    }
}
