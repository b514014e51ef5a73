/// Path utilities for normalization and assembly
///
/// All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Whether a path is already in canonical form
///
/// Canonical paths start with `/`, contain no `//` or `\`, and only the
/// root path ends with `/`.
///
/// # Examples
///
/// ```
/// use silcrow_routes::path::is_canonical_path;
///
/// assert!(is_canonical_path("/"));
/// assert!(is_canonical_path("/[lang]/(shop)/cart"));
///
/// assert!(!is_canonical_path(""));
/// assert!(!is_canonical_path("about"));
/// assert!(!is_canonical_path("/about/"));
/// assert!(!is_canonical_path("/about//page"));
/// assert!(!is_canonical_path("/about\\page"));
/// ```
pub fn is_canonical_path(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when the input is already canonical.
///
/// - Trailing slashes: `/docs/` → `/docs`
/// - Repeated slashes: `/docs//a` → `/docs/a`
/// - Backslashes: `\docs\a` → `/docs/a`
/// - Missing leading slash: `docs` → `/docs`
///
/// Segment text is left alone, so `[id]` and `(group)` survive untouched.
///
/// # Examples
///
/// ```
/// use silcrow_routes::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_path("/[lang]//home/"), "/[lang]/home");
/// assert_eq!(normalize_path("\\docs\\a"), "/docs/a");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_canonical_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Joins URL segments into an absolute path; no segments yields `/`
///
/// ```
/// use silcrow_routes::path::join_segments;
///
/// assert_eq!(join_segments(["en", "home"]), "/en/home");
/// assert_eq!(join_segments(Vec::<String>::new()), "/");
/// ```
pub fn join_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment.as_ref());
    }

    if path.is_empty() {
        path.push('/');
    }
    path
}
