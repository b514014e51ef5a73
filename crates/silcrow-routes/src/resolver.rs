/// Schema resolution: walking a path down the route tree
///
/// Resolution turns a path such as `/[lang]/blog/[...slug]` (or a literal
/// one such as `/en/blog/a/b`) into the merged parameter and query schema of
/// the node it ends on. Layout-scoped query parameters accumulate on the way
/// down; page-scoped ones are only taken from the terminal node.

use std::sync::Arc;

use crate::error::{NoMatchKind, NoMatchingRouteError, RouteCandidate};
use crate::path::join_segments;
use crate::query::QuerySchemaMap;
use crate::route::{RouteKind, RouteNode, RouteTree, SegmentKind};
use crate::validator::SharedValidator;

/// A dynamic parameter bound along the resolved path
#[derive(Debug, Clone)]
pub struct ResolvedParam {
    pub name: String,
    pub kind: SegmentKind,
    /// `None` means the raw value is accepted as long as its shape fits `kind`
    pub validator: Option<SharedValidator>,
}

impl PartialEq for ResolvedParam {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && match (&self.validator, &other.validator) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Query schemas visible at the resolved node
#[derive(Debug, Clone, Default)]
pub struct ResolvedQuery {
    /// What a page at this path reads: inherited layout entries plus its own page entries
    pub page: QuerySchemaMap,
    /// What a layout at this path reads: inherited layout entries only
    pub layout: QuerySchemaMap,
}

impl PartialEq for ResolvedQuery {
    fn eq(&self, other: &Self) -> bool {
        same_schema(&self.page, &other.page) && same_schema(&self.layout, &other.layout)
    }
}

fn same_schema(a: &QuerySchemaMap, b: &QuerySchemaMap) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && Arc::ptr_eq(va, vb))
}

/// The merged schema of one path
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    /// Dynamic parameters in the order their segments appear
    pub params: Vec<ResolvedParam>,
    pub query: ResolvedQuery,
    /// Kind of the node the path ends on
    pub matched_kind: RouteKind,
    /// Authored segments of every matched node below the root
    pub template: Vec<String>,
}

impl ResolvedSchema {
    /// Looks up a parameter by name
    pub fn param(&self, name: &str) -> Option<&ResolvedParam> {
        self.params.iter().find(|param| param.name == name)
    }

    /// The authored path this schema was resolved to, e.g. `/[lang]/(shop)/cart`
    pub fn template_path(&self) -> String {
        join_segments(&self.template)
    }
}

/// Splits a path into its segments
///
/// The leading empty segment addresses the root; a trailing `/` is ignored.
///
/// ```
/// use silcrow_routes::resolver::split_path;
///
/// assert_eq!(split_path("/a/b"), vec!["", "a", "b"]);
/// assert_eq!(split_path("/a/"), vec!["", "a"]);
/// assert_eq!(split_path("/"), vec![""]);
/// assert_eq!(split_path(""), vec![""]);
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').collect();
    if segments.len() > 1 && path.ends_with('/') {
        segments.pop();
    }
    segments
}

/// Picks the node that matches `literal`, looking through groups
///
/// Returns the chain of nodes entered: any groups passed through, then the
/// matched node. An exact match on the authored segment wins, so `/[id]`
/// addresses the `[id]` node and `/new` prefers a static `new` over a
/// sibling `[id]`. Otherwise the first node whose pattern accepts the
/// literal is used. Groups never appear in URLs, so `/pricing` reaches
/// `(marketing)/pricing`.
fn find_route<'a>(candidates: &'a [RouteNode], literal: &str) -> Option<Vec<&'a RouteNode>> {
    find_through_groups(candidates, &|node: &RouteNode| node.segment() == literal)
        .or_else(|| find_through_groups(candidates, &|node: &RouteNode| node.accepts(literal)))
}

fn find_through_groups<'a>(
    candidates: &'a [RouteNode],
    matches: &dyn Fn(&RouteNode) -> bool,
) -> Option<Vec<&'a RouteNode>> {
    if let Some(node) = candidates.iter().find(|node| matches(node)) {
        return Some(vec![node]);
    }

    candidates
        .iter()
        .filter(|node| node.kind() == RouteKind::Group)
        .find_map(|group| {
            find_through_groups(group.children(), matches).map(|mut chain| {
                chain.insert(0, group);
                chain
            })
        })
}

fn describe_candidates(candidates: &[RouteNode]) -> Vec<RouteCandidate> {
    candidates
        .iter()
        .map(|node| RouteCandidate {
            segment: node.segment().to_string(),
            kind: node.kind(),
            segment_kind: node.segment_kind(),
        })
        .collect()
}

/// Merges one matched node into the accumulated schema
fn absorb(schema: &mut ResolvedSchema, node: &RouteNode, is_terminal: bool) {
    if let Some(name) = node.pattern().param_name() {
        schema.params.retain(|param| param.name != name);
        schema.params.push(ResolvedParam {
            name: name.to_string(),
            kind: node.segment_kind(),
            validator: node.validator().cloned(),
        });
    }

    let query = node.query_schema();
    for (key, parser) in &query.layout {
        schema.query.layout.insert(key.clone(), Arc::clone(parser));
        schema.query.page.insert(key.clone(), Arc::clone(parser));
    }
    if is_terminal {
        for (key, parser) in &query.page {
            schema.query.page.insert(key.clone(), Arc::clone(parser));
        }
    }

    schema.matched_kind = node.kind();
}

/// Walks `path` down `tree`
///
/// The first segment must match the root (`""`). Each following segment
/// selects one child; a catch-all reached through a literal segment swallows
/// every remaining segment and ends the walk.
pub fn resolve(tree: &RouteTree, path: &str) -> Result<ResolvedSchema, NoMatchingRouteError> {
    let segments = split_path(path);
    let root = tree.root();

    let mut schema = ResolvedSchema {
        params: Vec::new(),
        query: ResolvedQuery::default(),
        matched_kind: root.kind(),
        template: Vec::new(),
    };

    let mut candidates: &[RouteNode] = std::slice::from_ref(root);
    let mut index = 0;

    while index < segments.len() {
        let literal = segments[index];

        let chain = find_route(candidates, literal).ok_or_else(|| NoMatchingRouteError {
            path: path.to_string(),
            segment: Some(literal.to_string()),
            candidates: describe_candidates(candidates),
            expected_kinds: vec![RouteKind::Page, RouteKind::Layout, RouteKind::Group],
            kind: NoMatchKind::NoMatch,
        })?;

        let Some((&node, groups)) = chain.split_last() else {
            break;
        };

        let swallows_rest = node.segment_kind().is_catch_all() && node.segment() != literal;
        let is_terminal = swallows_rest || index + 1 == segments.len();

        for &group in groups {
            absorb(&mut schema, group, false);
            schema.template.push(group.segment().to_string());
        }
        absorb(&mut schema, node, is_terminal);
        if index > 0 {
            schema.template.push(node.segment().to_string());
        }

        if swallows_rest {
            break;
        }

        candidates = node.children();
        index += 1;
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParam;
    use crate::route::{group, layout, page};
    use crate::validator::ParameterConstraint;
    use pretty_assertions::assert_eq;

    fn tree() -> RouteTree {
        RouteTree::new(
            layout("")
                .layout_query("theme", QueryParam::string())
                .child(page("about").page_query("ref", QueryParam::string()))
                .child(
                    layout("[lang]")
                        .params(ParameterConstraint::Alpha)
                        .child(page("home"))
                        .child(page("new"))
                        .child(page("[id]").params(ParameterConstraint::Int)),
                )
                .child(group("(shop)").shared_query("currency", QueryParam::string()).child(page("cart")))
                .child(layout("docs").child(page("[...slug]"))),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_root() {
        let schema = resolve(&tree(), "/").unwrap();
        assert_eq!(schema.matched_kind, RouteKind::Layout);
        assert!(schema.params.is_empty());
        assert_eq!(schema.template_path(), "/");
        assert!(schema.query.layout.contains_key("theme"));
    }

    #[test]
    fn test_resolve_template_path_collects_params_in_order() {
        let schema = resolve(&tree(), "/[lang]/[id]").unwrap();
        let names: Vec<&str> = schema.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["lang", "id"]);
        assert_eq!(schema.matched_kind, RouteKind::Page);
        assert_eq!(schema.template, vec!["[lang]", "[id]"]);
    }

    #[test]
    fn test_resolve_literal_path_matches_dynamic_nodes() {
        let schema = resolve(&tree(), "/en/42").unwrap();
        assert_eq!(schema.template_path(), "/[lang]/[id]");
    }

    #[test]
    fn test_static_sibling_wins_over_dynamic() {
        let schema = resolve(&tree(), "/en/new").unwrap();
        assert_eq!(schema.template_path(), "/[lang]/new");
        assert_eq!(schema.params.len(), 1);
    }

    #[test]
    fn test_literal_catch_all_swallows_rest() {
        let schema = resolve(&tree(), "/docs/a/b/c").unwrap();
        assert_eq!(schema.template_path(), "/docs/[...slug]");
        assert_eq!(schema.params[0].kind, SegmentKind::CatchAll);
        assert_eq!(schema.matched_kind, RouteKind::Page);
    }

    #[test]
    fn test_page_query_only_on_terminal() {
        let about = resolve(&tree(), "/about").unwrap();
        assert!(about.query.page.contains_key("ref"));
        assert!(about.query.page.contains_key("theme"));
        assert!(!about.query.layout.contains_key("ref"));
    }

    #[test]
    fn test_group_query_inherited() {
        let cart = resolve(&tree(), "/(shop)/cart").unwrap();
        assert!(cart.query.page.contains_key("currency"));
        assert_eq!(cart.template, vec!["(shop)", "cart"]);
    }

    #[test]
    fn test_literal_path_reaches_page_inside_group() {
        let cart = resolve(&tree(), "/cart").unwrap();
        assert_eq!(cart.template_path(), "/(shop)/cart");
        assert_eq!(cart.matched_kind, RouteKind::Page);
        assert!(cart.query.page.contains_key("currency"));
    }

    #[test]
    fn test_trailing_slash_ignored() {
        assert_eq!(resolve(&tree(), "/about/").unwrap().template_path(), "/about");
    }

    #[test]
    fn test_no_match_reports_candidates() {
        let err = resolve(&tree(), "/en/home/extra").unwrap_err();
        assert_eq!(err.kind, NoMatchKind::NoMatch);
        assert_eq!(err.segment.as_deref(), Some("extra"));
        assert!(err.candidates.is_empty());

        // `[lang]` accepts any non-empty segment, so only an empty one fails at this level
        let err = resolve(&tree(), "//about").unwrap_err();
        let segments: Vec<&str> = err.candidates.iter().map(|c| c.segment.as_str()).collect();
        assert_eq!(segments, vec!["about", "[lang]", "(shop)", "docs"]);
    }

    #[test]
    fn test_path_without_leading_slash_does_not_match_root() {
        let err = resolve(&tree(), "about").unwrap_err();
        assert_eq!(err.segment.as_deref(), Some("about"));
        assert_eq!(err.candidates.len(), 1);
        assert_eq!(err.candidates[0].segment, "");
    }

    #[test]
    fn test_empty_segment_never_matches_dynamic() {
        assert!(resolve(&tree(), "/en//42").is_err());
    }
}
