/// Route nodes: pages, layouts and groups
///
/// Nodes are built once with the `page`/`layout`/`group` constructors and the
/// chainable builder methods below, then handed to [`RouteTree::new`](super::RouteTree::new),
/// which checks the tree invariants. Nothing mutates a node after that.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pattern::{classify_segment, PatternSegmentType, SegmentKind};
use crate::query::{QueryParser, QuerySchemaMap, SharedQueryParser};
use crate::validator::{SharedValidator, Validator};
use std::sync::Arc;

/// Kind of a route node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteKind {
    /// Renderable endpoint
    Page,
    /// Shared scope for its descendants
    Layout,
    /// Path-transparent organizational node
    Group,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Page => f.write_str("page"),
            RouteKind::Layout => f.write_str("layout"),
            RouteKind::Group => f.write_str("group"),
        }
    }
}

/// Query parameters declared on a node
///
/// `layout` entries are inherited by every descendant; `page` entries only
/// apply when this node is the page being addressed.
#[derive(Debug, Clone, Default)]
pub struct QuerySchema {
    pub layout: QuerySchemaMap,
    pub page: QuerySchemaMap,
}

impl QuerySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter inherited by every descendant page
    pub fn layout<P>(mut self, key: impl Into<String>, parser: P) -> Self
    where
        P: QueryParser + 'static,
    {
        self.layout.insert(key.into(), Arc::new(parser));
        self
    }

    /// Adds a parameter visible only on this exact page
    pub fn page<P>(mut self, key: impl Into<String>, parser: P) -> Self
    where
        P: QueryParser + 'static,
    {
        self.page.insert(key.into(), Arc::new(parser));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty() && self.page.is_empty()
    }
}

/// A node of the route tree
///
/// # Examples
///
/// ```
/// use silcrow_routes::{group, layout, page, QueryParam, RouteKind};
///
/// let root = layout("")
///     .child(page("about"))
///     .child(group("(shop)").shared_query("currency", QueryParam::string()).child(page("cart")));
///
/// assert_eq!(root.kind(), RouteKind::Layout);
/// assert_eq!(root.children().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RouteNode {
    kind: RouteKind,
    segment: String,
    params: Option<SharedValidator>,
    query: QuerySchema,
    children: Vec<RouteNode>,
}

/// Declares a page node
pub fn page(segment: impl Into<String>) -> RouteNode {
    RouteNode::new(RouteKind::Page, segment)
}

/// Declares a layout node
pub fn layout(segment: impl Into<String>) -> RouteNode {
    RouteNode::new(RouteKind::Layout, segment)
}

/// Declares a group node, e.g. `group("(marketing)")`
pub fn group(segment: impl Into<String>) -> RouteNode {
    RouteNode::new(RouteKind::Group, segment)
}

impl RouteNode {
    fn new(kind: RouteKind, segment: impl Into<String>) -> Self {
        Self {
            kind,
            segment: segment.into(),
            params: None,
            query: QuerySchema::default(),
            children: Vec::new(),
        }
    }

    // ========================================================================
    // Functional Builder Methods
    // ========================================================================

    /// Sets the validator for this node's dynamic segment
    pub fn params<V>(self, validator: V) -> Self
    where
        V: Validator + 'static,
    {
        self.params_shared(Arc::new(validator))
    }

    /// Sets an already shared validator for this node's dynamic segment
    pub fn params_shared(mut self, validator: SharedValidator) -> Self {
        self.params = Some(validator);
        self
    }

    /// Replaces the query schema
    pub fn query(mut self, query: QuerySchema) -> Self {
        self.query = query;
        self
    }

    /// Adds a layout-scoped query parameter
    pub fn layout_query<P>(mut self, key: impl Into<String>, parser: P) -> Self
    where
        P: QueryParser + 'static,
    {
        self.query = self.query.layout(key, parser);
        self
    }

    /// Adds a page-scoped query parameter
    pub fn page_query<P>(mut self, key: impl Into<String>, parser: P) -> Self
    where
        P: QueryParser + 'static,
    {
        self.query = self.query.page(key, parser);
        self
    }

    /// Adds a query parameter shared with descendants
    ///
    /// On a page the parameter is both page- and layout-scoped, so the page
    /// and everything below it sees it. On a layout or group it is
    /// layout-scoped only.
    pub fn shared_query<P>(mut self, key: impl Into<String>, parser: P) -> Self
    where
        P: QueryParser + 'static,
    {
        let key = key.into();
        let parser: SharedQueryParser = Arc::new(parser);
        if self.kind == RouteKind::Page {
            self.query.page.insert(key.clone(), Arc::clone(&parser));
        }
        self.query.layout.insert(key, parser);
        self
    }

    /// Appends a child node
    pub fn child(mut self, child: RouteNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child nodes
    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = RouteNode>,
    {
        self.children.extend(children);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// The segment as authored, e.g. `"[id]"`
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The segment pattern, derived from the authored text
    pub fn pattern(&self) -> PatternSegmentType {
        classify_segment(&self.segment)
    }

    pub fn segment_kind(&self) -> SegmentKind {
        self.pattern().kind()
    }

    pub fn validator(&self) -> Option<&SharedValidator> {
        self.params.as_ref()
    }

    pub fn query_schema(&self) -> &QuerySchema {
        &self.query
    }

    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }

    /// Whether this node accepts the literal path segment
    ///
    /// Static and group segments match by equality, `[name]` matches any
    /// non-empty segment, catch-alls match any non-empty first segment (the
    /// resolver hands them the rest of the path).
    pub fn accepts(&self, literal: &str) -> bool {
        match self.segment_kind() {
            SegmentKind::Static | SegmentKind::Group => self.segment == literal,
            SegmentKind::Dynamic | SegmentKind::CatchAll | SegmentKind::OptionalCatchAll => {
                !literal.is_empty()
            }
        }
    }
}
