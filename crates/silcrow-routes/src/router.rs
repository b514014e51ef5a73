/// Router: a route tree plus a memoized schema resolver
///
/// All operations are synchronous and side-effect free apart from filling the
/// schema cache. A `Router` is `Send + Sync` and is meant to be built once
/// and shared.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::builder;
use crate::config::RouterConfig;
use crate::error::RoutingError;
use crate::parser::{parse_request, ParseTarget, ParsedRoute};
use crate::path::normalize_path;
use crate::query::{QueryCodec, UrlQueryCodec};
use crate::resolver::{resolve, ResolvedSchema};
use crate::route::{RouteNode, RouteTree, TreeError};
use crate::value::{ParamMap, QueryValues, RawQuery};

/// Resolves, builds and parses against one route tree
///
/// # Examples
///
/// ```
/// use silcrow_routes::{layout, page, param_map, QueryValues, Router};
///
/// let router = Router::try_new(
///     layout("").child(layout("[lang]").child(page("home"))),
/// ).unwrap();
///
/// let url = router
///     .build_url("/[lang]/home", &param_map([("lang", "en")]), &QueryValues::new())
///     .unwrap();
/// assert_eq!(url, "/en/home");
/// ```
pub struct Router {
    tree: RouteTree,
    config: RouterConfig,
    codec: Arc<dyn QueryCodec>,
    cache: RwLock<HashMap<String, Arc<ResolvedSchema>>>,
    walks: AtomicUsize,
}

impl Router {
    /// Creates a router with the default configuration
    pub fn new(tree: RouteTree) -> Self {
        let config = RouterConfig::default();
        Self {
            tree,
            codec: default_codec(&config),
            config,
            cache: RwLock::new(HashMap::new()),
            walks: AtomicUsize::new(0),
        }
    }

    /// Validates `root` as a tree and creates a router for it
    pub fn try_new(root: RouteNode) -> Result<Self, TreeError> {
        RouteTree::new(root).map(Self::new)
    }

    // ========================================================================
    // Functional Builder Methods
    // ========================================================================

    /// Applies a configuration (functional builder)
    ///
    /// Resets the query codec to the default one configured by `config`, so
    /// call [`with_query_codec`](Self::with_query_codec) afterwards to keep a
    /// custom codec.
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.codec = default_codec(&config);
        self.config = config;
        self.clear_cache();
        self
    }

    /// Replaces the query codec (functional builder)
    pub fn with_query_codec<C>(mut self, codec: C) -> Self
    where
        C: QueryCodec + 'static,
    {
        self.codec = Arc::new(codec);
        self
    }

    // ========================================================================
    // Operations
    // ========================================================================

    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Resolves the merged parameter and query schema of `path`
    ///
    /// When `cache_schemas` is on, schemas are cached under their template
    /// path (`/[lang]/home`), so the cache never holds more entries than the
    /// tree has nodes. A template path is answered from the cache without
    /// walking the tree; a literal path (`/en/home`) is walked every time and
    /// then shares the cached `Arc` of its template.
    pub fn resolve_schema(&self, path: &str) -> Result<Arc<ResolvedSchema>, RoutingError> {
        let key = if self.config.normalize_paths {
            normalize_path(path)
        } else {
            Cow::Borrowed(path)
        };

        if self.config.cache_schemas {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(key.as_ref()) {
                trace!(path = %key, "route schema cache hit");
                return Ok(Arc::clone(hit));
            }
        }

        debug!(path = %key, "resolving route schema");
        self.walks.fetch_add(1, Ordering::Relaxed);
        let schema = Arc::new(resolve(&self.tree, &key)?);

        if !self.config.cache_schemas {
            return Ok(schema);
        }

        let template = schema.template_path();
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let cached = cache.entry(template).or_insert(schema);
        Ok(Arc::clone(cached))
    }

    /// Builds the URL of the page at `path`
    ///
    /// `path` names a route, normally by its template (`/[lang]/home`). A
    /// literal path such as `/en/home` names the same route, but its segment
    /// values are not used: every parameter still comes from `params`, so
    /// `build_url("/en/home", {lang: "fr"})` yields `/fr/home` and leaving
    /// `lang` out is a validation error.
    pub fn build_url(
        &self,
        path: &str,
        params: &ParamMap,
        query: &QueryValues,
    ) -> Result<String, RoutingError> {
        let schema = self.resolve_schema(path)?;
        builder::build_url(&schema, path, params, query, self.codec.as_ref())
    }

    /// Like [`build_url`](Self::build_url) but panics on any error
    pub fn build_url_or_panic(&self, path: &str, params: &ParamMap, query: &QueryValues) -> String {
        match self.build_url(path, params, query) {
            Ok(url) => url,
            Err(err) => panic!("{}", err),
        }
    }

    /// Validates the params and loads the query of a page request
    pub fn parse_page(
        &self,
        path: &str,
        raw_params: &ParamMap,
        raw_query: &RawQuery,
    ) -> Result<ParsedRoute, RoutingError> {
        self.parse(path, ParseTarget::Page, raw_params, raw_query)
    }

    /// Validates the params and loads the layout-scoped query of a layout request
    pub fn parse_layout(
        &self,
        path: &str,
        raw_params: &ParamMap,
        raw_query: &RawQuery,
    ) -> Result<ParsedRoute, RoutingError> {
        self.parse(path, ParseTarget::Layout, raw_params, raw_query)
    }

    pub fn parse(
        &self,
        path: &str,
        target: ParseTarget,
        raw_params: &ParamMap,
        raw_query: &RawQuery,
    ) -> Result<ParsedRoute, RoutingError> {
        let schema = self.resolve_schema(path)?;
        parse_request(&schema, path, target, raw_params, raw_query, self.codec.as_ref())
    }

    /// Returns a URL serializer bound to the page at `path`
    ///
    /// Nothing is resolved until the serializer is used.
    ///
    /// ```
    /// use silcrow_routes::{layout, page, query_values, ParamMap, QueryParam, Router};
    ///
    /// let router = Router::try_new(
    ///     layout("").child(page("search").page_query("q", QueryParam::string())),
    /// ).unwrap();
    ///
    /// let search = router.serializer("/search");
    /// let url = search.build_or_panic(&ParamMap::new(), &query_values([("q", "rust")]));
    /// assert_eq!(url, "/search?q=rust");
    /// ```
    pub fn serializer(&self, path: impl Into<String>) -> UrlSerializer<'_> {
        UrlSerializer {
            router: self,
            path: path.into(),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Number of tree walks performed so far (cache misses)
    pub fn tree_walks(&self) -> usize {
        self.walks.load(Ordering::Relaxed)
    }

    /// Paths currently held in the schema cache, sorted
    pub fn cached_paths(&self) -> Vec<String> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<String> = cache.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Drops every cached schema
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("cached_paths", &self.cached_paths())
            .field("tree_walks", &self.tree_walks())
            .finish_non_exhaustive()
    }
}

fn default_codec(config: &RouterConfig) -> Arc<dyn QueryCodec> {
    Arc::new(UrlQueryCodec::new().with_clear_on_default(config.clear_on_default))
}

/// URL builder bound to one page path
#[derive(Debug, Clone)]
pub struct UrlSerializer<'a> {
    router: &'a Router,
    path: String,
}

impl UrlSerializer<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn build(&self, params: &ParamMap, query: &QueryValues) -> Result<String, RoutingError> {
        self.router.build_url(&self.path, params, query)
    }

    pub fn build_or_panic(&self, params: &ParamMap, query: &QueryValues) -> String {
        self.router.build_url_or_panic(&self.path, params, query)
    }
}
