//! # Silcrow Routes
//!
//! Route-tree resolution, URL building and request parsing for
//! file-system style routing with pages, layouts and groups:
//! - Static segments (`/about`)
//! - Dynamic parameters (`/users/[id]`)
//! - Catch-all routes (`/docs/[...slug]`)
//! - Optional catch-all routes (`/shop/[[...filters]]`)
//! - Route groups that never appear in URLs (`/(marketing)/pricing`)
//!
//! ## Route Trees
//!
//! Trees are declared with the `page`/`layout`/`group` builders and checked
//! once by [`RouteTree::new`]. Dynamic segments carry an optional
//! [`Validator`]; any node can declare query parameters, either visible to
//! everything below it (layout scope) or only to the page itself (page scope).
//!
//! ## Schema Resolution
//!
//! A path, written as a template (`/[lang]/home`) or literally (`/en/home`),
//! resolves to the merged parameter and query schema of the node it ends on.
//! Resolutions are memoized under the template path, so a template is walked
//! at most once and the cache stays bounded by the size of the tree.
//!
//! ## Building URLs
//!
//! The path given to [`Router::build_url`] only selects the route. Values
//! always come from the parameter map: building `/en/home` with
//! `lang = "fr"` yields `/fr/home`, and omitting `lang` is a validation
//! error even though the path spells out `en`. Pass template paths to keep
//! this explicit.
//!
//! ## Errors
//!
//! Every operation returns a [`RoutingError`]:
//! - `Validation`: a supplied value was rejected
//! - `NoMatchingRoute`: nothing matched (`noMatch`) or a non-page matched where
//!   a page is required (`matchedWrongType`)
//! - `InternalDefect`: a broken integration contract, such as an asynchronous
//!   validator
//!
//! ## Example
//!
//! ```
//! use silcrow_routes::{
//!     group, layout, page, param_map, parse_query_string, query_values, ParamValue,
//!     ParameterConstraint, QueryParam, Router,
//! };
//!
//! let router = Router::try_new(
//!     layout("")
//!         .layout_query("theme", QueryParam::string())
//!         .child(
//!             layout("[lang]")
//!                 .params(ParameterConstraint::Alpha)
//!                 .child(page("home").page_query("tab", QueryParam::string())),
//!         )
//!         .child(group("(marketing)").child(page("pricing"))),
//! )
//! .unwrap();
//!
//! let url = router
//!     .build_url(
//!         "/[lang]/home",
//!         &param_map([("lang", "en")]),
//!         &query_values([("theme", "dark"), ("tab", "feed")]),
//!     )
//!     .unwrap();
//! assert_eq!(url, "/en/home?tab=feed&theme=dark");
//!
//! let parsed = router
//!     .parse_page("/[lang]/home", &param_map([("lang", "en")]), &parse_query_string("tab=feed"))
//!     .unwrap();
//! assert_eq!(parsed.params["lang"], ParamValue::from("en"));
//! assert_eq!(parsed.query["tab"], "feed");
//!
//! let pricing = router.build_url("/(marketing)/pricing", &Default::default(), &Default::default());
//! assert_eq!(pricing.unwrap(), "/pricing");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod builder;
pub mod config;
pub mod error;
mod params;
pub mod parser;
pub mod path;
pub mod query;
pub mod resolver;
pub mod route;
pub mod router;
pub mod validator;
pub mod value;

// ============================================================================
// Public API
// ============================================================================

pub use config::RouterConfig;
pub use error::{
    InternalDefectError, NoMatchKind, NoMatchingRouteError, RouteCandidate, RoutingError,
    ValidationError,
};
pub use parser::{ParseTarget, ParsedRoute};
pub use path::{is_canonical_path, normalize_path};
pub use query::{
    parse_query_string, QueryCodec, QueryIssue, QueryParam, QueryParser, UrlQueryCodec,
};
pub use resolver::{ResolvedParam, ResolvedQuery, ResolvedSchema};
pub use route::{
    classify_segment, group, layout, page, PatternSegmentType, QuerySchema, RouteKind,
    RouteNode, RouteTree, SegmentKind, TreeError,
};
pub use router::{Router, UrlSerializer};
pub use validator::{
    from_fn, map_string, Issue, ParameterConstraint, PatternValidator, ShapeValidator,
    SharedValidator, Validation, Validator,
};
pub use value::{param_map, query_values, ParamMap, ParamValue, QueryValues, RawQuery};
