/// Route module: the immutable route-tree data model
///
/// Contains pure functional components for declaring and checking routes:
/// - `pattern`: segment syntax (`[id]`, `[...slug]`, `(group)`, ...)
/// - `node`: page/layout/group nodes and their builders
/// - `tree`: the validated tree with its single root

pub mod node;
pub mod pattern;
pub mod tree;

// Re-export commonly used types
pub use node::{group, layout, page, QuerySchema, RouteKind, RouteNode};
pub use pattern::{classify_segment, validate_segment, PatternSegmentType, SegmentKind};
pub use tree::{RouteTree, TreeError};
