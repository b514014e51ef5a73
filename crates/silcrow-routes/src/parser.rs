/// Request parsing: raw params and query → validated, typed values

use serde::Serialize;

use crate::error::RoutingError;
use crate::params::{require_page, validate_params};
use crate::query::QueryCodec;
use crate::resolver::ResolvedSchema;
use crate::value::{ParamMap, QueryValues, RawQuery};

/// What the host asks to parse a request for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseTarget {
    /// A page render: the path must end on a page, page-scoped query applies
    Page,
    /// A layout render: any node kind, layout-scoped query only
    Layout,
}

/// Validated parameters and typed query values of one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRoute {
    /// Validated parameter values; an absent optional catch-all has no entry
    pub params: ParamMap,
    /// Every key of the applicable query schema, `null` when missing
    pub query: QueryValues,
}

/// Parses a request against a resolved schema
///
/// Parameters are validated first (values are taken as given, no
/// percent-decoding); the raw query is then loaded against the scope the
/// target reads.
pub(crate) fn parse_request(
    schema: &ResolvedSchema,
    path: &str,
    target: ParseTarget,
    raw_params: &ParamMap,
    raw_query: &RawQuery,
    codec: &dyn QueryCodec,
) -> Result<ParsedRoute, RoutingError> {
    if target == ParseTarget::Page {
        require_page(schema, path)?;
    }

    let params = validate_params(schema, raw_params, path)?;

    let query_schema = match target {
        ParseTarget::Page => &schema.query.page,
        ParseTarget::Layout => &schema.query.layout,
    };
    let query = codec.parse(query_schema, raw_query);

    Ok(ParsedRoute { params, query })
}
