//! Edge style strings
//!
//! A draw.io style is a `;`-separated list of `key=value` tokens (a bare
//! token such as `ellipse` names a shape). Only the `edgeStyle` key matters
//! here: an edge that declares any routing style is left alone.

/// Prepended to edges that declare no routing style
pub const ORTHOGONAL_EDGE_PREFIX: &str =
    "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;";

/// Key that selects an edge's routing style
const EDGE_STYLE_KEY: &str = "edgeStyle";

/// Keys of a style string, in order
pub fn style_keys(style: &str) -> impl Iterator<Item = &str> {
    style
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.split_once('=').map_or(token, |(key, _)| key).trim())
}

/// True when the style has an `edgeStyle` token, whatever its value
pub fn has_routing_style(style: &str) -> bool {
    style_keys(style).any(|key| key == EDGE_STYLE_KEY)
}

/// The orthogonal-routing style for an edge, or `None` if it already has one
///
/// The existing style is kept verbatim after the prefix.
pub fn normalize_edge_style(style: &str) -> Option<String> {
    if has_routing_style(style) {
        None
    } else {
        Some(format!("{}{}", ORTHOGONAL_EDGE_PREFIX, style))
    }
}
