//! draw.io ER diagram layout fixer
//!
//! Moves diagram nodes to the positions of a coordinate map, clears edge
//! waypoints so draw.io re-routes them, and gives edges orthogonal routing.
//!
//! - [`fix_layout`] / [`fix_layout_str`]: streaming rewrite of a document
//! - [`CoordinateMap`]: node id to position, loaded from TOML
//! - [`normalize_edge_style`]: the routing-style check on its own

pub mod error;
pub mod layout;
pub mod rewrite;
pub mod style;

pub use error::LayoutError;
pub use layout::{CoordinateMap, Placement, Point};
pub use rewrite::{fix_layout, fix_layout_str, FixOptions, FixSummary};
pub use style::{has_routing_style, normalize_edge_style, ORTHOGONAL_EDGE_PREFIX};
