//! Coordinate map: where each diagram node should be placed
//!
//! Layouts are TOML files with one `[[node]]` table per placement:
//!
//! ```toml
//! [[node]]
//! id = "EoEyUaqDCjdvldWjgz71-1"
//! name = "admin"
//! x = 40
//! y = 40
//! ```
//!
//! The layout for the Thana & Jail diagram is embedded from
//! `layouts/thana_jail.toml`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Thana & Jail diagram layout - loaded from layouts/thana_jail.toml
const THANA_JAIL_LAYOUT: &str = include_str!("../layouts/thana_jail.toml");

/// Top-left corner of a node, in diagram units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One entry of a layout file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Cell id in the diagram
    pub id: String,
    /// Human label, only used in logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl Placement {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Label for log lines: the name when present, the id otherwise
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Deserialize)]
struct LayoutFile {
    #[serde(default)]
    node: Vec<Placement>,
}

/// Node id to target position, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateMap {
    placements: Vec<Placement>,
    index: HashMap<String, usize>,
}

impl CoordinateMap {
    /// Build a map, rejecting duplicate ids, empty ids and non-finite coordinates
    pub fn new(placements: Vec<Placement>) -> Result<Self, LayoutError> {
        let mut index = HashMap::with_capacity(placements.len());

        for (position, placement) in placements.iter().enumerate() {
            if placement.id.trim().is_empty() {
                return Err(LayoutError::InvalidLayout(format!(
                    "node #{} has an empty id",
                    position + 1
                )));
            }
            if !placement.x.is_finite() || !placement.y.is_finite() {
                return Err(LayoutError::InvalidLayout(format!(
                    "node '{}' has a non-finite coordinate ({}, {})",
                    placement.id, placement.x, placement.y
                )));
            }
            if index.insert(placement.id.clone(), position).is_some() {
                return Err(LayoutError::InvalidLayout(format!(
                    "node '{}' is placed more than once",
                    placement.id
                )));
            }
        }

        Ok(Self { placements, index })
    }

    /// Build a map from `(id, x, y)` triples
    pub fn from_points<I, S>(points: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let placements = points
            .into_iter()
            .map(|(id, x, y)| Placement {
                id: id.into(),
                name: None,
                x,
                y,
            })
            .collect();
        Self::new(placements)
    }

    /// Parse a layout from TOML
    pub fn from_toml(s: &str) -> Result<Self, LayoutError> {
        let file: LayoutFile =
            toml::from_str(s).map_err(|e| LayoutError::InvalidLayout(e.to_string()))?;
        Self::new(file.node)
    }

    /// Load a layout file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| LayoutError::from_read(path, e))?;
        Self::from_toml(&content).map_err(|e| match e {
            LayoutError::InvalidLayout(detail) => {
                LayoutError::InvalidLayout(format!("{}: {}", path.display(), detail))
            }
            other => other,
        })
    }

    /// The layout for the Thana & Jail diagram
    pub fn builtin() -> Result<Self, LayoutError> {
        Self::from_toml(THANA_JAIL_LAYOUT)
    }

    /// Target position for a node id
    pub fn get(&self, id: &str) -> Option<Point> {
        self.placement(id).map(Placement::point)
    }

    pub fn placement(&self, id: &str) -> Option<&Placement> {
        self.index.get(id).map(|&i| &self.placements[i])
    }

    /// Placements in file order
    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Shortest decimal form of a coordinate (`40`, not `40.0`)
pub fn format_coordinate(value: f64) -> String {
    format!("{}", value)
}
