//! Table blocks and their visual style

use serde::{Deserialize, Serialize};

use crate::compiler::errors::ReportError;

/// Column widths (cm) for "attribute name / description" tables
pub const TWO_COLUMN_WIDTHS_CM: [f64; 2] = [5.5, 11.5];

/// Column widths (cm) for "relation / cardinality / rationale" tables
pub const THREE_COLUMN_WIDTHS_CM: [f64; 3] = [4.5, 6.0, 7.0];

/// Vertical space appended after every table, in points
pub const TABLE_SPACE_AFTER_PT: f64 = 10.0;

/// Preset column widths for a column count; `None` lets Typst auto-size
pub fn column_widths(columns: usize) -> Option<Vec<f64>> {
    match columns {
        2 => Some(TWO_COLUMN_WIDTHS_CM.to_vec()),
        3 => Some(THREE_COLUMN_WIDTHS_CM.to_vec()),
        _ => None,
    }
}

/// A rectangular grid of text cells with a header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Widths in centimetres, one per column
    pub column_widths: Option<Vec<f64>>,
    /// Space after the table, in points
    pub space_after: f64,
}

impl Table {
    /// Build a table, rejecting ragged or empty grids
    pub fn new<H, S>(header: H, rows: Vec<Vec<String>>) -> Result<Self, ReportError>
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header: Vec<String> = header.into_iter().map(Into::into).collect();
        if header.is_empty() {
            return Err(ReportError::MalformedTable(
                "table has no columns".to_string(),
            ));
        }

        for (index, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(ReportError::MalformedTable(format!(
                    "row {} has {} cells, expected {}",
                    index + 1,
                    row.len(),
                    header.len()
                )));
            }
        }

        let column_widths = column_widths(header.len());
        Ok(Self {
            header,
            rows,
            column_widths,
            space_after: TABLE_SPACE_AFTER_PT,
        })
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of rows including the header row
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Total of the preset widths in centimetres
    pub fn total_width_cm(&self) -> Option<f64> {
        self.column_widths.as_ref().map(|w| w.iter().sum())
    }
}

/// Look of every table in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    /// Header row background
    pub header_fill: String,
    /// Header row text colour
    pub header_text: String,
    /// Grid line colour
    pub grid_color: String,
    /// Grid line thickness in points
    pub grid_width: f64,
    /// Cell font size in points
    pub cell_size: f64,
    /// Vertical alignment of every cell
    pub valign: String,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_fill: "#0b3d91".to_string(),
            header_text: "#ffffff".to_string(),
            grid_color: "#d0d7de".to_string(),
            grid_width: 0.5,
            cell_size: 9.0,
            valign: "top".to_string(),
        }
    }
}
