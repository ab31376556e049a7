//! ReportWorld implementation of the Typst World trait
//!
//! The world holds exactly one source file (the report template) and the
//! `sys.inputs` dictionary the template reads the story from. Nothing is
//! read from disk during compilation.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Array, Bytes, Datetime, Dict, Value};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, World};

use super::fonts::{global_font_cache, FontCache};
use crate::compiler::errors::ReportError;

/// Virtual path of the template inside the world
const MAIN_PATH: &str = "/main.typ";

/// An in-memory world compiling one template against JSON inputs
pub struct ReportWorld {
    /// The template source
    main: Source,
    /// Reference to the global font cache
    font_cache: &'static FontCache,
    /// System inputs (accessible via sys.inputs in Typst)
    inputs: Dict,
    /// Timestamp captured when the world was built
    time: DateTime<Utc>,
    /// Pre-hashed standard library
    library: LazyHash<Library>,
}

impl ReportWorld {
    /// Create a world for `source`, exposing the entries of `inputs` as `sys.inputs`
    ///
    /// `inputs` must be a JSON object.
    pub fn new(source: &str, inputs: &serde_json::Value) -> Result<Self, ReportError> {
        let serde_json::Value::Object(entries) = inputs else {
            return Err(ReportError::InvalidInput(
                "sys.inputs must be a JSON object".to_string(),
            ));
        };

        let mut dict = Dict::new();
        for (key, value) in entries {
            dict.insert(key.as_str().into(), json_to_typst_value(value)?);
        }

        let id = FileId::new(None, VirtualPath::new(MAIN_PATH));
        let library = Library::builder().with_inputs(dict.clone()).build();

        Ok(Self {
            main: Source::new(id, source.to_string()),
            font_cache: global_font_cache(),
            inputs: dict,
            time: Utc::now(),
            library: LazyHash::new(library),
        })
    }

    /// Get the inputs dictionary
    pub fn inputs(&self) -> &Dict {
        &self.inputs
    }

    fn not_found(id: FileId) -> FileError {
        FileError::NotFound(id.vpath().as_rootless_path().into())
    }
}

/// Convert a JSON value to a Typst Value
fn json_to_typst_value(json: &serde_json::Value) -> Result<Value, ReportError> {
    match json {
        serde_json::Value::Null => Ok(Value::None),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(ReportError::InvalidInput(format!("Invalid number: {}", n)))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Str(s.as_str().into())),
        serde_json::Value::Array(arr) => {
            let items = arr
                .iter()
                .map(json_to_typst_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(Array::from(items.as_slice())))
        }
        serde_json::Value::Object(obj) => {
            let mut dict = Dict::new();
            for (k, v) in obj {
                dict.insert(k.as_str().into(), json_to_typst_value(v)?);
            }
            Ok(Value::Dict(dict))
        }
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.font_cache.book()
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(Self::not_found(id))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        if id == self.main.id() {
            Ok(Bytes::from(self.main.text().as_bytes().to_vec()))
        } else {
            Err(Self::not_found(id))
        }
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.font_cache.font(index)
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let adjusted = self.time + Duration::hours(offset.unwrap_or(0));

        Datetime::from_ymd_hms(
            adjusted.year(),
            adjusted.month() as u8,
            adjusted.day() as u8,
            adjusted.hour() as u8,
            adjusted.minute() as u8,
            adjusted.second() as u8,
        )
    }
}
