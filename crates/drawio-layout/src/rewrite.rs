//! Streaming rewrite of a draw.io document
//!
//! The document is read event by event with `quick-xml` and written back
//! unchanged except for three edits:
//! - the `mxGeometry` of every mapped cell gets the mapped `x`/`y`
//! - `Array` waypoint lists directly inside an edge's geometry are dropped
//! - edges without an `edgeStyle` token get the orthogonal routing prefix
//!
//! Elements that are not edited keep their original bytes, so comments,
//! attribute order and escaping survive the round trip.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::LayoutError;
use crate::layout::{format_coordinate, CoordinateMap};
use crate::style::normalize_edge_style;

/// Path reported in parse errors of in-memory documents
const INLINE_SOURCE: &str = "<inline>";

/// How [`fix_layout`] treats the file and unmatched ids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixOptions {
    /// Compute the summary but leave the file untouched
    pub dry_run: bool,
    /// Fail when a mapped id does not exist in the diagram
    pub strict: bool,
}

/// What a rewrite changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixSummary {
    /// Geometries moved to their mapped position
    pub repositioned: usize,
    /// Mapped ids with no matching cell geometry, in layout order
    pub missing: Vec<String>,
    /// Waypoint lists removed from edges
    pub waypoints_cleared: usize,
    /// Edge styles that received the routing prefix
    pub styles_normalized: usize,
    /// Edges seen
    pub edges: usize,
    /// `<diagram>` pages stored compressed and left as they were
    pub compressed_pages: usize,
}

impl fmt::Display for FixSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} node(s) repositioned, {} waypoint list(s) cleared, {} of {} edge style(s) normalized",
            self.repositioned, self.waypoints_cleared, self.styles_normalized, self.edges
        )?;
        if !self.missing.is_empty() {
            write!(f, ", {} mapped node(s) missing", self.missing.len())?;
        }
        if self.compressed_pages > 0 {
            write!(f, ", {} compressed page(s) skipped", self.compressed_pages)?;
        }
        Ok(())
    }
}

/// Rewrite the diagram at `path` in place
///
/// The new document is written to a temporary file next to the original and
/// renamed over it, so a failure never leaves a half-written diagram.
pub fn fix_layout<P: AsRef<Path>>(
    path: P,
    map: &CoordinateMap,
    options: FixOptions,
) -> Result<FixSummary, LayoutError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| LayoutError::from_read(path, e))?;
    let xml = String::from_utf8(bytes).map_err(|e| LayoutError::Parse {
        path: path.to_path_buf(),
        detail: format!("not valid UTF-8: {}", e.utf8_error()),
    })?;

    let (output, summary) = rewrite(&xml, map).map_err(|detail| LayoutError::Parse {
        path: path.to_path_buf(),
        detail,
    })?;

    if options.strict && !summary.missing.is_empty() {
        return Err(LayoutError::MissingNodes(summary.missing));
    }

    if options.dry_run {
        tracing::info!(path = %path.display(), "dry run, diagram left unchanged");
    } else {
        write_atomically(path, output.as_bytes())?;
    }

    tracing::info!(path = %path.display(), "{}", summary);
    Ok(summary)
}

/// Rewrite a document held in memory
pub fn fix_layout_str(
    xml: &str,
    map: &CoordinateMap,
) -> Result<(String, FixSummary), LayoutError> {
    rewrite(xml, map).map_err(|detail| LayoutError::Parse {
        path: PathBuf::from(INLINE_SOURCE),
        detail,
    })
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), LayoutError> {
    let write_err = |source| LayoutError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(contents).map_err(write_err)?;
    let permissions = fs::metadata(path).map_err(write_err)?.permissions();
    fs::set_permissions(file.path(), permissions).map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Element being read, as far as the rewrite cares
#[derive(Debug)]
enum Frame {
    /// `object`/`UserObject`: carries the id of the `mxCell` inside it
    Wrapper { id: Option<String> },
    Cell { id: Option<String>, edge: bool },
    Geometry { edge: bool },
    Diagram { compressed: bool },
    Other,
}

struct Rewrite<'m> {
    map: &'m CoordinateMap,
    stack: Vec<Frame>,
    /// Names of the open elements, parallel to `stack`
    open_names: Vec<String>,
    root_seen: bool,
    moved: HashSet<String>,
    summary: FixSummary,
}

impl<'m> Rewrite<'m> {
    fn new(map: &'m CoordinateMap) -> Self {
        Self {
            map,
            stack: Vec::new(),
            open_names: Vec::new(),
            root_seen: false,
            moved: HashSet::new(),
            summary: FixSummary::default(),
        }
    }

    fn in_edge_geometry(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Geometry { edge: true }))
    }

    fn is_waypoint_list(&self, element: &BytesStart<'_>) -> bool {
        element.name().as_ref() == b"Array" && self.in_edge_geometry()
    }

    /// Apply edits to an opening tag and describe the element it opens
    fn open<'i>(&mut self, element: BytesStart<'i>) -> Result<(BytesStart<'i>, Frame), String> {
        match element.name().as_ref() {
            b"diagram" => Ok((element, Frame::Diagram { compressed: false })),
            b"object" | b"UserObject" => {
                let id = attribute(&element, b"id")?;
                Ok((element, Frame::Wrapper { id }))
            }
            b"mxCell" => self.open_cell(element),
            b"mxGeometry" => self.open_geometry(element),
            _ => Ok((element, Frame::Other)),
        }
    }

    fn open_cell<'i>(&mut self, element: BytesStart<'i>) -> Result<(BytesStart<'i>, Frame), String> {
        let id = match attribute(&element, b"id")? {
            Some(id) => Some(id),
            None => match self.stack.last() {
                Some(Frame::Wrapper { id }) => id.clone(),
                _ => None,
            },
        };
        let edge = attribute(&element, b"edge")?.as_deref() == Some("1");
        if !edge {
            return Ok((element, Frame::Cell { id, edge }));
        }

        self.summary.edges += 1;
        let style = attribute(&element, b"style")?.unwrap_or_default();
        let Some(style) = normalize_edge_style(&style) else {
            return Ok((element, Frame::Cell { id, edge }));
        };

        let element = replace_attributes(&element, &[("style", style)])?;
        self.summary.styles_normalized += 1;
        tracing::trace!(id = id.as_deref().unwrap_or(""), "edge style normalized");

        Ok((element, Frame::Cell { id, edge }))
    }

    fn open_geometry<'i>(
        &mut self,
        element: BytesStart<'i>,
    ) -> Result<(BytesStart<'i>, Frame), String> {
        let Some(Frame::Cell { id, edge }) = self.stack.last() else {
            return Ok((element, Frame::Other));
        };
        let edge = *edge;
        let Some(placement) = id.as_deref().and_then(|id| self.map.placement(id)) else {
            return Ok((element, Frame::Geometry { edge }));
        };

        let x = format_coordinate(placement.x);
        let y = format_coordinate(placement.y);
        let element = replace_attributes(&element, &[("x", x), ("y", y)])?;

        tracing::debug!(
            id = %placement.id,
            node = placement.label(),
            x = placement.x,
            y = placement.y,
            "node repositioned"
        );
        self.summary.repositioned += 1;
        self.moved.insert(placement.id.clone());

        Ok((element, Frame::Geometry { edge }))
    }

    /// Track element nesting so that only a single complete root is accepted
    fn enter(&mut self, element: &BytesStart<'_>) -> Result<(), String> {
        if self.stack.is_empty() {
            if self.root_seen {
                return Err(format!(
                    "unexpected <{}> after the root element",
                    element_name(element)
                ));
            }
            self.root_seen = true;
        }
        Ok(())
    }

    fn check_complete(&self) -> Result<(), String> {
        if let Some(name) = self.open_names.last() {
            return Err(format!("document ends inside <{}>", name));
        }
        if !self.root_seen {
            return Err("no root element".to_string());
        }
        Ok(())
    }

    /// Flag `<diagram>` pages whose content is encoded text
    fn note_text(&mut self, text: &[u8]) -> Result<(), String> {
        let blank = text.iter().all(u8::is_ascii_whitespace);
        if self.stack.is_empty() {
            if !blank {
                return Err("text outside the root element".to_string());
            }
            return Ok(());
        }
        if let Some(Frame::Diagram { compressed }) = self.stack.last_mut() {
            if !*compressed && !blank {
                *compressed = true;
                self.summary.compressed_pages += 1;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> FixSummary {
        self.summary.missing = self
            .map
            .iter()
            .filter(|p| !self.moved.contains(&p.id))
            .map(|p| p.id.clone())
            .collect();

        for id in &self.summary.missing {
            let node = self
                .map
                .placement(id)
                .map(|p| p.label())
                .unwrap_or(id.as_str());
            tracing::warn!(id = %id, node, "mapped node not found in diagram");
        }
        if self.summary.compressed_pages > 0 {
            tracing::warn!(
                pages = self.summary.compressed_pages,
                "compressed diagram pages cannot be edited; save the file uncompressed to fix them"
            );
        }

        self.summary
    }
}

fn rewrite(xml: &str, map: &CoordinateMap) -> Result<(String, FixSummary), String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut state = Rewrite::new(map);

    // Depth inside a dropped waypoint list
    let mut skip_depth = 0usize;
    // Whitespace inside an edge geometry, held until we know whether the next
    // element is dropped
    let mut pending: Option<Event<'_>> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => return Err("document ends inside a waypoint list".to_string()),
                _ => {}
            }
            continue;
        }

        if let Event::Text(text) = &event {
            if state.in_edge_geometry() && text.iter().all(u8::is_ascii_whitespace) {
                if let Some(held) = pending.replace(event) {
                    write(&mut writer, held)?;
                }
                continue;
            }
        }

        if let Event::Start(element) | Event::Empty(element) = &event {
            if state.is_waypoint_list(element) {
                pending = None;
                state.summary.waypoints_cleared += 1;
                if matches!(event, Event::Start(_)) {
                    skip_depth = 1;
                }
                continue;
            }
        }

        if let Some(held) = pending.take() {
            write(&mut writer, held)?;
        }

        match event {
            Event::Start(element) => {
                state.enter(&element)?;
                let name = element_name(&element);
                let (element, frame) = state.open(element)?;
                state.stack.push(frame);
                state.open_names.push(name);
                write(&mut writer, Event::Start(element))?;
            }
            Event::Empty(element) => {
                state.enter(&element)?;
                let (element, _) = state.open(element)?;
                write(&mut writer, Event::Empty(element))?;
            }
            Event::End(element) => {
                state.stack.pop();
                state.open_names.pop();
                write(&mut writer, Event::End(element))?;
            }
            Event::Text(text) => {
                state.note_text(&text)?;
                write(&mut writer, Event::Text(text))?;
            }
            Event::CData(data) => {
                if state.stack.is_empty() {
                    return Err("CDATA outside the root element".to_string());
                }
                write(&mut writer, Event::CData(data))?;
            }
            Event::Eof => {
                state.check_complete()?;
                break;
            }
            other => write(&mut writer, other)?,
        }
    }

    let output = String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())?;
    Ok((output, state.finish()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

/// Unescaped value of an attribute
fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Copy of `element` with the given attributes set to new (unescaped)
/// values; attributes not present yet are appended
fn replace_attributes(
    element: &BytesStart<'_>,
    updates: &[(&str, String)],
) -> Result<BytesStart<'static>, String> {
    let mut out = BytesStart::new(element_name(element));
    let mut applied = vec![false; updates.len()];

    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        match updates
            .iter()
            .position(|(key, _)| attr.key.as_ref() == key.as_bytes())
        {
            Some(i) => {
                out.push_attribute((updates[i].0, updates[i].1.as_str()));
                applied[i] = true;
            }
            None => out.push_attribute(double_quoted(attr)?),
        }
    }

    for ((key, value), done) in updates.iter().zip(applied) {
        if !done {
            out.push_attribute((*key, value.as_str()));
        }
    }

    Ok(out)
}

/// The attribute with its value safe to write between double quotes
///
/// A single-quoted value may hold a literal `"`; such values are re-escaped.
fn double_quoted(attr: Attribute<'_>) -> Result<Attribute<'_>, String> {
    if !attr.value.contains(&b'"') {
        return Ok(attr);
    }
    let escaped = {
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        escape(value.as_ref()).into_owned()
    };
    Ok(Attribute {
        key: attr.key,
        value: Cow::Owned(escaped.into_bytes()),
    })
}
