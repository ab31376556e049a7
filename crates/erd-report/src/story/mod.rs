//! Story: the ordered list of blocks the report is rendered from
//!
//! [`build_story`] walks a [`ReportCatalog`] and lays out the whole report
//! (title block, numbered narrative, one subsection per entity, relationship
//! and cardinality sections). The Typst template only knows how to draw each
//! kind of block; all ordering and numbering decisions are made here.

pub mod table;

use serde::{Deserialize, Serialize};

use crate::catalog::{EntityDescriptor, EntityKind, ReportCatalog, Section};
use crate::compiler::errors::ReportError;

pub use table::{column_widths, Table, TableStyle};

/// Header of every entity attribute table
pub const ATTRIBUTE_HEADER: [&str; 2] = ["Attribute", "Purpose"];

/// Header of the Chen cardinality table
pub const CARDINALITY_HEADER: [&str; 3] = [
    "Relation",
    "Cardinality (Left — Right)",
    "Why this makes sense",
];

/// Prefix of the heading that opens each entity subsection
pub const ENTITY_HEADING_PREFIX: &str = "Table: ";

/// Space between the title and the subtitle, in points
const TITLE_SPACING_PT: f64 = 8.0;

/// One renderable unit of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Title {
        text: String,
    },
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        lead: Option<String>,
        text: String,
    },
    /// One paragraph with a line break between entries
    Lines {
        lines: Vec<String>,
    },
    Bullets {
        items: Vec<String>,
    },
    Table(Table),
    Spacer {
        points: f64,
    },
    PageBreak,
}

impl Block {
    fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            lead: None,
            text: text.into(),
        }
    }
}

/// Ordered blocks plus the document metadata they belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub author: Vec<String>,
    pub blocks: Vec<Block>,
}

impl Story {
    /// Entity subsection headings, in order
    pub fn entity_headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { level: 2, text } => text.strip_prefix(ENTITY_HEADING_PREFIX),
                _ => None,
            })
            .collect()
    }

    /// Every table in the story, in order
    pub fn tables(&self) -> Vec<&Table> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .collect()
    }
}

/// Lay out the full report for a catalog
pub fn build_story(catalog: &ReportCatalog) -> Result<Story, ReportError> {
    let mut builder = StoryBuilder::default();

    builder.push(Block::Title {
        text: catalog.document.title.clone(),
    });
    builder.push(Block::Spacer {
        points: TITLE_SPACING_PT,
    });
    if !catalog.document.subtitle.is_empty() {
        builder.push(Block::paragraph(&catalog.document.subtitle));
    }

    for section in &catalog.sections {
        builder.narrative_section(section, catalog)?;
    }

    builder.push(Block::PageBreak);

    builder.open_section("Tables and Attributes");
    for entity in &catalog.entities {
        builder.entity(entity)?;
    }

    builder.push(Block::PageBreak);

    builder.open_section("Relationships (Cardinality)");
    builder.push(Block::Bullets {
        items: catalog
            .relationships
            .iter()
            .map(|r| r.as_str().to_string())
            .collect(),
    });

    builder.open_subsection("Participation (Total vs Partial)");
    builder.push(Block::Bullets {
        items: catalog.participation_rules.clone(),
    });

    builder.open_subsection("Chen Cardinality (Left/Right of Diamond)");
    if !catalog.chen_intro.is_empty() {
        builder.push(Block::paragraph(&catalog.chen_intro));
    }
    let rows = catalog
        .cardinality_rows
        .iter()
        .map(|row| {
            vec![
                row.relation.clone(),
                row.cardinality.clone(),
                row.rationale.clone(),
            ]
        })
        .collect();
    builder.push(Block::Table(Table::new(CARDINALITY_HEADER, rows)?));

    builder.open_section("Project Scope");
    builder.push(Block::paragraph(&catalog.scope));

    tracing::debug!(
        blocks = builder.blocks.len(),
        entities = catalog.entities.len(),
        "story laid out"
    );

    Ok(Story {
        title: catalog.document.title.clone(),
        author: catalog.document.author.clone(),
        blocks: builder.blocks,
    })
}

/// Accumulates blocks and keeps section numbering
#[derive(Default)]
struct StoryBuilder {
    blocks: Vec<Block>,
    section: usize,
    subsection: usize,
}

impl StoryBuilder {
    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn open_section(&mut self, heading: &str) {
        self.section += 1;
        self.subsection = 0;
        let text = format!("{}. {}", self.section, heading);
        self.push(Block::heading(1, text));
    }

    fn open_subsection(&mut self, heading: &str) {
        self.subsection += 1;
        let text = format!("{}.{} {}", self.section, self.subsection, heading);
        self.push(Block::heading(2, text));
    }

    fn section_body(&mut self, section: &Section) {
        if !section.lines.is_empty() {
            self.push(Block::Lines {
                lines: section.lines.clone(),
            });
        }
        if !section.bullets.is_empty() {
            self.push(Block::Bullets {
                items: section.bullets.clone(),
            });
        }
    }

    fn narrative_section(
        &mut self,
        section: &Section,
        catalog: &ReportCatalog,
    ) -> Result<(), ReportError> {
        self.open_section(&section.heading);
        self.section_body(section);

        for subsection in &section.subsections {
            if !subsection.subsections.is_empty() {
                return Err(ReportError::MalformedCatalog(format!(
                    "section '{}' nests deeper than one level",
                    section.heading
                )));
            }
            self.open_subsection(&subsection.heading);
            self.section_body(subsection);
        }

        if section.entity_classification {
            self.open_subsection("Strong vs Weak Entities");
            self.push(Block::Lines {
                lines: classification_lines(catalog),
            });
        }

        Ok(())
    }

    fn entity(&mut self, entity: &EntityDescriptor) -> Result<(), ReportError> {
        self.push(Block::heading(
            2,
            format!("{}{}", ENTITY_HEADING_PREFIX, entity.name),
        ));
        self.push(Block::paragraph(format!("Purpose: {}", entity.purpose)));
        self.push(Block::paragraph(format!(
            "Connected to: {}",
            entity.related_entities.join(", ")
        )));

        let rows = entity
            .attributes
            .iter()
            .map(|a| vec![a.name.clone(), a.description.clone()])
            .collect();
        self.push(Block::Table(Table::new(ATTRIBUTE_HEADER, rows)?));

        if !entity.extended_notes.is_empty() {
            self.push(Block::heading(2, "Detailed Explanation:"));
            for note in &entity.extended_notes {
                self.push(Block::Paragraph {
                    lead: note.lead.clone(),
                    text: note.text.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Generated text for the strong/weak classification subsection
fn classification_lines(catalog: &ReportCatalog) -> Vec<String> {
    let strong = catalog.entities_of_kind(EntityKind::Strong);
    let weak = catalog.entities_of_kind(EntityKind::Weak);
    let relationship = catalog.entities_of_kind(EntityKind::Relationship);

    let mut lines = vec![format!("Strong entities: {}.", strong.join(", "))];
    if !relationship.is_empty() {
        lines.push(format!("Relationship tables: {}.", relationship.join(", ")));
    }
    if weak.is_empty() {
        lines.push(
            "Weak entities: none. Every table has its own primary key, so no weak entity is required."
                .to_string(),
        );
    } else {
        lines.push(format!("Weak entities: {}.", weak.join(", ")));
    }
    lines
}
