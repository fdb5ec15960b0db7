//! Immutable document AST.
//!
//! A [`Document`] is an ordered list of block nodes (paragraphs, tables,
//! page breaks) constructed up front and serialized to the output format
//! only at the end. Sections can therefore be built and tested in
//! isolation, with no shared mutable document object.

use crate::style::{ParaStyle, TableStyle};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A complete document: an ordered sequence of blocks.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Block nodes in render order.
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn push(&mut self, block: impl Into<Block>) {
        self.blocks.push(block.into());
    }

    /// Append every block from `blocks`.
    pub fn extend(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.extend(blocks);
    }

    /// All tables in the document, in order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// One block-level node.
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Forced page break.
    PageBreak,
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}

// ---------------------------------------------------------------------------
// Paragraph / Run
// ---------------------------------------------------------------------------

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// A paragraph: optional named style, alignment, and a list of runs.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub style: Option<ParaStyle>,
    pub align: Alignment,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// An empty spacer paragraph.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A plain paragraph with a single unstyled run.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text)],
            ..Self::default()
        }
    }

    /// A paragraph carrying a named style.
    pub fn styled(style: ParaStyle, text: impl Into<String>) -> Self {
        Self {
            style: Some(style),
            runs: vec![Run::new(text)],
            ..Self::default()
        }
    }

    /// Center this paragraph.
    pub fn centered(mut self) -> Self {
        self.align = Alignment::Center;
        self
    }

    /// Append a run.
    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A run of text with uniform character formatting. Newlines in `text`
/// become explicit line breaks when serialized.
#[derive(Debug, Clone)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    /// Font size in points; `None` inherits the document default.
    pub size_pt: Option<u32>,
}

impl Run {
    /// A plain run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            size_pt: None,
        }
    }

    /// Make the run bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set the font size in points.
    pub fn size(mut self, points: u32) -> Self {
        self.size_pt = Some(points);
        self
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A table: named style plus rows of text cells.
#[derive(Debug, Clone)]
pub struct Table {
    pub style: TableStyle,
    pub rows: Vec<Row>,
}

impl Table {
    /// An empty table with the given style.
    pub fn new(style: TableStyle) -> Self {
        Self {
            style,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}

/// One table row.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    /// A header row: every cell bold.
    pub fn header<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: cells
                .into_iter()
                .map(|text| Cell {
                    text: text.into(),
                    bold: true,
                })
                .collect(),
        }
    }

    /// A body row of plain cells.
    pub fn body<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: cells
                .into_iter()
                .map(|text| Cell {
                    text: text.into(),
                    bold: false,
                })
                .collect(),
        }
    }
}

/// One table cell.
#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    pub bold: bool,
}
