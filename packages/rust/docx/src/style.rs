//! Enumerated style tokens and their WordprocessingML definitions.
//!
//! Style references are enum tokens resolved through this registry, so an
//! invalid style name is a compile-time error rather than a runtime lookup
//! against a string table. The registry is also the single source for the
//! generated `word/styles.xml` part.

/// Paragraph style tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParaStyle {
    Heading1,
    Heading2,
    ListNumber,
    ListBullet,
}

/// Resolved definition of a paragraph style.
#[derive(Debug, Clone, Copy)]
pub struct ParaSpec {
    /// The `w:styleId` written into the document part.
    pub id: &'static str,
    /// The `w:name` shown in word processors.
    pub name: &'static str,
    pub bold: bool,
    /// Font size in half-points, if the style overrides the default.
    pub size_half_points: Option<u32>,
    /// Outline level for headings.
    pub outline_level: Option<u32>,
    /// Left indent in twips for list styles.
    pub indent_twips: Option<u32>,
}

impl ParaStyle {
    /// All paragraph styles, in `styles.xml` emission order.
    pub const ALL: [ParaStyle; 4] = [
        ParaStyle::Heading1,
        ParaStyle::Heading2,
        ParaStyle::ListNumber,
        ParaStyle::ListBullet,
    ];

    /// Resolve this token to its definition.
    pub fn spec(self) -> ParaSpec {
        match self {
            ParaStyle::Heading1 => ParaSpec {
                id: "Heading1",
                name: "heading 1",
                bold: true,
                size_half_points: Some(28),
                outline_level: Some(0),
                indent_twips: None,
            },
            ParaStyle::Heading2 => ParaSpec {
                id: "Heading2",
                name: "heading 2",
                bold: true,
                size_half_points: Some(24),
                outline_level: Some(1),
                indent_twips: None,
            },
            ParaStyle::ListNumber => ParaSpec {
                id: "ListNumber",
                name: "List Number",
                bold: false,
                size_half_points: None,
                outline_level: None,
                indent_twips: Some(720),
            },
            ParaStyle::ListBullet => ParaSpec {
                id: "ListBullet",
                name: "List Bullet",
                bold: false,
                size_half_points: None,
                outline_level: None,
                indent_twips: Some(720),
            },
        }
    }
}

/// Table style tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableStyle {
    /// Banded listing table used for capitalization tables.
    LightList,
    /// Fully gridded table used for the signature page.
    TableGrid,
}

/// Resolved definition of a table style.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub id: &'static str,
    pub name: &'static str,
}

impl TableStyle {
    /// All table styles, in `styles.xml` emission order.
    pub const ALL: [TableStyle; 2] = [TableStyle::LightList, TableStyle::TableGrid];

    /// Resolve this token to its definition.
    pub fn spec(self) -> TableSpec {
        match self {
            TableStyle::LightList => TableSpec {
                id: "LightList",
                name: "Light List",
            },
            TableStyle::TableGrid => TableSpec {
                id: "TableGrid",
                name: "Table Grid",
            },
        }
    }
}
