//! Serialize a [`Document`] AST to `.docx` bytes.
//!
//! The output is a minimal OOXML package: content types, package
//! relationships, `word/document.xml`, and `word/styles.xml` generated from
//! the style registry. XML parts are emitted through `quick-xml` events and
//! packed with `zip`.

use std::io::{Cursor, Write as _};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use opagen_shared::{OpagenError, Result};

use crate::node::{Alignment, Block, Document, Paragraph, Run, Table};
use crate::style::{ParaStyle, TableStyle};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Serialize the document to a complete `.docx` package.
pub fn write_docx(doc: &Document) -> Result<Vec<u8>> {
    let document_xml = document_xml(doc)?;
    let styles_xml = styles_xml()?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("word/document.xml", &document_xml),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
        ("word/styles.xml", &styles_xml),
    ];

    for (name, content) in parts {
        zip.start_file(name, options).map_err(pkg_err)?;
        zip.write_all(content)
            .map_err(|e| OpagenError::document(format!("write {name}: {e}")))?;
    }

    let cursor = zip.finish().map_err(pkg_err)?;
    let bytes = cursor.into_inner();

    debug!(
        blocks = doc.blocks.len(),
        size = bytes.len(),
        "docx package written"
    );
    Ok(bytes)
}

fn pkg_err(e: impl std::fmt::Display) -> OpagenError {
    OpagenError::document(format!("docx packaging: {e}"))
}

// ---------------------------------------------------------------------------
// XML emission helpers
// ---------------------------------------------------------------------------

/// Thin wrapper over a `quick_xml` event writer targeting an in-memory
/// buffer.
struct Xml {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl Xml {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(pkg_err)?;
        Ok(Self { writer })
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut el = BytesStart::new(name);
        for (key, value) in attrs {
            el.push_attribute((*key, *value));
        }
        self.writer.write_event(Event::Start(el)).map_err(pkg_err)
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(pkg_err)
    }

    /// Self-closing element.
    fn leaf(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut el = BytesStart::new(name);
        for (key, value) in attrs {
            el.push_attribute((*key, *value));
        }
        self.writer.write_event(Event::Empty(el)).map_err(pkg_err)
    }

    /// Element containing escaped text.
    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.open(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(pkg_err)?;
        self.close(name)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

// ---------------------------------------------------------------------------
// word/document.xml
// ---------------------------------------------------------------------------

fn document_xml(doc: &Document) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.open("w:document", &[("xmlns:w", NS_MAIN)])?;
    x.open("w:body", &[])?;

    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => paragraph_xml(&mut x, p)?,
            Block::Table(t) => table_xml(&mut x, t)?,
            Block::PageBreak => page_break_xml(&mut x)?,
        }
    }

    // Letter page, one-inch margins.
    x.open("w:sectPr", &[])?;
    x.leaf("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
    x.leaf(
        "w:pgMar",
        &[
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
        ],
    )?;
    x.close("w:sectPr")?;

    x.close("w:body")?;
    x.close("w:document")?;
    Ok(x.finish())
}

fn paragraph_xml(x: &mut Xml, p: &Paragraph) -> Result<()> {
    x.open("w:p", &[])?;

    if p.style.is_some() || p.align == Alignment::Center {
        x.open("w:pPr", &[])?;
        if let Some(style) = p.style {
            x.leaf("w:pStyle", &[("w:val", style.spec().id)])?;
        }
        if p.align == Alignment::Center {
            x.leaf("w:jc", &[("w:val", "center")])?;
        }
        x.close("w:pPr")?;
    }

    for run in &p.runs {
        run_xml(x, run)?;
    }

    x.close("w:p")
}

fn run_xml(x: &mut Xml, run: &Run) -> Result<()> {
    x.open("w:r", &[])?;

    if run.bold || run.size_pt.is_some() {
        x.open("w:rPr", &[])?;
        if run.bold {
            x.leaf("w:b", &[])?;
        }
        if let Some(points) = run.size_pt {
            let half = (points * 2).to_string();
            x.leaf("w:sz", &[("w:val", half.as_str())])?;
            x.leaf("w:szCs", &[("w:val", half.as_str())])?;
        }
        x.close("w:rPr")?;
    }

    // Newlines are not significant inside w:t; emit explicit breaks.
    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            x.leaf("w:br", &[])?;
        }
        if !line.is_empty() {
            x.text_element("w:t", &[("xml:space", "preserve")], line)?;
        }
    }

    x.close("w:r")
}

fn page_break_xml(x: &mut Xml) -> Result<()> {
    x.open("w:p", &[])?;
    x.open("w:r", &[])?;
    x.leaf("w:br", &[("w:type", "page")])?;
    x.close("w:r")?;
    x.close("w:p")
}

fn table_xml(x: &mut Xml, table: &Table) -> Result<()> {
    x.open("w:tbl", &[])?;

    x.open("w:tblPr", &[])?;
    x.leaf("w:tblStyle", &[("w:val", table.style.spec().id)])?;
    x.leaf("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    table_borders_xml(x)?;
    x.close("w:tblPr")?;

    for row in &table.rows {
        x.open("w:tr", &[])?;
        for cell in &row.cells {
            x.open("w:tc", &[])?;
            x.open("w:tcPr", &[])?;
            x.leaf("w:tcW", &[("w:w", "0"), ("w:type", "auto")])?;
            x.close("w:tcPr")?;

            let mut run = Run::new(cell.text.clone());
            if cell.bold {
                run = run.bold();
            }
            x.open("w:p", &[])?;
            run_xml(x, &run)?;
            x.close("w:p")?;

            x.close("w:tc")?;
        }
        x.close("w:tr")?;
    }

    x.close("w:tbl")
}

fn table_borders_xml(x: &mut Xml) -> Result<()> {
    x.open("w:tblBorders", &[])?;
    for side in [
        "w:top",
        "w:left",
        "w:bottom",
        "w:right",
        "w:insideH",
        "w:insideV",
    ] {
        x.leaf(
            side,
            &[
                ("w:val", "single"),
                ("w:sz", "4"),
                ("w:space", "0"),
                ("w:color", "auto"),
            ],
        )?;
    }
    x.close("w:tblBorders")
}

// ---------------------------------------------------------------------------
// word/styles.xml
// ---------------------------------------------------------------------------

fn styles_xml() -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.open("w:styles", &[("xmlns:w", NS_MAIN)])?;

    x.open("w:docDefaults", &[])?;
    x.open("w:rPrDefault", &[])?;
    x.open("w:rPr", &[])?;
    x.leaf(
        "w:rFonts",
        &[("w:ascii", "Calibri"), ("w:hAnsi", "Calibri")],
    )?;
    x.leaf("w:sz", &[("w:val", "22")])?;
    x.close("w:rPr")?;
    x.close("w:rPrDefault")?;
    x.leaf("w:pPrDefault", &[])?;
    x.close("w:docDefaults")?;

    x.open(
        "w:style",
        &[
            ("w:type", "paragraph"),
            ("w:default", "1"),
            ("w:styleId", "Normal"),
        ],
    )?;
    x.leaf("w:name", &[("w:val", "Normal")])?;
    x.close("w:style")?;

    for style in ParaStyle::ALL {
        let spec = style.spec();
        x.open("w:style", &[("w:type", "paragraph"), ("w:styleId", spec.id)])?;
        x.leaf("w:name", &[("w:val", spec.name)])?;
        x.leaf("w:basedOn", &[("w:val", "Normal")])?;

        let needs_ppr = spec.outline_level.is_some() || spec.indent_twips.is_some();
        if needs_ppr {
            x.open("w:pPr", &[])?;
            if spec.outline_level.is_some() {
                x.leaf("w:spacing", &[("w:before", "240"), ("w:after", "120")])?;
            }
            if let Some(level) = spec.outline_level {
                let level = level.to_string();
                x.leaf("w:outlineLvl", &[("w:val", level.as_str())])?;
            }
            if let Some(indent) = spec.indent_twips {
                let indent = indent.to_string();
                x.leaf("w:ind", &[("w:left", indent.as_str())])?;
            }
            x.close("w:pPr")?;
        }

        if spec.bold || spec.size_half_points.is_some() {
            x.open("w:rPr", &[])?;
            if spec.bold {
                x.leaf("w:b", &[])?;
            }
            if let Some(half) = spec.size_half_points {
                let half = half.to_string();
                x.leaf("w:sz", &[("w:val", half.as_str())])?;
            }
            x.close("w:rPr")?;
        }

        x.close("w:style")?;
    }

    for style in TableStyle::ALL {
        let spec = style.spec();
        x.open("w:style", &[("w:type", "table"), ("w:styleId", spec.id)])?;
        x.leaf("w:name", &[("w:val", spec.name)])?;
        x.open("w:tblPr", &[])?;
        table_borders_xml(&mut x)?;
        x.close("w:tblPr")?;
        x.close("w:style")?;
    }

    x.close("w:styles")?;
    Ok(x.finish())
}
