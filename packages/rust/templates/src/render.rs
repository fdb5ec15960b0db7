//! Template substitution for `.docx` artifacts.
//!
//! [`TemplatingEngine`] is the injected capability the dispatcher renders
//! through; [`TeraDocxEngine`] is the Tera-backed implementation. A
//! template is an ordinary `.docx` whose `word/document.xml` carries Tera
//! placeholders (`{{ company_name }}`, `{% for m in members_table %}` ...).
//! Rendering substitutes the context into that part and repacks the
//! archive, copying every other part verbatim.

use std::io::{Cursor, Read, Write as _};

use quick_xml::escape::escape;
use serde_json::Value;
use tera::Tera;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use opagen_shared::{OpagenError, RenderContext, Result};

/// The archive part substitution applies to.
const DOCUMENT_PART: &str = "word/document.xml";

/// A templating technology behind an interface: bytes in, bytes out.
///
/// Implementations must be side-effect-free beyond producing the rendered
/// output. A placeholder with no corresponding context key is an error,
/// never a silent blank.
pub trait TemplatingEngine {
    /// Substitute `context` into `template`, returning the rendered bytes.
    fn render(&self, template: &[u8], context: &RenderContext) -> Result<Vec<u8>>;
}

/// Tera-backed engine for `.docx` templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraDocxEngine;

impl TeraDocxEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TemplatingEngine for TeraDocxEngine {
    fn render(&self, template: &[u8], context: &RenderContext) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(template.to_vec()))
            .map_err(|e| OpagenError::template(format!("template is not a valid archive: {e}")))?;

        let document = read_document_part(&mut archive)?;

        let tera_context = build_tera_context(context);
        let rendered = Tera::one_off(&document, &tera_context, false)
            .map_err(|e| OpagenError::template(error_chain(&e)))?;

        debug!(
            keys = context.len(),
            rendered_len = rendered.len(),
            "template part rendered"
        );

        repack(&mut archive, &rendered)
    }
}

fn read_document_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>) -> Result<String> {
    let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
        OpagenError::template(format!("template has no {DOCUMENT_PART} part: {e}"))
    })?;
    let mut content = String::new();
    part.read_to_string(&mut content)
        .map_err(|e| OpagenError::template(format!("template part unreadable: {e}")))?;
    Ok(content)
}

/// Rebuild the archive with the rendered document part, copying everything
/// else verbatim.
fn repack(archive: &mut ZipArchive<Cursor<Vec<u8>>>, rendered: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| OpagenError::template(format!("template entry unreadable: {e}")))?;

        if entry.name() == DOCUMENT_PART {
            zip.start_file(DOCUMENT_PART, options)
                .map_err(|e| OpagenError::template(format!("repack: {e}")))?;
            zip.write_all(rendered.as_bytes())
                .map_err(|e| OpagenError::template(format!("repack: {e}")))?;
        } else {
            zip.raw_copy_file(entry)
                .map_err(|e| OpagenError::template(format!("repack: {e}")))?;
        }
    }

    let cursor = zip
        .finish()
        .map_err(|e| OpagenError::template(format!("repack: {e}")))?;
    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Context preparation
// ---------------------------------------------------------------------------

/// Convert a [`RenderContext`] into a Tera context with every string value
/// XML-escaped for the WordprocessingML target. Keys carrying the emphasis
/// hint are substituted as bold 20 pt runs.
fn build_tera_context(context: &RenderContext) -> tera::Context {
    let mut tera_context = tera::Context::new();
    for (key, value) in context.values() {
        let prepared = if context.emphasized().iter().any(|k| k == key) {
            emphasized_value(value)
        } else {
            escape_value(value)
        };
        tera_context.insert(key.as_str(), &prepared);
    }
    tera_context
}

fn escape_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape(s).into_owned()),
        Value::Array(items) => Value::Array(items.iter().map(escape_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), escape_value(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn emphasized_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(format!(
            r#"<w:r><w:rPr><w:b/><w:sz w:val="40"/><w:szCs w:val="40"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(s)
        )),
        other => escape_value(other),
    }
}

/// Flatten a Tera error and its causes into one message. Tera reports
/// missing variables in the cause chain, not the top-level error.
fn error_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal template archive whose document part wraps `body`.
    fn template_with_body(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file("word/styles.xml", options).unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    fn context_with(entries: &[(&str, Value)]) -> RenderContext {
        let mut ctx = RenderContext::new();
        for (key, value) in entries {
            ctx.insert(*key, value.clone());
        }
        ctx
    }

    #[test]
    fn substitutes_placeholders() {
        let template = template_with_body("<w:t>{{ company_name }}</w:t>");
        let ctx = context_with(&[("company_name", Value::String("ACME LLC".into()))]);

        let rendered = TeraDocxEngine::new().render(&template, &ctx).unwrap();
        let xml = read_part(&rendered, DOCUMENT_PART);
        assert!(xml.contains("ACME LLC"));
        assert!(!xml.contains("{{"));
    }

    #[test]
    fn string_values_are_xml_escaped() {
        let template = template_with_body("<w:t>{{ company_name }}</w:t>");
        let ctx = context_with(&[("company_name", Value::String("SMITH & SONS <LLC>".into()))]);

        let rendered = TeraDocxEngine::new().render(&template, &ctx).unwrap();
        let xml = read_part(&rendered, DOCUMENT_PART);
        assert!(xml.contains("SMITH &amp; SONS &lt;LLC&gt;"));
    }

    #[test]
    fn iterates_members_table() {
        let template = template_with_body(
            "{% for m in members_table %}<w:t>{{ m.name }}: {{ m.commitment }}</w:t>{% endfor %}",
        );
        let rows = serde_json::json!([
            {"name": "Bob", "entity": "", "class": "A", "commitment": "£50,000", "percentage": "25.0%"}
        ]);
        let ctx = context_with(&[("members_table", rows)]);

        let rendered = TeraDocxEngine::new().render(&template, &ctx).unwrap();
        let xml = read_part(&rendered, DOCUMENT_PART);
        assert!(xml.contains("Bob: £50,000"));
    }

    #[test]
    fn undeclared_placeholder_is_an_error() {
        let template = template_with_body("<w:t>{{ undeclared_key }}</w:t>");
        let ctx = context_with(&[("company_name", Value::String("ACME LLC".into()))]);

        let err = TeraDocxEngine::new().render(&template, &ctx).unwrap_err();
        match err {
            OpagenError::TemplateRender { message } => {
                assert!(message.contains("undeclared_key"), "message: {message}");
            }
            other => panic!("expected TemplateRender, got {other:?}"),
        }
    }

    #[test]
    fn emphasized_key_renders_as_bold_run() {
        let template = template_with_body("{{ title }}");
        let mut ctx = context_with(&[("title", Value::String("Operating Agreement".into()))]);
        ctx.emphasize("title");

        let rendered = TeraDocxEngine::new().render(&template, &ctx).unwrap();
        let xml = read_part(&rendered, DOCUMENT_PART);
        assert!(xml.contains(r#"<w:sz w:val="40"/>"#));
        assert!(xml.contains("Operating Agreement"));
    }

    #[test]
    fn other_parts_are_preserved() {
        let template = template_with_body("<w:t>{{ company_name }}</w:t>");
        let ctx = context_with(&[("company_name", Value::String("ACME LLC".into()))]);

        let rendered = TeraDocxEngine::new().render(&template, &ctx).unwrap();
        assert_eq!(read_part(&rendered, "word/styles.xml"), "<w:styles/>");
        assert_eq!(read_part(&rendered, "[Content_Types].xml"), "<Types/>");
    }

    #[test]
    fn garbage_bytes_are_a_render_error() {
        let ctx = RenderContext::new();
        let err = TeraDocxEngine::new().render(b"not a zip", &ctx).unwrap_err();
        assert!(matches!(err, OpagenError::TemplateRender { .. }));
    }

    #[test]
    fn archive_without_document_part_is_a_render_error() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        zip.start_file("word/styles.xml", options).unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = TeraDocxEngine::new()
            .render(&bytes, &RenderContext::new())
            .unwrap_err();
        match err {
            OpagenError::TemplateRender { message } => {
                assert!(message.contains("word/document.xml"));
            }
            other => panic!("expected TemplateRender, got {other:?}"),
        }
    }
}
