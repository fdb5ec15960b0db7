//! Document AST and `.docx` serialization.
//!
//! Documents are constructed as an immutable AST ([`Document`], [`Block`],
//! [`Paragraph`], [`Table`]) with style references resolved through an
//! enumerated registry ([`ParaStyle`], [`TableStyle`]), then serialized to
//! OOXML bytes with [`write_docx`].

mod node;
mod style;
mod write;

pub use node::{Alignment, Block, Cell, Document, Paragraph, Row, Run, Table};
pub use style::{ParaSpec, ParaStyle, TableSpec, TableStyle};
pub use write::write_docx;
