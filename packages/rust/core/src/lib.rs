//! Document assembly engine for operating agreements.
//!
//! Turns a read-only [`Agreement`](opagen_shared::Agreement) record into a
//! `.docx` artifact: formatting rules ([`format`]), the context builder
//! ([`context`]), the procedural section builder ([`sections`]), and the
//! generation dispatcher ([`generate`]) that selects between an installed
//! template and the scratch-build path.

pub mod context;
pub mod format;
pub mod generate;
pub mod sections;

pub use context::{MemberRow, build_context, member_rows};
pub use generate::{GenerationMethod, Generator, OutputArtifact};
