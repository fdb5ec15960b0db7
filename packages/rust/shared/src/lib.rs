//! Shared types, error model, and configuration for opagen.
//!
//! This crate is the foundation depended on by all other opagen crates.
//! It provides:
//! - [`OpagenError`] — the unified error type
//! - Domain types ([`Agreement`], [`Member`], [`CapitalStructure`], [`RenderContext`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, config_dir, config_file_path, expand_tilde, init_config,
    load_config, load_config_from,
};
pub use error::{OpagenError, Result};
pub use types::{Agreement, CapitalCommitment, CapitalStructure, Member, RenderContext};
