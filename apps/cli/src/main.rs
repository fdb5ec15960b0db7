//! opagen CLI — operating agreement document generator.
//!
//! Turns an agreement record (JSON) into a formatted `.docx` Operating
//! Agreement, rendered from an installed template or built from scratch.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
