//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::info;

use opagen_core::Generator;
use opagen_shared::{Agreement, expand_tilde, init_config, load_config};
use opagen_templates::TemplateStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// opagen — generate LLC operating agreements.
#[derive(Parser)]
#[command(
    name = "opagen",
    version,
    about = "Turn agreement records into formatted Operating Agreement documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a document from an agreement record.
    Generate {
        /// Path to the agreement record (JSON).
        agreement: PathBuf,

        /// Template name to render with (falls back to the scratch-build
        /// path when not installed).
        #[arg(short, long)]
        template: Option<String>,

        /// Output directory for the delivered document.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Template store directory (overrides config).
        #[arg(long)]
        templates_dir: Option<PathBuf>,
    },

    /// List installed templates.
    Templates {
        /// Template store directory (overrides config).
        #[arg(long)]
        templates_dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "opagen=info",
        1 => "opagen=debug",
        _ => "opagen=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            agreement,
            template,
            out,
            templates_dir,
        } => cmd_generate(
            &agreement,
            template.as_deref(),
            out.as_deref(),
            templates_dir.as_deref(),
        ),
        Command::Templates { templates_dir } => cmd_templates(templates_dir.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(
    agreement_path: &Path,
    template: Option<&str>,
    out: Option<&Path>,
    templates_dir: Option<&Path>,
) -> Result<()> {
    let config = load_config()?;

    let content = std::fs::read_to_string(agreement_path)
        .map_err(|e| eyre!("cannot read '{}': {e}", agreement_path.display()))?;
    let agreement: Agreement = serde_json::from_str(&content)
        .map_err(|e| eyre!("invalid agreement record '{}': {e}", agreement_path.display()))?;

    let store_root = templates_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| expand_tilde(&config.defaults.templates_dir));
    let template_name = template.unwrap_or(&config.defaults.template).to_string();
    let out_dir = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| expand_tilde(&config.defaults.output_dir));

    info!(
        agreement = %agreement_path.display(),
        company = %agreement.company_name,
        template = %template_name,
        "generating document"
    );

    let generator = Generator::with_tera(TemplateStore::new(store_root));
    let artifact = generator.generate(&agreement, &template_name)?;

    let id = artifact.id;
    let method = artifact.method;
    let size_bytes = artifact.size_bytes;
    let sha256 = artifact.sha256.clone();
    let dest = artifact.persist_to(&out_dir)?;

    // Print summary
    println!();
    println!("  Document generated successfully!");
    println!("  ID:       {id}");
    println!("  Company:  {}", agreement.company_name);
    println!("  Method:   {method}");
    println!("  Size:     {size_bytes} bytes");
    println!("  SHA-256:  {sha256}");
    println!("  Saved to: {}", dest.display());
    println!();

    Ok(())
}

fn cmd_templates(templates_dir: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let store_root = templates_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| expand_tilde(&config.defaults.templates_dir));

    let store = TemplateStore::new(&store_root);
    let templates = store.list()?;

    if templates.is_empty() {
        println!(
            "No templates installed in {}; documents will be built from scratch.",
            store_root.display()
        );
        return Ok(());
    }

    println!("Installed templates ({}):", store_root.display());
    for template in templates {
        println!("  {}  ({})", template.name, template.file_name);
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config file created at {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}
