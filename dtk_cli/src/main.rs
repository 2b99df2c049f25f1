//! # dtk
//!
//! Builds theme stylesheets from design token documents and answers the
//! documentation queries.
//!
//! ```bash
//! dtk build                          # tokens.toml -> dist/
//! dtk resolve --variant dark/compact
//! dtk swatches --format json
//! dtk manifest icon-button
//! dtk examples Button
//! dtk info
//! ```

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use dtk_compiler::config::DEFAULT_CONFIG_FILE;
use dtk_compiler::{log_info, logging, pipeline, Variant};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dtk")]
#[command(version)]
#[command(about = "Design token compiler: resolved themes, stylesheets and docs data")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project configuration file
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output format for query results
    #[arg(long, short = 'f', global = true, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Print pipeline events to the console at debug level
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the stylesheet, derived constants and build report
    Build {
        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Print the resolved tokens of one variant
    Resolve {
        /// Theme and density, e.g. `dark/compact`
        #[arg(short, long, default_value = "light/default")]
        variant: Variant,

        /// Only tokens whose flattened name starts with this prefix
        #[arg(long)]
        filter: Option<String>,
    },

    /// List color swatches from the primitive layer
    Swatches,

    /// Show the manifest entry for a component slug
    Manifest {
        slug: String,

        /// Print the props table only
        #[arg(long)]
        props: bool,
    },

    /// List usage examples for a component
    Examples { component: String },

    /// Show pipeline capabilities and build configuration
    Info,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if cli.verbose {
        logging::config::init_runtime_preferences(logging::config::development())?;
    }
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    log::debug!("Using project configuration {}", cli.config.display());
    log_info!("dtk starting", "config" => cli.config.display());

    let result = match cli.command {
        Commands::Build { out_dir } => commands::build(&cli.config, out_dir),
        Commands::Resolve { variant, filter } => {
            commands::resolve(&cli.config, variant, filter.as_deref(), cli.format)
        }
        Commands::Swatches => commands::swatches(&cli.config, cli.format),
        Commands::Manifest { slug, props } => commands::manifest(&cli.config, &slug, props, cli.format),
        Commands::Examples { component } => commands::examples(&cli.config, &component, cli.format),
        Commands::Info => commands::info(cli.format),
    };

    if result.is_err() {
        logging::print_cargo_style_summary();
    } else {
        let summary = logging::get_processing_summary();
        if summary.has_warnings() {
            log::warn!(
                "{} warning(s) across {} source(s); rerun with --verbose for details",
                summary.total_warnings,
                summary.sources_with_warnings + summary.failed_sources
            );
        }
    }
    result
}
