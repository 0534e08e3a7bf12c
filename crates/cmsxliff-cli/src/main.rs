use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::{debug, error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[macro_use]
mod ui;
mod commands;

#[derive(Parser)]
#[command(name = "cmsxliff", version, about = "XLIFF 1.2 export/import for CMS content trees")]
struct Cli {
    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a subject's translatable content as an XLIFF 1.2 file
    Export {
        /// Content tree file (JSON)
        #[arg(long)]
        tree: PathBuf,
        /// Subject reference, e.g. page:1 or article:7
        #[arg(long)]
        subject: String,
        #[arg(long)]
        source_lang: String,
        #[arg(long)]
        target_lang: String,
        /// Output file; defaults to a name derived from the subject path
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate, preview and apply a translated XLIFF file
    Import {
        /// Content tree file (JSON); updated in place after a confirmed apply
        #[arg(long)]
        tree: PathBuf,
        /// The XLIFF file to import
        #[arg(long)]
        file: PathBuf,
        /// Subject being edited; defaults to the one named in the file
        #[arg(long)]
        subject: Option<String>,
        /// Language being edited; defaults to the file's target language
        #[arg(long)]
        language: Option<String>,
        /// Apply without the interactive confirmation
        #[arg(long, default_value_t = false)]
        yes: bool,
        /// Stop after the preview, never write
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// List the units that an export of the subject would contain
    Units {
        #[arg(long)]
        tree: PathBuf,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        language: String,
        /// Print JSON instead of the grouped listing
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Dump JSON schemas for the report types
    Schema {
        #[arg(long, default_value = "")]
        out_dir: PathBuf,
    },
}

trait Runnable {
    fn run(self, use_color: bool) -> Result<()>;
}

impl Runnable for Commands {
    fn run(self, use_color: bool) -> Result<()> {
        let cmd_name = match &self {
            Commands::Export { .. } => "export",
            Commands::Import { .. } => "import",
            Commands::Units { .. } => "units",
            Commands::Schema { .. } => "schema",
        };
        debug!("starting command: {}", cmd_name);

        let result = match self {
            Commands::Export { tree, subject, source_lang, target_lang, out } => {
                commands::export::run_export(tree, subject, source_lang, target_lang, out)
            }
            Commands::Import { tree, file, subject, language, yes, dry_run } => {
                commands::import::run_import(tree, file, subject, language, yes, dry_run, use_color)
            }
            Commands::Units { tree, subject, language, json } => {
                commands::units::run_units(tree, subject, language, json, use_color)
            }
            Commands::Schema { out_dir } => commands::schema::run_schema(out_dir),
        };

        match &result {
            Ok(_) => info!("finished command: {}", cmd_name),
            Err(e) => error!("command {} failed: {:?}", cmd_name, e),
        }

        result
    }
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily("logs", "cmsxliff.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry().with(console_layer).with(file_layer).init();
    guard
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = init_tracing();

    let cli = Cli::parse();

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    cli.cmd.run(use_color)
}
