//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use papercut_core::{BatchReport, ProgressReporter, SplitConfig, compose, query, split_batch};
use papercut_shared::{AppConfig, QueryPredicate, init_config, load_config, load_config_from};
use papercut_storage::IndexStore;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// papercut: split exam papers into searchable question files.
#[derive(Parser)]
#[command(
    name = "papercut",
    version,
    about = "Split exam papers into per-question PDFs, search them, and recompose the results.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.papercut/papercut.toml.
    #[arg(long, global = true, env = "PAPERCUT_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Split question papers into per-question PDFs and index them.
    Split {
        /// A paper, or a directory to search for papers.
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Treat `path` as a single paper even if it is a directory.
        #[arg(long)]
        no_crawl: bool,
    },

    /// Search the index and print matching question files.
    Query {
        /// Predicate as `column:search string:similarity` (repeatable, ANDed).
        #[arg(short, long = "predicate", required = true)]
        predicates: Vec<QueryPredicate>,

        /// Index file to search.
        #[arg(long)]
        index: Option<PathBuf>,

        /// Print results as a JSON array.
        #[arg(long)]
        json: bool,

        /// Also compose the matches into this PDF.
        #[arg(long)]
        merge: Option<PathBuf>,
    },

    /// Compose question files onto A4 sheets.
    Merge {
        /// Output PDF.
        #[arg(short, long)]
        out: PathBuf,

        /// Question files, in any order.
        files: Vec<PathBuf>,
    },

    /// Split, query, and merge in one go.
    Run {
        /// A paper, or a directory to search for papers.
        papers: PathBuf,

        /// Predicate as `column:search string:similarity` (repeatable, ANDed).
        #[arg(short, long = "predicate", required = true)]
        predicates: Vec<QueryPredicate>,

        /// Output PDF.
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Where question files and the index go.
#[derive(clap::Args)]
pub(crate) struct OutputArgs {
    /// Root directory for question files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// CSV index file.
    #[arg(long)]
    index: Option<PathBuf>,
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
        0 => "papercut=info",
        1 => "papercut=debug",
        _ => "papercut=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Split {
            path,
            output,
            no_crawl,
        } => {
            let split = split_config(&config, &output, no_crawl);
            cmd_split(&path, &split).map(|_| ())
        }
        Command::Query {
            predicates,
            index,
            json,
            merge,
        } => {
            let index = index.unwrap_or_else(|| config.defaults.index_file.clone());
            cmd_query(&config, &index, &predicates, json, merge.as_deref())
        }
        Command::Merge { out, files } => cmd_merge(&config, &files, &out),
        Command::Run {
            papers,
            predicates,
            out,
            output,
        } => {
            let split = split_config(&config, &output, false);
            cmd_split(&papers, &split)?;
            cmd_query(&config, &split.index_file, &predicates, false, Some(&out))
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Load the explicit config file if given, else the user config or defaults.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Apply CLI overrides on top of the loaded config.
fn split_config(config: &AppConfig, output: &OutputArgs, no_crawl: bool) -> SplitConfig {
    let mut split = SplitConfig::from(config);
    if let Some(dir) = &output.output_dir {
        split.output_dir = dir.clone();
    }
    if let Some(index) = &output.index {
        split.index_file = index.clone();
    }
    split.discovery.crawl = !no_crawl;
    split
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_split(path: &Path, config: &SplitConfig) -> Result<BatchReport> {
    info!(path = %path.display(), output_dir = %config.output_dir.display(), "splitting papers");

    let reporter = CliProgress::new();
    let report = split_batch(path, config, &reporter)?;

    println!();
    println!("  Papers found:    {}", report.discovered);
    println!("  Papers split:    {}", report.split.len());
    println!("  Papers rejected: {}", report.rejected.len());
    println!("  Question files:  {}", report.written.len());
    if !report.failed_writes.is_empty() {
        println!("  Failed writes:   {}", report.failed_writes.len());
    }
    if let Some(stats) = report.compaction {
        println!("  Index rows:      {} ({} duplicates removed)", stats.after, stats.removed());
    }
    println!("  Index:           {}", config.index_file.display());
    println!("  Time:            {:.1}s", report.elapsed.as_secs_f64());
    for (source, reason) in &report.rejected {
        println!("  ! {}: {reason}", source.display());
    }
    println!();

    Ok(report)
}

fn cmd_query(
    config: &AppConfig,
    index: &Path,
    predicates: &[QueryPredicate],
    json: bool,
    merge: Option<&Path>,
) -> Result<()> {
    let rows = IndexStore::open_readonly(index).load()?;
    let hits = query(&rows, predicates)?;
    info!(rows = rows.len(), hits = hits.len(), "query complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        for hit in &hits {
            println!("{hit}");
        }
    }

    if let Some(out) = merge {
        let files: Vec<PathBuf> = hits.iter().map(PathBuf::from).collect();
        cmd_merge(config, &files, out)?;
    }
    Ok(())
}

fn cmd_merge(config: &AppConfig, files: &[PathBuf], out: &Path) -> Result<()> {
    let report = compose(files, out, &config.compositing)?;
    println!(
        "Composed {} page(s) from {} file(s) onto {} sheet(s): {}",
        report.pages,
        report.sources,
        report.sheets,
        report.output.display()
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_started(&self, path: &Path, current: usize, total: usize) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.spinner
            .set_message(format!("Splitting [{current}/{total}] {name}"));
    }

    fn done(&self, report: &BatchReport) {
        self.spinner.finish_with_message(format!(
            "Split {} paper(s) into {} question file(s)",
            report.split.len(),
            report.written.len()
        ));
    }
}
