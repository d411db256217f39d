use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use cob_cart::io::fetch::{FetchConfig, FileFetcher, HttpFetcher, RetryPolicy};
use cob_cart::io::report_write;
use cob_cart::layout::{self, ColumnSchema, SheetLayout};
use cob_cart::model::{FilterSelection, Selection};
use cob_cart::pipeline::Dashboard;
use cob_cart::{CoverageError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Report(args) => execute_report(args),
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CoverageError::Logging(err.to_string()))
}

fn execute_report(args: ReportArgs) -> Result<()> {
    let sheet_layout = SheetLayout::default();
    let schema = ColumnSchema::default();

    let dashboard = match &args.input {
        Some(path) => Dashboard::load(
            &FileFetcher,
            &path.to_string_lossy(),
            &sheet_layout,
            &schema,
        )?,
        None => {
            let fetcher = HttpFetcher::new(args.fetch_config())?;
            Dashboard::load(&fetcher, &args.url, &sheet_layout, &schema)?
        }
    };

    let dataset = dashboard.dataset();
    let supervisors = match &args.supervisor {
        Some(chosen) => Selection::narrowed(chosen.iter().cloned(), &dataset.supervisor_options()),
        None => Selection::All,
    };
    let representatives = match &args.rep {
        Some(chosen) => Selection::narrowed(
            chosen.iter().cloned(),
            &dataset.representative_options(&supervisors),
        ),
        None => Selection::All,
    };
    let view = dashboard.view(&FilterSelection {
        supervisors,
        representatives,
    });

    if let Some(path) = &args.export {
        report_write::write_report(path, &view)?;
    }
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Portfolio coverage per sales representative."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the coverage workbook and print the filtered metrics as JSON.
    Report(ReportArgs),
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Workbook location.
    #[arg(long, default_value = layout::SOURCE_URL)]
    url: String,

    /// Read a local workbook instead of fetching `--url`.
    #[arg(long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Supervisors to keep. May be repeated; omit to keep all.
    #[arg(long, num_args = 0..)]
    supervisor: Option<Vec<String>>,

    /// Representative ids to keep. May be repeated; omit to keep all.
    #[arg(long, num_args = 0..)]
    rep: Option<Vec<String>>,

    /// Timeout for a single HTTP attempt, in seconds.
    #[arg(long, default_value_t = layout::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Extra attempts after a transient fetch failure.
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Also write the filtered table to this Excel file.
    #[arg(long)]
    export: Option<PathBuf>,
}

impl ReportArgs {
    fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy {
                max_attempts: self.retries.saturating_add(1),
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(8),
            },
        }
    }
}
