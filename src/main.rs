// FlowTrace - main.rs
//
// CLI entry point. Handles:
// 1. Argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Read -> parse -> filter -> render/export pipeline

use clap::{Parser, ValueEnum};
use flowtrace::app::{reader, render};
use flowtrace::core::{export, filter, parser, summary};
use flowtrace::util;
use flowtrace::util::error::FlowTraceError;
use std::path::{Path, PathBuf};

/// FlowTrace - structured viewer for workflow step logs.
///
/// Point FlowTrace at a flow_output-style log (or pipe one in) to see its
/// steps as structured, filterable blocks, or to export them as JSON/CSV.
#[derive(Parser, Debug)]
#[command(name = "flowtrace", version, about)]
struct Cli {
    /// Log file to read (stdin if omitted).
    path: Option<PathBuf>,

    /// Output format.
    #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
    output: OutputFormat,

    /// Show only error messages.
    #[arg(long = "errors-only")]
    errors_only: bool,

    /// Case-insensitive substring filter on item text.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Regex filter on item text.
    #[arg(short = 'e', long = "regex")]
    regex: Option<String>,

    /// Append a summary footer (text output only).
    #[arg(long = "summary")]
    summary: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() {
    let cli = Cli::parse();

    util::logging::init(cli.debug);

    tracing::debug!(
        version = util::constants::APP_VERSION,
        source = ?cli.path,
        "FlowTrace starting"
    );

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "FlowTrace failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), FlowTraceError> {
    let content = reader::read_log_text(cli.path.as_deref())?;

    let result = parser::parse_steps(&content);
    for incident in &result.incidents {
        tracing::warn!(incident = %incident, "Parse incident");
    }

    let filter_state = build_filter(cli)?;
    let steps = filter::apply_filters(&result.steps, &filter_state);

    // Exports that go to stdout are labelled as such in error context.
    let stdout_label = Path::new("<stdout>");
    let stdout = std::io::stdout();

    match cli.output {
        OutputFormat::Text => {
            let mut handle = stdout.lock();
            render::render_steps(&steps, &mut handle).map_err(io_to_export(stdout_label))?;
            if cli.summary {
                let summary = summary::summarise(&steps);
                render::render_summary(&summary, &mut handle)
                    .map_err(io_to_export(stdout_label))?;
            }
        }
        OutputFormat::Json => {
            export::export_json(&steps, stdout.lock(), stdout_label)?;
        }
        OutputFormat::Csv => {
            export::export_csv(&steps, stdout.lock(), stdout_label)?;
        }
    }

    Ok(())
}

fn build_filter(cli: &Cli) -> Result<filter::FilterState, FlowTraceError> {
    let mut state = if cli.errors_only {
        filter::FilterState::errors_only()
    } else {
        filter::FilterState::default()
    };

    if let Some(ref search) = cli.search {
        state.text_search = search.clone();
    }
    if let Some(ref pattern) = cli.regex {
        state.set_regex(pattern)?;
    }

    Ok(state)
}

fn io_to_export(
    path: &Path,
) -> impl Fn(std::io::Error) -> flowtrace::util::error::ExportError + '_ {
    move |source| flowtrace::util::error::ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}
