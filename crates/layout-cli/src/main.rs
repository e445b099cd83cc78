//! layout-export - compile a saved facility layout into workbook tables
//!
//! Reads the editor's saved `{nodes, edges, workers}` document and writes
//! the five export tables as JSON, keyed by sheet name.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use layout_engine::{compile, EditorConfig, ExportOptions, PersistedState, Workbook};

/// Compile a saved layout into Stations, Flow, Workers, Mat_Inflow and
/// Mat_Outflow tables.
#[derive(Parser, Debug)]
#[command(name = "layout-export", author, version, long_about = None)]
struct Cli {
    /// Saved editor state (JSON)
    state: PathBuf,

    /// Editor configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the workbook here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Export canvas positions unscaled
    #[arg(long)]
    raw_coordinates: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let json = run(&cli)?;

    match &cli.out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write workbook to {}", path.display()))?;
            log::info!("Wrote workbook to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Compile the state named on the command line into workbook JSON
fn run(cli: &Cli) -> Result<String> {
    let options = export_options(cli.config.as_deref(), cli.raw_coordinates)?;

    ensure!(cli.state.is_file(), "State file {} does not exist", cli.state.display());
    let state = PersistedState::load(&cli.state);

    let workbook = compile(&state.nodes, &state.edges, &state.workers, &options);
    log_summary(&workbook);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&workbook)?
    } else {
        serde_json::to_string(&workbook)?
    };
    Ok(json)
}

fn export_options(config: Option<&Path>, raw_coordinates: bool) -> Result<ExportOptions> {
    let config = match config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if raw_coordinates {
        return Ok(ExportOptions::raw());
    }
    Ok(config.export)
}

fn log_summary(workbook: &Workbook) {
    for sheet in workbook.sheets() {
        log::debug!("{}: {} row(s)", sheet.name, sheet.rows.len());
    }
    log::info!("Compiled {} row(s)", workbook.row_count());
}
