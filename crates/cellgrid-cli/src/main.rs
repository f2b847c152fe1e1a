//! cellgrid CLI - build, evaluate and inspect grid sessions

use anyhow::{bail, Context, Result};
use cellgrid::prelude::*;
use cellgrid::{column_labels, from_label, to_label};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellgrid")]
#[command(author, version, about = "Spreadsheet grid evaluation tool")]
struct Cli {
    #[command(flatten)]
    grid: GridArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Grid options shared by every command
#[derive(Args)]
struct GridArgs {
    /// Number of rows in a new grid
    #[arg(long, default_value_t = GridConfig::default().rows, global = true)]
    rows: usize,

    /// Number of columns in a new grid
    #[arg(long, default_value_t = GridConfig::default().columns, global = true)]
    cols: usize,

    /// Default column width in pixels
    #[arg(long, default_value_t = GridConfig::default().default_column_width, global = true)]
    column_width: f64,

    /// Default row height in pixels
    #[arg(long, default_value_t = GridConfig::default().default_row_height, global = true)]
    row_height: f64,

    /// Load a saved session instead of starting from an empty grid
    #[arg(short, long, global = true)]
    session: Option<PathBuf>,
}

impl GridArgs {
    fn config(&self) -> GridConfig {
        GridConfig::new(self.rows, self.cols)
            .with_column_width(self.column_width)
            .with_row_height(self.row_height)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Enter values and formulas, then print every non-empty cell
    Eval {
        /// Cell assignment such as `A1=5` or `B1==A1+10` (repeatable)
        #[arg(long = "set", value_name = "LABEL=TEXT")]
        assignments: Vec<String>,

        /// Write the resulting session to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Print the used part of the grid as a table of results
    Show {
        /// Print raw values instead of results
        #[arg(long)]
        values: bool,
    },

    /// Convert between A1 labels and zero-based coordinates
    Label {
        /// An A1 label, or `ROW,COL` zero-based coordinates
        input: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval { assignments, save } => {
            eval(&cli.grid, &assignments, save.as_deref())
        }
        Commands::Show { values } => show(&cli.grid, values),
        Commands::Label { input } => label(&input),
    }
}

fn load_state(grid: &GridArgs) -> Result<SpreadsheetState> {
    let mut state = SpreadsheetState::new(grid.config()).context("Invalid grid options")?;

    if let Some(path) = &grid.session {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let snapshot = SessionSnapshot::from_json(&json)
            .with_context(|| format!("Failed to parse session '{}'", path.display()))?;
        state
            .restore(&snapshot)
            .with_context(|| format!("Failed to restore session '{}'", path.display()))?;
        info!(path = %path.display(), rows = state.rows(), columns = state.columns(), "loaded session");
    }

    Ok(state)
}

/// Split `LABEL=TEXT` at the first `=`
fn parse_assignment(assignment: &str) -> Result<(CellAddress, &str)> {
    let Some((label, text)) = assignment.split_once('=') else {
        bail!("Expected LABEL=TEXT, got '{}'", assignment);
    };
    let address = CellAddress::parse(label.trim())
        .with_context(|| format!("Invalid cell label in '{}'", assignment))?;
    Ok((address, text))
}

fn apply_assignments(state: &mut SpreadsheetState, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let (address, text) = parse_assignment(assignment)?;
        if !state.set_active_cell(address) {
            bail!(
                "Cell {} is outside the {}x{} grid",
                address,
                state.rows(),
                state.columns()
            );
        }
        state.set_active_text(text);
        let resolution = state.commit();
        debug!(%address, text, ?resolution, "applied assignment");
    }
    Ok(())
}

fn eval(grid: &GridArgs, assignments: &[String], save: Option<&Path>) -> Result<()> {
    let mut state = load_state(grid)?;
    apply_assignments(&mut state, assignments)?;

    for (address, cell) in state.store().cells() {
        if cell.is_empty() {
            continue;
        }
        println!("{}\t{}\t{}", address, cell.value, cell.result);
    }

    if let Some(path) = save {
        save_session(&state, path)?;
        eprintln!("Saved session to '{}'", path.display());
    }

    Ok(())
}

fn save_session(state: &SpreadsheetState, path: &Path) -> Result<()> {
    let json = state
        .snapshot()
        .to_json()
        .context("Failed to serialize session")?;
    fs::write(path, json).with_context(|| format!("Failed to write '{}'", path.display()))
}

fn show(grid: &GridArgs, values: bool) -> Result<()> {
    let state = load_state(grid)?;

    let used = state
        .store()
        .cells()
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(address, _)| address)
        .fold(None, |bounds: Option<(usize, usize)>, address| {
            let (rows, cols) = bounds.unwrap_or((0, 0));
            Some((rows.max(address.row + 1), cols.max(address.col + 1)))
        });

    let Some((rows, cols)) = used else {
        eprintln!("Grid is empty");
        return Ok(());
    };

    println!("\t{}", column_labels(cols).join("\t"));
    for row in 0..rows {
        let cells: Vec<String> = (0..cols)
            .map(|col| match state.cell(CellAddress::new(row, col)) {
                Some(cell) if values => cell.value.clone(),
                Some(cell) => cell.result.to_string(),
                None => String::new(),
            })
            .collect();
        println!("{}\t{}", row + 1, cells.join("\t"));
    }

    Ok(())
}

fn label(input: &str) -> Result<()> {
    if let Some((row, col)) = input.split_once(',') {
        let row: usize = row.trim().parse().context("Invalid row number")?;
        let col: usize = col.trim().parse().context("Invalid column number")?;
        println!("{}", to_label(row, col));
        return Ok(());
    }

    match from_label(input) {
        Some((row, col)) => {
            println!("{},{}", row, col);
            Ok(())
        }
        None => bail!("'{}' is not a cell label", input),
    }
}
