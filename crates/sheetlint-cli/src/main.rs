//! sheetlint CLI - spreadsheet formula linter

mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sheetlint::prelude::*;
use sheetlint::tokenize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetlint")]
#[command(author, version, about = "Static quality checks for spreadsheet formulas")]
struct Cli {
    /// Log lint progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a formula dump (.csv or .json) and report issues
    Check {
        /// Input file: CSV with `cell,formula[,sheet]` columns or workbook JSON
        input: PathBuf,

        /// Sheet name for CSV rows without a `sheet` column
        #[arg(short, long, default_value = "Sheet1")]
        sheet: String,

        /// TOML file with lint options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Report formulas whose complexity exceeds this score
        #[arg(long)]
        complexity_threshold: Option<f64>,

        /// Report ranges spanning more rows than this
        #[arg(long)]
        large_range_rows: Option<u32>,

        /// Circular reference search
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,

        /// Exit with status 1 if any error-severity issue is found
        #[arg(long)]
        fail_on_error: bool,
    },

    /// Print the analysis of one formula as JSON
    Analyze {
        #[arg(allow_hyphen_values = true)]
        formula: String,
    },

    /// Print the tokens of one formula
    Tokens {
        #[arg(allow_hyphen_values = true)]
        formula: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Per-cell path-copying search
    PathCopy,
    /// Strongly connected components
    Scc,
}

impl From<Strategy> for CycleSearch {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::PathCopy => CycleSearch::PathCopy,
            Strategy::Scc => CycleSearch::StronglyConnected,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            input,
            sheet,
            config,
            format,
            complexity_threshold,
            large_range_rows,
            strategy,
            fail_on_error,
        } => {
            let mut options = match config {
                Some(path) => LintOptions::load(&path)
                    .with_context(|| format!("Failed to load config '{}'", path.display()))?,
                None => LintOptions::default(),
            };
            if let Some(threshold) = complexity_threshold {
                options.complexity_threshold = threshold;
            }
            if let Some(rows) = large_range_rows {
                options.large_range_rows = rows;
            }
            if let Some(strategy) = strategy {
                options.cycle_strategy = strategy.into();
            }

            let report = check(&input, &sheet, options, format)?;
            if fail_on_error && report.has_errors() {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze { formula } => {
            analyze(&formula)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Tokens { formula } => {
            tokens(&formula)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn check(input: &Path, default_sheet: &str, options: LintOptions, format: Format) -> Result<LintReport> {
    let workbook = input::read_workbook(input, default_sheet)?;
    let report = Linter::new(options).lint_workbook(&workbook);

    let mut stdout = io::stdout().lock();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut stdout, &report)
                .context("Failed to serialize report")?;
            writeln!(stdout).context("Failed to write to stdout")?;
        }
        Format::Text => {
            for issue in &report.issues {
                writeln!(stdout, "{}", issue).context("Failed to write to stdout")?;
            }
            let meta = &report.metadata;
            writeln!(
                stdout,
                "{} formulas in {} sheets: {} errors, {} warnings, {} info",
                meta.formula_count,
                meta.sheet_count,
                report.count(Severity::Error),
                report.count(Severity::Warning),
                report.count(Severity::Info)
            )
            .context("Failed to write to stdout")?;
        }
    }

    Ok(report)
}

fn analyze(formula: &str) -> Result<()> {
    let analysis = analyze_formula(formula);
    let json = serde_json::to_string_pretty(&analysis).context("Failed to serialize analysis")?;
    println!("{}", json);
    Ok(())
}

fn tokens(formula: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for token in tokenize(formula) {
        writeln!(stdout, "{}", token).context("Failed to write to stdout")?;
    }
    Ok(())
}
