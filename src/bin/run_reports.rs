use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use ledger_synth::{build_report, parse_date, write_report, SqliteReportSource};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Write the monthly balance sheet, income statement, burn rate and net worth page.
#[derive(Debug, Parser)]
#[command(name = "run_reports", version, about)]
struct Cli {
    /// Month to report on (any day in it; YYYY-MM-DD or YYYY/MM/DD). Defaults to the current month
    #[arg(long, value_parser = parse_cli_date)]
    month: Option<NaiveDate>,

    /// Directory the page is written to
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// SQLite database holding the aggregated_accounts_by_month table
    #[arg(long)]
    db: PathBuf,

    /// Open the written page in the default browser
    #[arg(long)]
    open: bool,
}

fn parse_cli_date(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn report_month(requested: Option<NaiveDate>) -> Result<NaiveDate> {
    let day = requested.unwrap_or_else(|| Local::now().date_naive());
    day.with_day(1)
        .with_context(|| format!("no first day of month for {}", day))
}

fn open_in_browser(path: &Path) -> Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    Command::new(opener)
        .arg(path)
        .status()
        .with_context(|| format!("failed to run {} on {}", opener, path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let month = report_month(cli.month)?;

    let mut source = SqliteReportSource::open(&cli.db)
        .with_context(|| format!("failed to open database {}", cli.db.display()))?;
    let page = build_report(&mut source, month)
        .with_context(|| format!("report queries failed for {}", month))?;
    let path = write_report(&cli.path, &page)
        .with_context(|| format!("failed to write report into {}", cli.path.display()))?;

    println!("{}", path.display());

    if cli.open {
        open_in_browser(&path)?;
    }

    Ok(())
}
