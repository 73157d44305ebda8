use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use ledger_synth::{
    load_definitions_from_file, parse_date, validate, DefinitionsDocument, GenerationRange,
    LedgerGenerator, DEFAULT_CURRENCY,
};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Generate synthetic ledger entries from recurring transaction definitions.
#[derive(Debug, Parser)]
#[command(name = "generate", version, about)]
struct Cli {
    /// JSON file containing an array of entry definitions
    #[arg(required_unless_present = "print_schema")]
    input: Option<PathBuf>,

    /// First date to generate for (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(long, value_parser = parse_cli_date, default_value = "2008-01-01")]
    start: NaiveDate,

    /// Last date to generate for, inclusive
    #[arg(long, value_parser = parse_cli_date, default_value = "2011-07-07")]
    end: NaiveDate,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Currency symbol printed before amounts
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,

    /// Only load and lint the definitions; exit non-zero if anything looks misconfigured
    #[arg(long)]
    check: bool,

    /// Print the JSON Schema of the input document and exit
    #[arg(long)]
    print_schema: bool,
}

fn parse_cli_date(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.print_schema {
        println!("{}", DefinitionsDocument::schema_as_json()?);
        return Ok(());
    }

    let Some(input) = cli.input else {
        bail!("no input file given");
    };

    let range = GenerationRange::new(cli.start, cli.end)?;
    let mut entries = load_definitions_from_file(&input)
        .with_context(|| format!("failed to load definitions from {}", input.display()))?;

    if cli.check {
        let warnings = validate(&entries, range);
        for warning in &warnings {
            println!("{}", warning);
        }
        if !warnings.is_empty() {
            bail!("{} definition warning(s)", warnings.len());
        }
        println!("{} definitions OK", entries.len());
        return Ok(());
    }

    let warnings = validate(&entries, range);
    debug!("Definitions loaded with {} warning(s)", warnings.len());

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for entry in LedgerGenerator::new(&mut entries, range, &mut rng).with_currency(cli.currency) {
        writeln!(out, "{}", entry)?;
    }
    out.flush()?;

    Ok(())
}
