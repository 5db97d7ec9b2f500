use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use posematch::{
    evaluate::{evaluate_files, EvalConfig, ParallelMode, DEFAULT_TIME_BUDGET},
    loader::{FileFormat, LoadOptions},
    report,
    search::Objective,
};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Predicted pose.
    query: PathBuf,

    /// Reference pose of the same ligand.
    template: PathBuf,

    /// Input format; guessed from the query's extension if omitted.
    #[arg(short = 't', long = "type")]
    format: Option<FileFormat>,

    /// Score to optimize the atom mapping for.
    #[arg(short, long, default_value = "rmsd")]
    score: Objective,

    /// Distinguish bond orders when matching atoms.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    bond_types: bool,

    /// Keep hydrogen atoms.
    #[arg(long)]
    hydrogens: bool,

    /// Time budget of the mapping search, in minutes (default: three days).
    #[arg(long)]
    max_minutes: Option<f64>,

    /// Search independent atom groups in parallel.
    #[arg(long, default_value = "none")]
    parallel: ParallelMode,

    /// Also write the atom mapping to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging.
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbosity: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    let stderr = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();
    tracing_subscriber::registry().with(level).with(stderr).init();
}

fn time_budget(minutes: Option<f64>) -> Result<Duration> {
    match minutes {
        None => Ok(DEFAULT_TIME_BUDGET),
        Some(m) if m.is_finite() && m > 0.0 => Ok(Duration::from_secs_f64(m * 60.0)),
        Some(m) => bail!("--max-minutes must be a positive number, got {m}"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let options = LoadOptions {
        hydrogens: cli.hydrogens,
        bond_types: cli.bond_types,
    };
    let config = EvalConfig {
        objective: cli.score,
        time_budget: time_budget(cli.max_minutes)?,
        parallel: cli.parallel,
    };

    let start = Instant::now();
    let eval = evaluate_files(&cli.query, &cli.template, cli.format, &options, &config)
        .with_context(|| {
            format!(
                "failed to evaluate {} against {}",
                cli.query.display(),
                cli.template.display()
            )
        })?;
    let elapsed = start.elapsed();

    let mut out = io::stdout().lock();
    report::write_summary(&mut out, &eval)?;
    writeln!(out)?;
    report::write_table(&mut out, &eval)?;
    writeln!(out)?;
    writeln!(out, "Took {:.3} seconds in total.", elapsed.as_secs_f64())?;

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("could not create {}", path.display()))?;
        report::write_csv(file, &eval)?;
    }

    Ok(())
}
