//! Enigmacrypt command line.
//!
//! ```text
//! enigmacrypt CONFIG [INPUT] [OUTPUT]
//! ```
//!
//! Reads the machine description from CONFIG, runs the message loop over
//! INPUT (standard input by default) and writes the converted messages to
//! OUTPUT (standard output by default). Exits with status 1 on any error.
//!
//! Logging goes to standard error. `RUST_LOG` is honoured unless
//! `--verbose` or `--debug` is given.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use enigmacrypt::{config, session};

/// Rotor-cipher simulator
#[derive(Parser, Debug)]
#[command(name = "enigmacrypt")]
#[command(version, about, long_about = None)]
struct Args {
    /// Machine description file
    config: PathBuf,

    /// Messages to convert (defaults to standard input)
    input: Option<PathBuf>,

    /// Destination for converted messages (defaults to standard output)
    output: Option<PathBuf>,

    /// Enable info logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) {
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let description = fs::read_to_string(&args.config)
        .with_context(|| format!("could not open {}", args.config.display()))?;
    let mut machine = config::read_machine(&description)
        .with_context(|| format!("bad machine description in {}", args.config.display()))?;
    if machine.catalog().is_empty() {
        warn!("{} describes no rotors", args.config.display());
    }
    info!(
        rotors = machine.catalog().len(),
        slots = machine.num_rotors(),
        "machine ready"
    );

    let input = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("could not open {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("could not read standard input")?;
            buf
        }
    };

    // Lines converted before a failing line are still written out.
    let mut converted = String::new();
    let result = session::process_into(&mut machine, &input, &mut converted);

    match &args.output {
        Some(path) => fs::write(path, &converted)
            .with_context(|| format!("could not write {}", path.display()))?,
        None => io::stdout()
            .write_all(converted.as_bytes())
            .context("could not write standard output")?,
    }
    result?;
    Ok(())
}
