mod check;
mod cli;
mod config;
mod error;
mod generator;
mod input;
mod logging;
mod seed;
mod stats;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

use clap::Parser;

use cli::{Cli, Command};
use config::Config;
use error::Error;
use generator::BitGenerator;

const PROMPT: &str = "Enter number of bits for sequence: ";

/// Load the config file, falling back to defaults when it cannot be used.
fn build_config(config_file: Option<&Path>) -> Config {
    match config::load_config(config_file) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{}", e);
            Config::default()
        }
    }
}

/// Prompt on stdout and read the bit count from stdin.
fn prompt_bit_count() -> Result<i64, Error> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", PROMPT)?;
    stdout.flush()?;
    drop(stdout);

    let count = input::read_bit_count(&mut io::stdin().lock())?;
    if count.fallback {
        log::warn!("no integer in input, using {}", count.value);
    }
    Ok(count.value)
}

fn run_generate(cli: &Cli, config: &Config) -> Result<(), Error> {
    let n = match cli.bits {
        Some(n) => input::saturate_to_i32(n),
        None => prompt_bit_count()?,
    };

    let mut generator = match cli.seed.seed.or(config.generator.seed) {
        Some(s) => {
            log::info!("seeding from fixed value {}", s);
            BitGenerator::from_seed(s)
        }
        None => {
            let secs = seed::clock_seconds();
            log::info!("seeding from clock: {}s", secs);
            BitGenerator::from_clock_seconds(secs)
        }
    };

    let written = match cli.output_file.as_deref() {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            let written = generator.write_bits(n, &mut out)?;
            out.flush()?;
            written
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            let written = generator.write_bits(n, &mut out)?;
            match out.flush() {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                ret => ret?,
            }
            written
        }
    };

    log::info!("wrote {} bits", written);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Command::Check(args)) => {
            logging::init(&args.log);
            let config = build_config(args.config_file.as_deref());
            if let Err(e) = check::run(args, &config) {
                log::error!("{}", e);
                process::exit(1);
            }
        }
        None => {
            logging::init(&cli.log);
            let config = build_config(cli.config_file.as_deref());
            if let Err(e) = run_generate(&cli, &config) {
                log::error!("{}", e);
                process::exit(1);
            }
        }
    }
}
