use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::Error;
use crate::generator::BitGenerator;
use crate::seed;
use crate::stats::{self, SuiteResult};

/// A labelled sequence to be tested.
struct Sample {
    label: String,
    sequence: String,
}

fn read_text_file(path: &Path) -> Result<Vec<Sample>, Error> {
    let contents = fs::read_to_string(path)?;
    Ok(vec![Sample {
        label: path.display().to_string(),
        sequence: contents.trim().to_string(),
    }])
}

/// Reads a JSON object of `"label": "0101..."` entries.
fn read_json_file(path: &Path) -> Result<Vec<Sample>, Error> {
    let contents = fs::read_to_string(path)?;
    parse_json_samples(&contents)
        .map_err(|e| Error::InvalidArgs(format!("failed to parse {}: {}", path.display(), e)))
}

fn parse_json_samples(contents: &str) -> Result<Vec<Sample>, serde_json::Error> {
    let map: BTreeMap<String, String> = serde_json::from_str(contents)?;
    Ok(map
        .into_iter()
        .map(|(label, sequence)| Sample {
            label,
            sequence: sequence.trim().to_string(),
        })
        .collect())
}

fn generate_sample(bits: i64, fixed_seed: Option<u64>) -> Sample {
    let (mut generator, label) = match fixed_seed {
        Some(s) => (BitGenerator::from_seed(s), format!("generated (seed {})", s)),
        None => {
            let secs = seed::clock_seconds();
            (
                BitGenerator::from_clock_seconds(secs),
                format!("generated (clock {})", secs),
            )
        }
    };
    Sample {
        label,
        sequence: generator.collect(bits),
    }
}

fn write_report(
    out: &mut dyn Write,
    sample: &Sample,
    result: &SuiteResult,
    significance: f64,
) -> io::Result<()> {
    writeln!(out, "--- {} ---", sample.label)?;
    writeln!(
        out,
        "  Length: {} bits | Significance: {}",
        sample.sequence.len(),
        significance
    )?;
    for test in result.iter() {
        writeln!(
            out,
            "  {:<12} p={:.6}  {}  ({})",
            test.name,
            test.p_value,
            if test.passed { "PASS" } else { "FAIL" },
            test.detail
        )?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn run(args: &CheckArgs, config: &Config) -> Result<(), Error> {
    let mut check_cfg = config.check.clone();
    if let Some(v) = args.significance {
        check_cfg.significance = v;
    }
    if let Some(v) = args.bits {
        check_cfg.bits = v;
    }
    check_cfg.validate();

    let samples = if let Some(ref path) = args.file {
        read_text_file(path)?
    } else if let Some(ref path) = args.json {
        read_json_file(path)?
    } else {
        let fixed_seed = args.seed.seed.or(config.generator.seed);
        vec![generate_sample(check_cfg.bits, fixed_seed)]
    };

    if samples.is_empty() {
        return Err(Error::InvalidArgs("no sequences to test".into()));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;

    for sample in &samples {
        log::info!("testing {} ({} bits)", sample.label, sample.sequence.len());
        let result = stats::run_suite(&sample.sequence, check_cfg.significance).map_err(|e| {
            log::error!("cannot test {}", sample.label);
            e
        })?;
        if !result.all_passed() {
            failed += 1;
        }
        write_report(&mut out, sample, &result, check_cfg.significance)?;
    }

    writeln!(
        out,
        "Verdict: {} of {} sequences passed all tests",
        samples.len() - failed,
        samples.len()
    )?;
    out.flush()?;
    Ok(())
}
