use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::LogArgs;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Seed the generator with a fixed value instead of the current time
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Parser)]
#[command(name = "bitseq", about = "Pseudo-random binary sequence generator")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Number of bits to generate, saturated to the 32-bit signed range (prompts on stdin when omitted)
    #[arg(short = 'n', long = "bits", allow_negative_numbers = true)]
    pub bits: Option<i64>,

    /// Write the sequence to a file instead of stdout
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Configuration file path (default: /etc/bitseq.toml)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub seed: SeedArgs,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the frequency, runs and longest-run statistical tests on bit sequences
    Check(CheckArgs),
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Test a sequence stored as plain text
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,

    /// Test every sequence in a JSON object mapping labels to sequences
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Bits to generate and test when no file is given (default: 128)
    #[arg(short = 'n', long = "bits")]
    pub bits: Option<i64>,

    /// Significance level; a test passes when its p-value is at least this (default: 0.01)
    #[arg(short = 'a', long)]
    pub significance: Option<f64>,

    /// Configuration file path (default: /etc/bitseq.toml)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub seed: SeedArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_prompts() {
        let cli = Cli::try_parse_from(["bitseq"]).unwrap();
        assert!(cli.bits.is_none());
        assert!(cli.command.is_none());
        assert!(cli.seed.seed.is_none());
    }

    #[test]
    fn test_bits_and_seed() {
        let cli = Cli::try_parse_from(["bitseq", "-n", "-3", "--seed", "7"]).unwrap();
        assert_eq!(cli.bits, Some(-3));
        assert_eq!(cli.seed.seed, Some(7));
    }

    #[test]
    fn test_check_subcommand() {
        let cli = Cli::try_parse_from(["bitseq", "check", "--json", "seqs.json", "-a", "0.05"])
            .unwrap();
        match cli.command {
            Some(Command::Check(args)) => {
                assert_eq!(args.json, Some(PathBuf::from("seqs.json")));
                assert_eq!(args.significance, Some(0.05));
                assert!(args.file.is_none());
            }
            None => panic!("expected check subcommand"),
        }
    }

    #[test]
    fn test_check_file_conflicts_with_json() {
        let result = Cli::try_parse_from(["bitseq", "check", "--file", "a", "--json", "b"]);
        assert!(result.is_err());
    }
}
