use std::{env, path::Path};

use log::LevelFilter;
use tourdiff_derive::{CliOptions, CliValue, KvDisplay};

use crate::{Error, Result, search::hill_climb::ClimbConfig};

/// Runtime options for the `tourdiff` search run.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct SolverOptions {
    /// TSPLIB problem file. Empty or `-` means stdin.
    #[cli(long = "input")]
    pub input: String,
    /// Perturbation rounds of the hill climb.
    #[cli(long = "iterations")]
    pub iterations: usize,
    /// Seed for the double-bridge kicks.
    #[cli(long = "seed")]
    pub seed: u64,
    /// Apply the best beneficial k-move when a perturbed tour is rejected.
    #[cli(long = "harvest", flag)]
    pub harvest: bool,
    /// Smallest 2-opt improvement that counts as progress.
    #[cli(long = "epsilon")]
    pub epsilon: f64,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(long = "log-timestamp", flag)]
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    #[cli(long = "log-output")]
    pub log_output: String,
    /// Optional output file path for the final tour. Empty means stdout.
    #[cli(long = "output")]
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            input: String::new(),
            iterations: 100,
            seed: 42,
            harvest: true,
            epsilon: 1e-9,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::invalid_input(format!(
                "--epsilon must be a finite, non-negative number; got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  tourdiff [options] --input problem.tsp\n",
            "  tourdiff [options] < problem.tsp\n\n",
            "Options:\n",
            "  --input <path>\n",
            "  --iterations <usize>\n",
            "  --seed <u64>\n",
            "  --harvest[=<bool>]\n",
            "  --no-harvest\n",
            "  --epsilon <f64>\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  tourdiff --input berlin52.tsp --iterations 500 --output tour.txt\n",
            "  tourdiff --seed=7 --no-harvest --log-level=info < berlin52.tsp\n",
            "  tourdiff --log-level=trace --log-format=pretty --log-output run.log --input a280.tsp\n",
        )
    }

    pub fn climb_config(&self) -> ClimbConfig {
        ClimbConfig {
            iterations: self.iterations,
            seed: self.seed,
            harvest: self.harvest,
            epsilon: self.epsilon,
        }
    }

    pub fn input_path(&self) -> Option<&Path> {
        non_stdio_path(&self.input)
    }

    pub fn output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.output)
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.log_output)
    }
}

fn non_stdio_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}
