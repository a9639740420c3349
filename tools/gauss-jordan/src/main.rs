use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gauss_jordan::{config::Config, run::run};
use inversion::{EliminationMode, InversionError, InversionMode};
use std::{io, num::NonZeroUsize, path::PathBuf, process::ExitCode};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Sequential,
    Distributed,
}

impl From<Mode> for InversionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Sequential => InversionMode::Sequential,
            Mode::Distributed => InversionMode::Distributed,
        }
    }
}

/// Invert a random square matrix using Gauss-Jordan elimination with partial pivoting.
#[derive(Parser, Debug)]
#[clap(name = "gauss-jordan")]
struct Options {
    /// The number of rows and columns of the matrix.
    size: Option<usize>,

    /// The inversion driver to use.
    #[clap(long, value_enum)]
    mode: Option<Mode>,

    /// The number of ranks used by the distributed driver.
    #[clap(long)]
    processes: Option<usize>,

    /// Eliminate rows in parallel using this many threads. Only used by the sequential driver.
    #[clap(long)]
    threads: Option<NonZeroUsize>,

    /// The seed used to generate the matrix.
    #[clap(long)]
    seed: Option<u64>,

    /// The path to a YAML config file.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print the matrix, its inverse and their product.
    #[clap(long)]
    print: bool,
}

impl Options {
    fn apply(self, config: &mut Config) {
        if let Some(size) = self.size {
            config.matrix.size = size;
        }
        if let Some(mode) = self.mode {
            config.inversion.mode = mode.into();
        }
        if let Some(processes) = self.processes {
            config.inversion.process_count = processes;
        }
        if let Some(threads) = self.threads {
            config.inversion.elimination = EliminationMode::Parallel;
            config.inversion.threads = Some(threads);
        }
        if self.seed.is_some() {
            config.matrix.seed = self.seed;
        }
        config.output.print_matrices |= self.print;
    }
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    tracing_subscriber::registry().with(EnvFilter::from_default_env()).with(fmt_layer).init();
}

fn try_main(options: Options) -> Result<()> {
    let mut config = Config::load(options.config.as_deref()).context("loading config")?;
    options.apply(&mut config);

    let report = run(&config)?;
    if config.output.print_matrices {
        println!("Matrix:\n{}", report.matrix);
        println!("Inverse:\n{}", report.inverse);
        println!("Product:\n{}", report.product);
    }
    println!("Seed: {}", report.seed);
    println!("Error: {:e}", report.residual);
    println!("Elapsed: {:.3}ms", report.elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let options = Options::parse();
    match try_main(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(InversionError::Singular { column }) = e.downcast_ref::<InversionError>() {
                error!("Matrix is not invertible, no usable pivot in column {column}");
            } else {
                error!("Inversion failed: {e:#}");
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn parse(arguments: &[&str]) -> Options {
        Options::try_parse_from(std::iter::once("gauss-jordan").chain(arguments.iter().copied())).unwrap()
    }

    fn loaded_config() -> Config {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "inversion:\n  process_count: 2\nmatrix:\n  size: 10\n  seed: 1").unwrap();
        let variables = [("GAUSS_JORDAN__INVERSION__PROCESS_COUNT", "3"), ("GAUSS_JORDAN__MATRIX__SEED", "5")]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let environment = Config::environment().source(Some(variables));
        Config::load_with_environment(Some(file.path()), environment).unwrap()
    }

    #[test]
    fn flags_win_over_file_and_environment() {
        let mut config = loaded_config();
        assert_eq!(config.inversion.process_count, 3);
        assert_eq!(config.matrix.seed, Some(5));

        parse(&["32", "--mode", "distributed", "--processes", "6", "--seed", "7", "--print"]).apply(&mut config);
        assert_eq!(config.matrix.size, 32);
        assert_eq!(config.matrix.seed, Some(7));
        assert_eq!(config.inversion.mode, InversionMode::Distributed);
        assert_eq!(config.inversion.process_count, 6);
        assert!(config.output.print_matrices);
    }

    #[test]
    fn missing_flags_keep_loaded_values() {
        let mut config = loaded_config();
        parse(&[]).apply(&mut config);
        assert_eq!(config, loaded_config());
    }

    #[test]
    fn threads_force_parallel_elimination() {
        let mut config = Config::default();
        assert_eq!(config.inversion.elimination, EliminationMode::Serial);

        parse(&["--threads", "4"]).apply(&mut config);
        assert_eq!(config.inversion.elimination, EliminationMode::Parallel);
        assert_eq!(config.inversion.threads, NonZeroUsize::new(4));
    }

    #[test]
    fn zero_threads_rejected() {
        assert!(Options::try_parse_from(["gauss-jordan", "--threads", "0"]).is_err());
    }
}
