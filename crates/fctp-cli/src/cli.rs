use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Benders decomposition for fixed-charge transportation problems", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve an instance with Benders decomposition
    Solve {
        /// Run configuration (YAML or JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        config: PathBuf,

        /// Write the full solution as JSON to this file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,

        /// Override the iteration budget from the configuration
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Override the relative gap tolerance from the configuration
        #[arg(long)]
        tolerance: Option<f64>,

        /// Override the unmet-demand penalty from the configuration
        #[arg(long)]
        penalty: Option<f64>,

        /// Cross-check the result against the extensive-form MILP
        #[arg(long)]
        verify: bool,

        /// Stdout format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Check a run configuration without solving
    Validate {
        /// Run configuration (YAML or JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        config: PathBuf,
    },
    /// Print the 4x3 reference configuration
    Example {
        /// Write to this file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExampleFormat::Yaml)]
        format: ExampleFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Iteration table plus summary
    Table,
    /// Solution as JSON
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExampleFormat {
    Yaml,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
