use anyhow::Result;
use clap::Parser;
use fctp_cli::cli::{Cli, Commands};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Solve {
            config,
            out,
            max_iterations,
            tolerance,
            penalty,
            verify,
            format,
        } => commands::solve::handle(
            config,
            out.as_deref(),
            commands::solve::Overrides {
                max_iterations: *max_iterations,
                tolerance: *tolerance,
                penalty: *penalty,
            },
            *verify,
            *format,
        ),
        Commands::Validate { config } => commands::validate::handle(config),
        Commands::Example { out, format } => commands::example::handle(out.as_deref(), *format),
    }
}
