mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use libcalltag_core::CallTagError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run_command(&cli) {
        output::output_error(&cli, &e);
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr so stdout stays parseable in `--json` mode
fn init_logging(cli: &Cli) {
    let level = if cli.quiet { "error" } else { cli.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_command(cli: &Cli) -> Result<(), CallTagError> {
    match &cli.command {
        Command::Generate { root, out, check } => {
            commands::generate::run(cli, root.as_deref(), out.as_deref(), *check)
        }
        Command::Scan { root } => commands::scan::run(cli, root.as_deref()),
        Command::Hash { keys } => commands::hash::run(cli, keys),
    }
}
