//! CLI entry point - the composition root.
//!
//! Infrastructure is wired together only in `bootstrap`; command dispatch
//! routes to handlers which delegate to `ReaderService`.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use folio_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads FOLIO_* defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.take() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Bootstrap the CLI context (composition root)
    let config = CliConfig::from_cli(&cli)?;
    let ctx = bootstrap(config).await?;

    match command {
        Commands::Read { book, page, speak } => {
            handlers::read::execute(&ctx, &book, page, speak).await?;
        }
        Commands::Speak(input) => {
            handlers::speak::execute(&ctx, input).await?;
        }
        Commands::Transform { text, json } => {
            handlers::transform::execute(&ctx, &text, json)?;
        }
        Commands::Estimate(input) => {
            handlers::estimate::execute(&ctx, input).await?;
        }
        Commands::Voices { all } => {
            handlers::voices::execute(&ctx, all).await?;
        }
        Commands::Books => {
            handlers::books::list(&ctx).await?;
        }
        Commands::Book { id } => {
            handlers::books::show(&ctx, &id).await?;
        }
        Commands::Config { command } => {
            handlers::config::execute(&ctx, command).await?;
        }
    }

    Ok(())
}
