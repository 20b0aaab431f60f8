use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;
mod loader;
mod output;
mod progress;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("sgc error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    if let cli::Commands::Schema(args) = &cli.command {
        return commands::schema::handle(args, &flags);
    }

    let config = sg_config::SgConfig::load_with_dotenv()
        .context("failed to load saenggi configuration")?;

    match cli.command {
        cli::Commands::Check(args) => commands::check::handle(&args, &config, &flags).await,
        cli::Commands::Classify(args) => commands::classify::handle(&args, &config, &flags).await,
        cli::Commands::Rules(args) => commands::rules::handle(&args, &config, &flags),
        cli::Commands::Schema(_) => unreachable!("schema is handled before config loading"),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SAENGGI_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
