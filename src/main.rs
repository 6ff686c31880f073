use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analysis;
mod backend;
mod commands;
mod config;
mod db;
mod photo;

use backend::open_store;
use commands::{A1cCommand, ConfigCommand, DashboardCommand, HistoryCommand, MealCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "glucosnap")]
#[command(version)]
#[command(about = "Track HbA1c results and meal calories", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's calories and the latest HbA1c
    Dashboard(DashboardCommand),

    /// Record and list HbA1c results
    A1c(A1cCommand),

    /// Analyze, log and list meals
    Meal(MealCommand),

    /// Show or export the combined history
    History(HistoryCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "glucosnap=debug,glucosnap_core=debug"
    } else {
        "glucosnap=warn,glucosnap_core=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Dashboard(cmd)) => {
            let store = open_store(&config).await?;
            cmd.run(&store)?;
        }
        Some(Commands::A1c(cmd)) => {
            let mut store = open_store(&config).await?;
            cmd.run(&mut store).await?;
        }
        Some(Commands::Meal(cmd)) => {
            let mut store = open_store(&config).await?;
            cmd.run(&mut store, &config).await?;
        }
        Some(Commands::History(cmd)) => {
            let store = open_store(&config).await?;
            cmd.run(&store).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
