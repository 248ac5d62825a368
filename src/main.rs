use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lichess_challenger::config::{Config, LoggingConfig};
use lichess_challenger::error::{ChallengerErrorTrait, Error, ErrorCategory};
use lichess_challenger::roster::Roster;
use lichess_challenger::scheduler::ChallengeScheduler;
use lichess_challenger::utils::shutdown_channel;

#[derive(Parser)]
#[command(
    name = "lichess-challenger",
    version,
    about = "Keeps challenging Lichess bots from configured pools and time controls",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "CHALLENGER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the challenge loop until interrupted (default)
    Run,

    /// Print the assembled roster and exit
    Roster {
        /// Seed for randomized ordering, for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match try_main(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (category, code) = match err.downcast_ref::<Error>() {
                Some(e) => (e.category(), e.exit_code()),
                None => (ErrorCategory::Other, 1),
            };
            tracing::error!(category = %category, error = %format!("{err:#}"), "Fatal error");
            eprintln!("Error: {err:#}");
            ExitCode::from(code)
        }
    }
}

async fn try_main(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    setup_tracing(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Roster { seed } => print_roster(&config, seed),
    }
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("lichess_challenger=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new(format!(
                "lichess_challenger={},warn",
                logging.level
            ))
        }
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    let initialised = match logging.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    initialised.context("Failed to initialise logging")
}

fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

async fn run(config: Config) -> Result<()> {
    let mut scheduler = ChallengeScheduler::from_config(&config, &mut rng_for(None))
        .context("Failed to start the challenge loop")?;

    tracing::info!(
        username = %scheduler.username(),
        base_url = %config.lichess.base_url,
        "lichess-challenger starting"
    );

    let (handle, signal) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Interrupt received, shutting down"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt, shutting down"),
        }
        handle.shutdown();
    });

    let challenges = scheduler.run(signal).await;

    tracing::info!(challenges = challenges, "lichess-challenger stopped");
    Ok(())
}

fn print_roster(config: &Config, seed: Option<u64>) -> Result<()> {
    let roster =
        Roster::from_config(config, &mut rng_for(seed)).context("Failed to assemble roster")?;

    println!("Bots ({}):", roster.bots().len());
    for (index, bot) in roster.bots().iter().enumerate() {
        println!("  #{index:<4} {bot}");
    }

    println!("Time controls ({}):", roster.time_controls().len());
    for (index, tc) in roster.time_controls().iter().enumerate() {
        println!(
            "  #{index:<4} {tc} color={:?} variant={} rated={}",
            tc.color, tc.variant, tc.rated
        );
    }

    Ok(())
}
