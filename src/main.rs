//! Pulp Migrate Check - verify Pulp 2 to Pulp 3 migrations
//!
//! Runs migration plans against a live Pulp 3 and checks the result against
//! a Pulp 2 database export.

use clap::{Parser, Subcommand};
use pulp_migrate_check::api::RunOptions;
use pulp_migrate_check::harness::{MigrationHarness, Scenario};
use pulp_migrate_check::{config::Config, metrics};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Pulp Migrate Check - functional checks for the Pulp 2 to Pulp 3 migration service
#[derive(Parser, Debug)]
#[command(name = "pulp-migrate-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scenario, or all of them in order
    Run {
        /// Scenario to run (specific, mirror-all, different-importer)
        #[arg(short, long)]
        scenario: Option<Scenario>,

        /// Check the plan against the Pulp 2 export and ask the service to validate
        #[arg(long)]
        validate: bool,

        /// Ask the service to validate only; skip repository checks
        #[arg(long)]
        dry_run: bool,

        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },

    /// Print the migration plan a scenario submits
    Plan {
        #[arg(short, long)]
        scenario: Scenario,
    },

    /// Print Pulp 2 content counts per repository
    Fixtures,
}

/// `RUST_LOG` overrides `--log-level`
fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting Pulp Migrate Check v{}", pulp_migrate_check::VERSION);

    let config = Config::load(&args.config)?;
    info!("Loaded configuration from {:?}", args.config);

    let harness = MigrationHarness::from_config(&config)?;

    match args.command {
        Command::Run {
            scenario,
            validate,
            dry_run,
            metrics: print_metrics,
        } => {
            let options = RunOptions { validate, dry_run };
            let result = match scenario {
                Some(scenario) => harness.run_scenario(scenario, options).await.map(|r| vec![r]),
                None => harness.run_all(options).await,
            };

            if print_metrics {
                eprint!("{}", metrics::render());
            }

            let reports = result?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Command::Plan { scenario } => {
            let plan = harness.plan_for(scenario)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Fixtures => {
            println!("{}", serde_json::to_string_pretty(harness.fixtures())?);
        }
    }

    Ok(())
}
