//! Pulp Migrate Check Library
//!
//! Functional verification harness for the Pulp 2 to Pulp 3 migration service.
//!
//! # Features
//!
//! - **Typed Plans**: Build and validate migration-plan documents
//! - **REST Clients**: Tasks, file repositories and migration plans
//! - **Task Monitoring**: Block until an asynchronous task is terminal
//! - **Legacy Oracle**: Content counts read from a Pulp 2 database export
//! - **Scenarios**: Scoped, mirror-all and different-importer migrations
//!
//! # Example
//!
//! ```no_run
//! use pulp_migrate_check::{config::Config, harness::{MigrationHarness, Scenario}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let harness = MigrationHarness::from_config(&config)?;
//!     let report = harness.run_scenario(Scenario::MirrorAll, Default::default()).await?;
//!     println!("{} repositories verified", report.repositories.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod harness;
pub mod legacy;
pub mod metrics;
pub mod monitor;
pub mod plan;
pub mod plugins;

// Re-export commonly used types
pub use config::Config;
pub use harness::{MigrationHarness, Scenario};
pub use plan::MigrationPlan;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
