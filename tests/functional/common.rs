//! Common functional test infrastructure

use pulp_migrate_check::api::{ApiClient, ApiClientConfig};
use pulp_migrate_check::config::Config;
use pulp_migrate_check::harness::MigrationHarness;
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "PULP_MIGRATE_CHECK_CONFIG";

/// Load the configuration named by `PULP_MIGRATE_CHECK_CONFIG`
pub fn load_config() -> Option<Config> {
    let path = std::env::var(CONFIG_ENV).ok()?;
    match Config::load(&path) {
        Ok(config) => Some(config),
        Err(e) => panic!("Failed to load {}: {}", path, e),
    }
}

/// Check that the Pulp 3 status endpoint answers
pub async fn is_pulp_available(config: &Config) -> bool {
    let Ok(api) = ApiClient::new(ApiClientConfig::from(&config.pulp)) else {
        return false;
    };
    let client = reqwest::Client::new();
    match client
        .get(api.endpoint("status/"))
        .timeout(Duration::from_secs(2))
        .send()
        .await
    {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

/// Harness for the live environment, or `None` when it is not available
pub async fn live_harness() -> Option<MigrationHarness> {
    let Some(config) = load_config() else {
        eprintln!("Skipping test: {} not set", CONFIG_ENV);
        return None;
    };
    if !is_pulp_available(&config).await {
        eprintln!("Skipping test: Pulp 3 not available at {}", config.pulp.host);
        return None;
    }
    Some(MigrationHarness::from_config(&config).expect("Failed to create harness"))
}
