//! Migration scenarios
//!
//! Each scenario pairs a plan with the legacy repositories expected to exist
//! in Pulp 3 once it has run. Scenarios are cumulative: the service database
//! is not reset between them, so they run in declaration order.

use super::HarnessError;
use crate::legacy::FixtureCounts;
use crate::plan::{MigrationPlan, PluginPlan, RepositoryPlan, RepositoryVersionPlan};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// A plan naming specific repositories migrates only those
    SpecificRepositories,
    /// A plan without repositories mirrors every legacy repository
    MirrorAll,
    /// A repository may take its importer from another legacy repository
    DifferentImporter,
}

impl Scenario {
    /// Every scenario, in run order
    pub const ALL: [Scenario; 3] = [
        Scenario::SpecificRepositories,
        Scenario::MirrorAll,
        Scenario::DifferentImporter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::SpecificRepositories => "specific",
            Scenario::MirrorAll => "mirror-all",
            Scenario::DifferentImporter => "different-importer",
        }
    }

    /// Build the plan and the expected repository ids
    pub fn prepare(
        &self,
        plugin_type: &str,
        fixtures: &FixtureCounts,
    ) -> Result<(MigrationPlan, Vec<String>), HarnessError> {
        let all = fixtures.repo_ids();

        match self {
            Scenario::SpecificRepositories => {
                let (first, second) = first_two(&all)?;
                let plan = MigrationPlan::new(vec![PluginPlan::new(plugin_type)
                    .with_repository(RepositoryPlan::identity(first))
                    .with_repository(RepositoryPlan::identity(second))]);
                Ok((plan, vec![first.to_string(), second.to_string()]))
            }
            Scenario::MirrorAll => Ok((MigrationPlan::mirror_all(plugin_type), all)),
            Scenario::DifferentImporter => {
                let (first, second) = first_two(&all)?;
                let borrowed_importer = RepositoryPlan::new(first).importer(second).version(
                    RepositoryVersionPlan::new(first).distributors([first]),
                );
                let plan = MigrationPlan::new(vec![PluginPlan::new(plugin_type)
                    .with_repository(borrowed_importer)
                    .with_repository(RepositoryPlan::identity(second))]);
                Ok((plan, all))
            }
        }
    }
}

fn first_two(repo_ids: &[String]) -> Result<(&str, &str), HarnessError> {
    match repo_ids {
        [first, second, ..] => Ok((first.as_str(), second.as_str())),
        _ => Err(HarnessError::InsufficientFixtures {
            required: 2,
            found: repo_ids.len(),
        }),
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Scenario {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown scenario '{}': expected one of {}",
                    s,
                    Scenario::ALL.map(|scenario| scenario.as_str()).join(", ")
                )
            })
    }
}
