//! Supported migration plugins
//!
//! Maps each Pulp 3 migration plugin type to the Pulp 2 content types it
//! migrates. Used to validate plans and to classify legacy repositories by
//! the content they hold.

/// Plugin types accepted in a migration plan
pub const SUPPORTED: &[&str] = &["iso", "rpm", "docker"];

/// Plugin types whose migrated repositories can be checked
///
/// Only the file plugin's repository and content endpoints are queried, so
/// other plugins may appear in plans but cannot be verified.
pub const VERIFIABLE: &[&str] = &["iso"];

const ISO_CONTENT: &[&str] = &["iso"];

const RPM_CONTENT: &[&str] = &[
    "rpm",
    "srpm",
    "erratum",
    "package_group",
    "package_category",
    "package_environment",
    "package_langpacks",
    "yum_repo_metadata_file",
    "modulemd",
    "modulemd_defaults",
    "distribution",
];

const DOCKER_CONTENT: &[&str] = &[
    "docker_blob",
    "docker_manifest",
    "docker_manifest_list",
    "docker_tag",
];

/// Pulp 2 content types migrated by a plugin, or `None` if unsupported
pub fn content_types(plugin: &str) -> Option<&'static [&'static str]> {
    match plugin {
        "iso" => Some(ISO_CONTENT),
        "rpm" => Some(RPM_CONTENT),
        "docker" => Some(DOCKER_CONTENT),
        _ => None,
    }
}

pub fn is_verifiable(plugin: &str) -> bool {
    VERIFIABLE.contains(&plugin)
}

/// Plugin owning a Pulp 2 content type
pub fn plugin_for_content_type(unit_type_id: &str) -> Option<&'static str> {
    SUPPORTED
        .iter()
        .copied()
        .find(|plugin| content_types(plugin).is_some_and(|types| types.contains(&unit_type_id)))
}
