//! Package registry links derived from partition keys.
//!
//! Partition keys in the traced tables embed a package id after the final
//! `$` separator (for example `az$nuget.versioning`), and row keys are
//! package versions. Linked labels point those keys at the public registry
//! page. Pure string work, no network access.

/// Base URL for package pages on the registry.
pub const REGISTRY_BASE_URL: &str = "https://www.nuget.org/packages";

/// The package id embedded in a partition key: everything after the final
/// `$`, or the whole key when there is none.
pub fn package_id(partition_key: &str) -> &str {
    match partition_key.rfind('$') {
        Some(index) => &partition_key[index + 1..],
        None => partition_key,
    }
}

/// Registry page URL for a partition key, pinned to a version when one is
/// given. An empty version counts as absent.
pub fn package_url(partition_key: &str, version: Option<&str>) -> String {
    let id = package_id(partition_key);
    match version {
        Some(version) if !version.is_empty() => {
            format!("{}/{}/{}", REGISTRY_BASE_URL, id, version)
        }
        _ => format!("{}/{}", REGISTRY_BASE_URL, id),
    }
}
