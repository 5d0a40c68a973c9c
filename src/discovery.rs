//! Cluster discovery: drains the paginated group listing and parses raw
//! group names into structured records.
//!
//! The delivery pipeline encodes service identity and revision into the
//! group name: `<application>-<service...>-v<NNN>`, with at least four
//! dash-separated segments and a service name that may itself contain
//! dashes. That encoding is an external contract preserved bit-for-bit at
//! this parse boundary; downstream code only ever sees [`ClusterRecord`].
//!
//! Names outside the expected shape are an ordinary part of the listing
//! (other tooling creates groups too) and are skipped silently, never an
//! error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::provider::{GroupLister, ProviderResult};

static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v(\d+)$").expect("valid version regex"));

/// One physical Auto Scaling group belonging to one logical service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterRecord {
    /// Full raw group name, globally unique.
    pub name: String,
    /// Logical service identifier derived from the name.
    pub service_name: String,
    /// Monotonically increasing revision embedded in the name.
    pub version: u64,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

/// Records grouped by service name, each group sorted by version descending.
///
/// The first record of a non-empty group is the newest cluster for that
/// service. Iteration order over services is unspecified; callers that need
/// stable output sort the keys themselves.
pub type ServiceGroups = HashMap<String, Vec<ClusterRecord>>;

/// Parse a raw group name belonging to `application` into its service name
/// and version. Returns `None` for any name outside the expected shape.
fn parse_group_name(application: &str, name: &str) -> Option<(String, u64)> {
    let prefix = format!("{application}-");
    if !name.starts_with(&prefix) {
        return None;
    }

    let parts: Vec<&str> = name.split('-').collect();
    if parts.len() < 4 {
        return None;
    }

    let service_name = parts[1..parts.len() - 1].join("-");
    let digits = VERSION_SUFFIX.captures(parts[parts.len() - 1])?.get(1)?;
    let version = digits.as_str().parse().ok()?;

    Some((service_name, version))
}

/// Discover all clusters of `application`, grouped per service.
///
/// Fully drains the paginated listing before grouping; there are no partial
/// results on success. Listing errors propagate unmodified.
pub async fn discover(
    application: &str,
    lister: &dyn GroupLister,
) -> ProviderResult<ServiceGroups> {
    let mut groups: ServiceGroups = HashMap::new();
    let mut next_token = None;

    loop {
        let page = lister.list_page(next_token).await?;

        for group in page.groups {
            let Some((service_name, version)) = parse_group_name(application, &group.name) else {
                continue;
            };
            groups
                .entry(service_name.clone())
                .or_default()
                .push(ClusterRecord {
                    name: group.name,
                    service_name,
                    version,
                    created_at: group.created_at,
                });
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    for records in groups.values_mut() {
        // Version descending. Ties in version are not expected, but order
        // them by creation time descending then name so repeated runs see
        // the same sequence.
        records.sort_by(|a, b| {
            b.version
                .cmp(&a.version)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    Ok(groups)
}
