//! Ambari REST API (v1) response types.
//!
//! Ambari wraps every collection in an `items` array and nests each
//! resource under a capitalised category key (`Clusters`, `Hosts`,
//! `HostRoles`, `AlertHistory`).

/// A collection response: `{ "items": [ ... ] }`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ItemList<T> {
    #[cfg_attr(feature = "serde", serde(default = "Vec::new"))]
    pub items: Vec<T>,
}

impl<T> ItemList<T> {
    /// Unwrap the collection.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// One entry of `GET /api/v1/clusters`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ClusterSummary {
    #[cfg_attr(feature = "serde", serde(rename = "Clusters"))]
    pub clusters: ClusterInfo,
}

impl ClusterSummary {
    pub fn name(&self) -> &str {
        &self.clusters.cluster_name
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ClusterInfo {
    pub cluster_name: String,
}

/// Wrapper of one alert history entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct AlertHistoryItem {
    #[cfg_attr(feature = "serde", serde(rename = "AlertHistory"))]
    pub alert: AlertHistory,
}

/// A single state change recorded by the Ambari alert framework.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct AlertHistory {
    pub cluster_name: Option<String>,
    pub component_name: Option<String>,
    pub definition_id: Option<u64>,
    pub definition_name: Option<String>,
    pub host_name: Option<String>,
    pub id: Option<u64>,
    pub instance: Option<String>,
    pub label: Option<String>,
    pub service_name: Option<String>,
    /// `OK`, `WARNING`, `CRITICAL` or `UNKNOWN`.
    pub state: Option<String>,
    pub text: Option<String>,
    /// Unix timestamp in milliseconds.
    pub timestamp: Option<i64>,
}

/// One entry of `GET /api/v1/clusters/{cluster}/hosts`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct HostSummary {
    #[cfg_attr(feature = "serde", serde(rename = "Hosts"))]
    pub hosts: HostInfo,
}

impl HostSummary {
    pub fn name(&self) -> &str {
        &self.hosts.host_name
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct HostInfo {
    pub host_name: String,
}

/// Wrapper of one host component entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct HostComponentItem {
    #[cfg_attr(feature = "serde", serde(rename = "HostRoles"))]
    pub host_roles: HostComponent,
}

/// A service component installed on a host.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct HostComponent {
    pub service_name: Option<String>,
    pub component_name: Option<String>,
    pub display_name: Option<String>,
}
