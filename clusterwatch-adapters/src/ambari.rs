//! Ambari adapter using the Ambari REST API.
//!
//! All requests use HTTP basic authentication.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clusterwatch_adapters::ambari::AmbariAdapter;
//! use clusterwatch_adapters::{Credentials, HttpJsonClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpJsonClient::builder()
//!         .endpoint("https://ambari.example.com:8443")
//!         .build()?;
//!     let adapter = AmbariAdapter::new(client, Credentials::new("admin", "admin"));
//!
//!     for cluster in adapter.clusters().await? {
//!         let alerts = adapter.alert_history(&cluster).await?;
//!         println!("{}: {} alerts", cluster, alerts.len());
//!     }
//!     Ok(())
//! }
//! ```

use reqwest::Url;
use tracing::debug;

use clusterwatch_types::ambari::{
    AlertHistory, AlertHistoryItem, ClusterSummary, HostComponent, HostComponentItem,
    HostSummary, ItemList,
};

use crate::auth::{Auth, Credentials};
use crate::client::HttpJsonClient;
use crate::AdapterError;

const HOST_COMPONENT_FIELDS: &str =
    "HostRoles/service_name,HostRoles/component_name,HostRoles/display_name";

/// Ambari adapter.
#[derive(Debug)]
pub struct AmbariAdapter {
    client: HttpJsonClient,
    auth: Auth,
}

impl AmbariAdapter {
    pub fn new(client: HttpJsonClient, credentials: Credentials) -> Self {
        Self {
            client,
            auth: Auth::Basic(credentials),
        }
    }

    async fn items<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, AdapterError> {
        let list: ItemList<T> = self.client.get_as(url, &self.auth).await?;
        Ok(list.into_items())
    }

    /// Names of the clusters this Ambari server manages.
    pub async fn clusters(&self) -> Result<Vec<String>, AdapterError> {
        let url = self.client.url(&["api", "v1", "clusters"]);
        let clusters: Vec<ClusterSummary> = self.items(url).await?;
        debug!(count = clusters.len(), "fetched Ambari clusters");
        Ok(clusters.iter().map(|c| c.name().to_string()).collect())
    }

    /// Full alert history of one cluster.
    pub async fn alert_history(&self, cluster: &str) -> Result<Vec<AlertHistory>, AdapterError> {
        let url = self.client.url_with_query(
            &["api", "v1", "clusters", cluster, "alert_history"],
            &[("fields", "*")],
        );
        let items: Vec<AlertHistoryItem> = self.items(url).await?;
        Ok(items.into_iter().map(|i| i.alert).collect())
    }

    /// Host names of one cluster.
    pub async fn hosts(&self, cluster: &str) -> Result<Vec<String>, AdapterError> {
        let url = self.client.url(&["api", "v1", "clusters", cluster, "hosts"]);
        let hosts: Vec<HostSummary> = self.items(url).await?;
        Ok(hosts.iter().map(|h| h.name().to_string()).collect())
    }

    /// Components installed on one host.
    pub async fn host_components(
        &self,
        cluster: &str,
        host: &str,
    ) -> Result<Vec<HostComponent>, AdapterError> {
        let url = self.client.url_with_query(
            &["api", "v1", "clusters", cluster, "hosts", host, "host_components"],
            &[("fields", HOST_COMPONENT_FIELDS)],
        );
        let items: Vec<HostComponentItem> = self.items(url).await?;
        Ok(items.into_iter().map(|i| i.host_roles).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockResponse, MockServer};

    fn adapter_for(server: &MockServer) -> AmbariAdapter {
        let client = HttpJsonClient::builder()
            .endpoint(server.endpoint())
            .build()
            .unwrap();
        AmbariAdapter::new(client, Credentials::new("admin", "admin"))
    }

    #[tokio::test]
    async fn test_clusters() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"href":"x","items":[{"href":"y","Clusters":{"cluster_name":"prod","version":"HDP-3.1"}}]}"#,
        )])
        .await;

        let clusters = adapter_for(&server).clusters().await.unwrap();
        assert_eq!(clusters, vec!["prod"]);

        let request = &server.requests()[0];
        assert_eq!(request.path, "/api/v1/clusters");
        assert_eq!(request.header("authorization"), Some("Basic YWRtaW46YWRtaW4="));
    }

    #[tokio::test]
    async fn test_alert_history() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"items":[{"AlertHistory":{"host_name":"node1","label":"DataNode Process","state":"CRITICAL","timestamp":1700000000000}}]}"#,
        )])
        .await;

        let alerts = adapter_for(&server).alert_history("prod").await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].host_name.as_deref(), Some("node1"));
        assert_eq!(alerts[0].timestamp, Some(1_700_000_000_000));
        assert_eq!(
            server.requests()[0].path,
            "/api/v1/clusters/prod/alert_history?fields=*"
        );
    }

    #[tokio::test]
    async fn test_hosts_and_components() {
        let server = MockServer::start(vec![
            MockResponse::json(200, r#"{"items":[{"Hosts":{"host_name":"node1"}},{"Hosts":{"host_name":"node2"}}]}"#),
            MockResponse::json(
                200,
                r#"{"items":[{"HostRoles":{"service_name":"HDFS","component_name":"DATANODE","display_name":"DataNode"}}]}"#,
            ),
        ])
        .await;
        let adapter = adapter_for(&server);

        assert_eq!(adapter.hosts("prod").await.unwrap(), vec!["node1", "node2"]);

        let components = adapter.host_components("prod", "node1").await.unwrap();
        assert_eq!(components[0].display_name.as_deref(), Some("DataNode"));

        let requests = server.requests();
        assert_eq!(requests[0].path, "/api/v1/clusters/prod/hosts");
        assert_eq!(
            requests[1].path,
            "/api/v1/clusters/prod/hosts/node1/host_components?fields=HostRoles%2Fservice_name%2CHostRoles%2Fcomponent_name%2CHostRoles%2Fdisplay_name"
        );
    }

    #[tokio::test]
    async fn test_names_stay_inside_their_segment() {
        let server = MockServer::start(vec![MockResponse::json(200, "{}")]).await;

        adapter_for(&server).hosts("dev #2/a").await.unwrap();
        assert_eq!(
            server.requests()[0].path,
            "/api/v1/clusters/dev%20%232%2Fa/hosts"
        );
    }

    #[tokio::test]
    async fn test_missing_items_is_empty() {
        let server = MockServer::start(vec![MockResponse::json(200, r#"{"href":"x"}"#)]).await;
        assert!(adapter_for(&server).clusters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start(vec![MockResponse::text(401, "denied")]).await;
        let err = adapter_for(&server).clusters().await.unwrap_err();
        assert!(err.is_auth_failure());
    }
}
