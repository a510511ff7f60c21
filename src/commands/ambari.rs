use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use clusterwatch_adapters::ambari::AmbariAdapter;

use crate::report::ambari::{alert_block, component_block};

/// Alert history of every cluster.
pub async fn alerts<W: Write>(adapter: &AmbariAdapter, out: &mut W) -> Result<()> {
    let clusters = adapter.clusters().await.context("cannot list Ambari clusters")?;

    for cluster in &clusters {
        let alerts = adapter
            .alert_history(cluster)
            .await
            .with_context(|| format!("cannot read alert history of cluster {}", cluster))?;
        info!(cluster = %cluster, count = alerts.len(), "alert history");

        for alert in &alerts {
            out.write_all(alert_block(alert).as_bytes())?;
        }
    }

    Ok(())
}

/// Components installed on every host of every cluster.
pub async fn components<W: Write>(adapter: &AmbariAdapter, out: &mut W) -> Result<()> {
    let clusters = adapter.clusters().await.context("cannot list Ambari clusters")?;

    for cluster in &clusters {
        let hosts = adapter
            .hosts(cluster)
            .await
            .with_context(|| format!("cannot list hosts of cluster {}", cluster))?;

        for host in &hosts {
            let components = adapter
                .host_components(cluster, host)
                .await
                .with_context(|| format!("cannot list components of host {}", host))?;

            for component in &components {
                out.write_all(component_block(cluster, host, component).as_bytes())?;
            }
        }
    }

    Ok(())
}
