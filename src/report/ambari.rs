//! Ambari report formatters.

use clusterwatch_types::{AlertHistory, HostComponent};

use super::{field_block, format_timestamp_ms, or_not_defined};

/// One alert-history entry as a field block.
pub fn alert_block(alert: &AlertHistory) -> String {
    let text = |v: &Option<String>| or_not_defined(v.as_deref());

    field_block(&[
        ("cluster_name", text(&alert.cluster_name)),
        ("component_name", text(&alert.component_name)),
        ("definition_id", or_not_defined(alert.definition_id)),
        ("definition_name", text(&alert.definition_name)),
        ("host_name", text(&alert.host_name)),
        ("id", or_not_defined(alert.id)),
        ("instance", text(&alert.instance)),
        ("label", text(&alert.label)),
        ("service_name", text(&alert.service_name)),
        ("state", text(&alert.state)),
        ("text", text(&alert.text)),
        (
            "timestamp",
            or_not_defined(alert.timestamp.and_then(format_timestamp_ms)),
        ),
    ])
}

/// One host component as a field block.
pub fn component_block(cluster: &str, host: &str, component: &HostComponent) -> String {
    field_block(&[
        ("cluster_name", cluster.to_string()),
        ("host_name", host.to_string()),
        ("service_name", or_not_defined(component.service_name.as_deref())),
        ("component_name", or_not_defined(component.component_name.as_deref())),
        ("display_name", or_not_defined(component.display_name.as_deref())),
    ])
}
