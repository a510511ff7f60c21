//! NiFi report formatters.

use clusterwatch_adapters::nifi::{StopOutcome, StopResult};
use clusterwatch_types::{
    ConnectionEntity, ControllerServiceEntity, ProcessorEntity, ProvenanceEvent, StateEntry,
};

use super::{field_block, format_timestamp_secs, or_not_defined, Column, Table};

/// Implementation class of the Hive connection pool.
pub const HIVE_CONNECTION_POOL: &str = "org.apache.nifi.dbcp.hive.HiveConnectionPool";

/// Retry count an HBase client service is expected to use.
pub const EXPECTED_HBASE_RETRIES: &str = "30";

const PROCESSOR_COLUMNS: [Column; 4] = [
    Column::new("Name", 70),
    Column::new("Type", 20),
    Column::new("Node", 10),
    Column::new("ID", 36),
];

/// One connection with its queue usage.
pub fn connection_block(group_id: &str, connection: &ConnectionEntity) -> String {
    field_block(&[
        ("Process group", group_id.to_string()),
        ("Connection ID", connection.id.clone()),
        ("Source name", or_not_defined(connection.source_name())),
        ("Dest. name", or_not_defined(connection.destination_name())),
        ("Pct use count", or_not_defined(connection.percent_use_count())),
        ("Pct use bytes", or_not_defined(connection.percent_use_bytes())),
    ])
}

/// A controller service configured in a way worth flagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerFinding {
    /// Hive pool without a validation query.
    HiveMissingValidationQuery { name: String },
    /// HBase client not using the expected retry count.
    HBaseRetries { name: String, retries: Option<String> },
}

/// Check one controller service against the audit rules.
pub fn audit_controller(service: &ControllerServiceEntity) -> Option<ControllerFinding> {
    let component = &service.component;

    if component.kind == HIVE_CONNECTION_POOL && service.property("Validation-query").is_none() {
        return Some(ControllerFinding::HiveMissingValidationQuery {
            name: component.name.clone(),
        });
    }

    if component.kind.contains("hbase") {
        let retries = service.property("HBase Client Retries");
        if retries != Some(EXPECTED_HBASE_RETRIES) {
            return Some(ControllerFinding::HBaseRetries {
                name: component.name.clone(),
                retries: retries.map(str::to_string),
            });
        }
    }

    None
}

pub fn finding_line(group_id: &str, finding: &ControllerFinding) -> String {
    match finding {
        ControllerFinding::HiveMissingValidationQuery { name } => {
            format!("{:<10} {:<10}    {}\n", "Hive", group_id, name)
        }
        ControllerFinding::HBaseRetries { name, retries } => format!(
            "{:<10} {:<10}    {:<40} {}\n",
            "HBase",
            group_id,
            name,
            or_not_defined(retries.as_deref())
        ),
    }
}

/// Processors of one group as a table, followed by a blank line.
pub fn processor_table(processors: &[ProcessorEntity]) -> String {
    let mut table = Table::new(PROCESSOR_COLUMNS);
    for processor in processors {
        table.push_row(vec![
            or_not_defined(processor.name()),
            or_not_defined(processor.run_status()),
            or_not_defined(processor.execution_node()),
            processor.id.clone(),
        ]);
    }
    let mut out = table.render();
    out.push('\n');
    out
}

fn processor_label(id: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Processor ID {} ({})", id, name),
        None => format!("Processor ID {}", id),
    }
}

pub fn stop_line(result: &StopResult) -> String {
    let outcome = match &result.outcome {
        StopOutcome::AlreadyStopped => "Already stopped".to_string(),
        StopOutcome::Stopped => "Stopping now".to_string(),
        StopOutcome::RevisionConflict { version } => {
            format!("Revision conflict (revision {} is stale)", version)
        }
    };
    format!(
        "{:<100}: {}\n",
        processor_label(&result.id, result.name.as_deref()),
        outcome
    )
}

pub fn stop_error_line(id: &str, error: &dyn std::fmt::Display) -> String {
    format!(
        "{:<100}: Error while stopping: {}\n",
        processor_label(id, None),
        error
    )
}

/// One state entry; values holding epoch seconds are also shown as a date.
pub fn state_block(entry: &StateEntry) -> String {
    let value = entry.value.as_deref();
    let as_timestamp = value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(format_timestamp_secs)
        .unwrap_or_else(|| "n/a".to_string());

    field_block(&[
        ("Key", entry.key.clone()),
        ("Value", or_not_defined(value)),
        ("Value (ts)", as_timestamp),
    ])
}

pub fn stateless_line(processor_id: &str) -> String {
    format!("Processor {} doesn't exist or is stateless.\n", processor_id)
}

pub fn provenance_block(event: &ProvenanceEvent) -> String {
    field_block(&[
        ("componentName", or_not_defined(event.component_name.as_deref())),
        ("componentType", or_not_defined(event.component_type.as_deref())),
        ("eventTime", or_not_defined(event.event_time.as_deref())),
        ("eventType", or_not_defined(event.event_type.as_deref())),
    ])
}
