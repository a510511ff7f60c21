//! NiFi REST API response types.
//!
//! Only the fields clusterwatch reports on are modelled; NiFi sends far
//! more and unknown fields are ignored.

use std::collections::BTreeMap;

/// `GET /flow/process-groups/{id}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProcessGroupFlowEntity {
    pub process_group_flow: ProcessGroupFlow,
}

impl ProcessGroupFlowEntity {
    /// Ids of the direct child process groups, in server order.
    pub fn child_group_ids(&self) -> Vec<String> {
        self.process_group_flow
            .flow
            .process_groups
            .iter()
            .map(|g| g.id.clone())
            .collect()
    }

    pub fn connections(&self) -> &[ConnectionEntity] {
        &self.process_group_flow.flow.connections
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProcessGroupFlow {
    pub id: Option<String>,
    pub flow: FlowContents,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FlowContents {
    #[cfg_attr(feature = "serde", serde(default))]
    pub process_groups: Vec<ProcessGroupRef>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub connections: Vec<ConnectionEntity>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProcessGroupRef {
    pub id: String,
}

/// A connection between two components, with its queue statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ConnectionEntity {
    pub id: String,
    pub status: Option<ConnectionStatus>,
}

impl ConnectionEntity {
    pub fn source_name(&self) -> Option<&str> {
        self.status.as_ref()?.source_name.as_deref()
    }

    pub fn destination_name(&self) -> Option<&str> {
        self.status.as_ref()?.destination_name.as_deref()
    }

    /// Queue fill ratio by flowfile count, in percent.
    pub fn percent_use_count(&self) -> Option<i64> {
        self.status.as_ref()?.aggregate_snapshot.as_ref()?.percent_use_count
    }

    /// Queue fill ratio by size, in percent.
    pub fn percent_use_bytes(&self) -> Option<i64> {
        self.status.as_ref()?.aggregate_snapshot.as_ref()?.percent_use_bytes
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ConnectionStatus {
    pub source_name: Option<String>,
    pub destination_name: Option<String>,
    pub aggregate_snapshot: Option<ConnectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ConnectionSnapshot {
    pub percent_use_count: Option<i64>,
    pub percent_use_bytes: Option<i64>,
}

/// `GET /flow/process-groups/{id}/controller-services`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ControllerServicesEntity {
    #[cfg_attr(feature = "serde", serde(default))]
    pub controller_services: Vec<ControllerServiceEntity>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ControllerServiceEntity {
    pub id: String,
    pub component: ControllerServiceComponent,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ControllerServiceComponent {
    pub name: String,
    /// Fully qualified implementation class.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    /// Property values; `None` when the property is unset.
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: BTreeMap<String, Option<String>>,
}

impl ControllerServiceEntity {
    /// Value of a property, `None` when absent or unset.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.component.properties.get(name)?.as_deref()
    }
}

/// `GET /process-groups/{id}/processors`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProcessorsEntity {
    #[cfg_attr(feature = "serde", serde(default))]
    pub processors: Vec<ProcessorEntity>,
}

/// A processor with its revision, configuration and status.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProcessorEntity {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub revision: Revision,
    pub component: Option<ProcessorComponent>,
    pub status: Option<ProcessorStatus>,
}

impl ProcessorEntity {
    /// Name from the component, falling back to the status block.
    pub fn name(&self) -> Option<&str> {
        self.component
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .or_else(|| self.status.as_ref()?.name.as_deref())
    }

    /// Scheduled state (`RUNNING`, `STOPPED`, `DISABLED`).
    pub fn state(&self) -> Option<&str> {
        self.component.as_ref()?.state.as_deref()
    }

    pub fn run_status(&self) -> Option<&str> {
        self.status
            .as_ref()?
            .aggregate_snapshot
            .as_ref()?
            .run_status
            .as_deref()
    }

    /// `ALL` or `PRIMARY`.
    pub fn execution_node(&self) -> Option<&str> {
        self.component
            .as_ref()?
            .config
            .as_ref()?
            .execution_node
            .as_deref()
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == Some("STOPPED")
    }
}

/// Optimistic-concurrency revision attached to every mutable NiFi entity.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Revision {
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: i64,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProcessorComponent {
    pub name: Option<String>,
    pub state: Option<String>,
    pub config: Option<ProcessorConfig>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProcessorConfig {
    pub execution_node: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProcessorStatus {
    pub name: Option<String>,
    pub aggregate_snapshot: Option<ProcessorSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProcessorSnapshot {
    pub run_status: Option<String>,
}

/// `GET /processors/{id}/state`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ComponentStateEntity {
    pub component_state: ComponentState,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ComponentState {
    pub cluster_state: Option<StateMap>,
    pub local_state: Option<StateMap>,
}

impl ComponentState {
    /// Cluster-scoped entries followed by node-local ones.
    pub fn entries(&self) -> impl Iterator<Item = &StateEntry> {
        self.cluster_state
            .iter()
            .chain(self.local_state.iter())
            .flat_map(|m| m.state.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct StateMap {
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: Vec<StateEntry>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct StateEntry {
    pub key: String,
    pub value: Option<String>,
}

/// `POST /provenance` and `GET /provenance/{id}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProvenanceEntity {
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Provenance {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub finished: bool,
    pub percent_completed: Option<u8>,
    pub results: Option<ProvenanceResults>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProvenanceResults {
    #[cfg_attr(feature = "serde", serde(default))]
    pub provenance_events: Vec<ProvenanceEvent>,
}

/// One data-lineage event.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProvenanceEvent {
    pub component_name: Option<String>,
    pub component_type: Option<String>,
    /// Already formatted by NiFi, e.g. `11/14/2023 22:13:20.000 UTC`.
    pub event_time: Option<String>,
    pub event_type: Option<String>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_process_group_flow() {
        let json = r#"{
            "permissions": { "canRead": true },
            "processGroupFlow": {
                "id": "root-id",
                "flow": {
                    "processGroups": [ { "id": "b" }, { "id": "a" } ],
                    "connections": [
                        {
                            "id": "c1",
                            "status": {
                                "sourceName": "GetFile",
                                "destinationName": "PutHDFS",
                                "aggregateSnapshot": { "percentUseCount": 12, "percentUseBytes": 3 }
                            }
                        },
                        { "id": "c2", "status": { "sourceName": "A", "destinationName": "B", "aggregateSnapshot": {} } }
                    ]
                }
            }
        }"#;

        let entity: ProcessGroupFlowEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.child_group_ids(), vec!["b", "a"]);

        let connections = entity.connections();
        assert_eq!(connections[0].source_name(), Some("GetFile"));
        assert_eq!(connections[0].destination_name(), Some("PutHDFS"));
        assert_eq!(connections[0].percent_use_count(), Some(12));
        assert_eq!(connections[0].percent_use_bytes(), Some(3));
        assert_eq!(connections[1].percent_use_count(), None);
        assert_eq!(connections[1].percent_use_bytes(), None);
    }

    #[test]
    fn test_flow_without_children() {
        let json = r#"{ "processGroupFlow": { "flow": {} } }"#;
        let entity: ProcessGroupFlowEntity = serde_json::from_str(json).unwrap();
        assert!(entity.child_group_ids().is_empty());
        assert!(entity.connections().is_empty());
    }

    #[test]
    fn test_controller_service_properties() {
        let json = r#"{
            "controllerServices": [{
                "id": "cs1",
                "component": {
                    "name": "Hive pool",
                    "type": "org.apache.nifi.dbcp.hive.HiveConnectionPool",
                    "properties": { "Validation-query": null, "hive-db-connect-url": "jdbc:hive2://x" }
                }
            }]
        }"#;

        let entity: ControllerServicesEntity = serde_json::from_str(json).unwrap();
        let service = &entity.controller_services[0];
        assert_eq!(service.component.kind, "org.apache.nifi.dbcp.hive.HiveConnectionPool");
        assert_eq!(service.property("Validation-query"), None);
        assert_eq!(service.property("hive-db-connect-url"), Some("jdbc:hive2://x"));
        assert_eq!(service.property("missing"), None);
    }

    #[test]
    fn test_processor_entity() {
        let json = r#"{
            "id": "p1",
            "revision": { "version": 7, "clientId": "abc" },
            "component": { "name": "ListHDFS", "state": "STOPPED", "config": { "executionNode": "PRIMARY" } },
            "status": { "name": "ListHDFS", "aggregateSnapshot": { "runStatus": "Stopped" } }
        }"#;

        let processor: ProcessorEntity = serde_json::from_str(json).unwrap();
        assert_eq!(processor.name(), Some("ListHDFS"));
        assert_eq!(processor.run_status(), Some("Stopped"));
        assert_eq!(processor.execution_node(), Some("PRIMARY"));
        assert_eq!(processor.revision.version, 7);
        assert_eq!(processor.revision.client_id.as_deref(), Some("abc"));
        assert!(processor.is_stopped());
    }

    #[test]
    fn test_processor_without_revision_client() {
        let json = r#"{ "id": "p2", "revision": { "version": 0 }, "component": { "state": "RUNNING" } }"#;
        let processor: ProcessorEntity = serde_json::from_str(json).unwrap();
        assert!(processor.revision.client_id.is_none());
        assert!(!processor.is_stopped());
        assert_eq!(processor.name(), None);
    }

    #[test]
    fn test_component_state_entries() {
        let json = r#"{
            "componentState": {
                "componentId": "p1",
                "clusterState": { "scope": "CLUSTER", "state": [ { "key": "listing.timestamp", "value": "1700000000" } ] },
                "localState": { "scope": "LOCAL", "state": [ { "key": "id", "value": null } ] }
            }
        }"#;

        let entity: ComponentStateEntity = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = entity
            .component_state
            .entries()
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(keys, vec!["listing.timestamp", "id"]);
    }

    #[test]
    fn test_provenance_running_and_finished() {
        let running = r#"{ "provenance": { "id": "q1", "finished": false, "percentCompleted": 40 } }"#;
        let entity: ProvenanceEntity = serde_json::from_str(running).unwrap();
        assert!(!entity.provenance.finished);
        assert!(entity.provenance.results.is_none());

        let finished = r#"{
            "provenance": {
                "id": "q1",
                "finished": true,
                "results": {
                    "provenanceEvents": [
                        { "componentName": "PutHDFS", "componentType": "PutHDFS", "eventTime": "11/14/2023 22:13:20.000 UTC", "eventType": "SEND" }
                    ]
                }
            }
        }"#;
        let entity: ProvenanceEntity = serde_json::from_str(finished).unwrap();
        let events = &entity.provenance.results.unwrap().provenance_events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type.as_deref(), Some("SEND"));
    }
}
