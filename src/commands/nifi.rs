use std::io::Write;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use clusterwatch_adapters::nifi::{NifiAdapter, NifiSession, ProcessorState, ProvenanceQuery};
use clusterwatch_adapters::{
    AdapterError, FlowNode, FlowVisitor, FlowWalker, PollPolicy, QueryPoller,
};
use clusterwatch_types::ProcessGroupFlowEntity;

use crate::duration::format_duration;
use crate::report::nifi::{
    audit_controller, connection_block, finding_line, processor_table, provenance_block,
    state_block, stateless_line, stop_error_line, stop_line,
};

/// Collects connection blocks for every visited group.
#[derive(Default)]
struct ConnectionReport {
    text: String,
    connections: usize,
}

#[async_trait]
impl FlowVisitor for ConnectionReport {
    async fn visit(&mut self, node: &FlowNode, _depth: usize) -> Result<(), AdapterError> {
        let flow: ProcessGroupFlowEntity = node.payload_as()?;
        for connection in flow.connections() {
            self.text.push_str(&connection_block(&node.id, connection));
            self.connections += 1;
        }
        Ok(())
    }
}

/// Audits the controller services of every visited group.
struct ControllerAudit<'s> {
    session: &'s NifiSession<'s>,
    text: String,
    findings: usize,
}

#[async_trait]
impl<'s> FlowVisitor for ControllerAudit<'s> {
    async fn visit(&mut self, node: &FlowNode, _depth: usize) -> Result<(), AdapterError> {
        for service in self.session.controller_services(&node.id).await? {
            if let Some(finding) = audit_controller(&service) {
                self.text.push_str(&finding_line(&node.id, &finding));
                self.findings += 1;
            }
        }
        Ok(())
    }
}

/// Renders a processor table for every visited group.
struct ProcessorReport<'s> {
    session: &'s NifiSession<'s>,
    text: String,
}

#[async_trait]
impl<'s> FlowVisitor for ProcessorReport<'s> {
    async fn visit(&mut self, node: &FlowNode, _depth: usize) -> Result<(), AdapterError> {
        let processors = self.session.processors(&node.id).await?;
        self.text.push_str(&processor_table(&processors));
        Ok(())
    }
}

async fn open_session(adapter: &NifiAdapter) -> Result<NifiSession<'_>> {
    adapter.session().await.context("cannot obtain a NiFi token")
}

/// Queue usage of every connection below `group`.
pub async fn connections<W: Write>(
    adapter: &NifiAdapter,
    walker: &FlowWalker,
    group: &str,
    out: &mut W,
) -> Result<()> {
    let session = open_session(adapter).await?;
    let mut report = ConnectionReport::default();

    let walked = walker.walk(&session, group, &mut report).await;
    out.write_all(report.text.as_bytes())?;

    let stats = walked.with_context(|| format!("cannot walk process group {}", group))?;
    info!(groups = stats.visited, connections = report.connections, "connection report");
    Ok(())
}

/// Controller services below `group` that fail the audit rules.
pub async fn controllers<W: Write>(
    adapter: &NifiAdapter,
    walker: &FlowWalker,
    group: &str,
    out: &mut W,
) -> Result<()> {
    let session = open_session(adapter).await?;
    let mut audit = ControllerAudit {
        session: &session,
        text: String::new(),
        findings: 0,
    };

    let walked = walker.walk(&session, group, &mut audit).await;
    out.write_all(audit.text.as_bytes())?;

    let stats = walked.with_context(|| format!("cannot audit controller services under {}", group))?;
    info!(groups = stats.visited, findings = audit.findings, "controller audit");
    Ok(())
}

/// One processor table per process group below `group`.
pub async fn processors<W: Write>(
    adapter: &NifiAdapter,
    walker: &FlowWalker,
    group: &str,
    out: &mut W,
) -> Result<()> {
    let session = open_session(adapter).await?;
    let mut report = ProcessorReport {
        session: &session,
        text: String::new(),
    };

    let walked = walker.walk(&session, group, &mut report).await;
    out.write_all(report.text.as_bytes())?;

    walked.with_context(|| format!("cannot list processors under {}", group))?;
    Ok(())
}

/// Pretty-printed JSON of one processor.
pub async fn processor<W: Write>(adapter: &NifiAdapter, id: &str, out: &mut W) -> Result<()> {
    let session = open_session(adapter).await?;
    let value = session
        .processor_json(id)
        .await
        .with_context(|| format!("cannot read processor {}", id))?;

    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(())
}

/// Stop each processor in turn.
///
/// A failure is reported on the processor's line and the next one is
/// still attempted. Fails at the end if any processor could not be stopped.
pub async fn stop<W: Write>(adapter: &NifiAdapter, ids: &[String], out: &mut W) -> Result<()> {
    let session = open_session(adapter).await?;
    let mut failed = 0;

    for id in ids {
        let line = match session.stop_processor(id).await {
            Ok(result) => stop_line(&result),
            Err(e) => {
                warn!(processor_id = %id, error = %e, "failed to stop processor");
                failed += 1;
                stop_error_line(id, &e)
            }
        };
        out.write_all(line.as_bytes())?;
    }

    if failed > 0 {
        bail!("{} of {} processor(s) could not be stopped", failed, ids.len());
    }
    Ok(())
}

/// State entries of one processor.
pub async fn state<W: Write>(adapter: &NifiAdapter, id: &str, out: &mut W) -> Result<()> {
    let session = open_session(adapter).await?;
    let state = session
        .processor_state(id)
        .await
        .with_context(|| format!("cannot read state of processor {}", id))?;

    match state {
        ProcessorState::Stateless => out.write_all(stateless_line(id).as_bytes())?,
        ProcessorState::Stateful(state) => {
            for entry in state.entries() {
                out.write_all(state_block(entry).as_bytes())?;
            }
        }
    }
    Ok(())
}

/// Provenance events recorded for one processor.
pub async fn provenance<W: Write>(
    adapter: &NifiAdapter,
    id: &str,
    max_results: u32,
    policy: PollPolicy,
    cancel: CancellationToken,
    out: &mut W,
) -> Result<()> {
    let session = open_session(adapter).await?;
    let query = session.provenance_query(id, max_results);
    let started = Instant::now();

    let events = QueryPoller::new(policy)
        .with_cancellation(cancel)
        .run_with(&query, ProvenanceQuery::events)
        .await
        .with_context(|| format!("provenance query for processor {} failed", id))?;
    info!(
        processor_id = %id,
        events = events.len(),
        elapsed = %format_duration(started.elapsed()),
        "provenance query finished"
    );

    for event in &events {
        out.write_all(provenance_block(event).as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterwatch_adapters::testing::{MockResponse, MockServer};
    use clusterwatch_adapters::{Credentials, HttpJsonClient};
    use std::time::Duration;

    fn adapter_for(server: &MockServer) -> NifiAdapter {
        let client = HttpJsonClient::builder()
            .endpoint(server.endpoint())
            .build()
            .unwrap();
        NifiAdapter::new(client, Credentials::new("nifi", "nifi"))
    }

    fn token() -> MockResponse {
        MockResponse::text(201, "tok")
    }

    fn flow(children: &[&str], connections: &str) -> MockResponse {
        let groups: Vec<String> = children
            .iter()
            .map(|c| format!(r#"{{"id":"{}"}}"#, c))
            .collect();
        MockResponse::json(
            200,
            &format!(
                r#"{{"processGroupFlow":{{"flow":{{"processGroups":[{}],"connections":[{}]}}}}}}"#,
                groups.join(","),
                connections
            ),
        )
    }

    fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_connections_walks_children() {
        let server = MockServer::start(vec![
            token(),
            flow(
                &["child"],
                r#"{"id":"c1","status":{"sourceName":"A","destinationName":"B"}}"#,
            ),
            flow(
                &[],
                r#"{"id":"c2","status":{"aggregateSnapshot":{"percentUseCount":3,"percentUseBytes":1}}}"#,
            ),
        ])
        .await;

        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = connections(&adapter, &FlowWalker::default(), "root", &mut out).await;
        let report = text(out);

        result.unwrap();
        assert!(report.contains("Process group: root\nConnection ID: c1\n"));
        assert!(report.contains("Pct use count: Not defined\n"));
        assert!(report.contains("Process group: child\nConnection ID: c2\n"));
        assert!(report.contains("Pct use count: 3\n"));
    }

    #[tokio::test]
    async fn test_connections_keeps_output_of_visited_groups() {
        let server = MockServer::start(vec![
            token(),
            flow(&["child"], r#"{"id":"c1"}"#),
            MockResponse::text(500, "boom"),
        ])
        .await;

        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = connections(&adapter, &FlowWalker::default(), "root", &mut out).await;
        let report = text(out);

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("500"));
        assert!(report.contains("Process group: root\nConnection ID: c1\n"));
        assert!(!report.contains("child"));
    }

    #[tokio::test]
    async fn test_processors_keeps_tables_of_visited_groups() {
        let server = MockServer::start(vec![
            token(),
            flow(&["child"], ""),
            MockResponse::json(200, r#"{"processors":[{"id":"p1","component":{"name":"ListHDFS"}}]}"#),
            MockResponse::text(404, "gone"),
        ])
        .await;

        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = processors(&adapter, &FlowWalker::default(), "root", &mut out).await;
        let report = text(out);

        assert!(result.is_err());
        assert!(report.contains("ListHDFS"));
    }

    #[tokio::test]
    async fn test_controllers_audit() {
        let server = MockServer::start(vec![
            token(),
            flow(&[], ""),
            MockResponse::json(
                200,
                r#"{"controllerServices":[
                    {"id":"s1","component":{"name":"hive-pool","type":"org.apache.nifi.dbcp.hive.HiveConnectionPool","properties":{"Validation-query":null}}},
                    {"id":"s2","component":{"name":"hbase-client","type":"org.apache.nifi.hbase.HBase_1_1_2_ClientService","properties":{"HBase Client Retries":"30"}}}
                ]}"#,
            ),
        ])
        .await;

        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = controllers(&adapter, &FlowWalker::default(), "root", &mut out).await;
        let report = text(out);

        result.unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.starts_with("Hive       root"));
        assert!(report.contains("hive-pool"));
    }

    #[tokio::test]
    async fn test_processors_per_group() {
        let server = MockServer::start(vec![
            token(),
            flow(&[], ""),
            MockResponse::json(
                200,
                r#"{"processors":[{"id":"p1","component":{"name":"ListHDFS"},"status":{"aggregateSnapshot":{"runStatus":"Stopped"}}}]}"#,
            ),
        ])
        .await;

        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = processors(&adapter, &FlowWalker::default(), "root", &mut out).await;
        let report = text(out);

        result.unwrap();
        assert!(report.starts_with("Name"));
        assert!(report.contains("ListHDFS"));
        assert!(report.contains("Stopped"));
    }

    #[tokio::test]
    async fn test_stop_continues_after_failure() {
        let server = MockServer::start(vec![
            token(),
            MockResponse::text(404, "missing"),
            MockResponse::json(
                200,
                r#"{"id":"p2","revision":{"version":1},"component":{"name":"PutHDFS","state":"STOPPED"}}"#,
            ),
        ])
        .await;

        let ids = vec!["p1".to_string(), "p2".to_string()];
        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = stop(&adapter, &ids, &mut out).await;
        let report = text(out);

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Processor ID p1"));
        assert!(lines[0].contains(": Error while stopping: "));
        assert!(lines[1].starts_with("Processor ID p2 (PutHDFS)"));
        assert!(lines[1].ends_with(": Already stopped"));
        assert!(result.unwrap_err().to_string().contains("1 of 2"));
    }

    #[tokio::test]
    async fn test_state_stateless() {
        let server = MockServer::start(vec![token(), MockResponse::text(409, "conflict")]).await;

        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = state(&adapter, "p1", &mut out).await;
        let report = text(out);

        result.unwrap();
        assert_eq!(report, "Processor p1 doesn't exist or is stateless.\n");
    }

    #[tokio::test]
    async fn test_processor_pretty_json() {
        let server =
            MockServer::start(vec![token(), MockResponse::json(200, r#"{"id":"p1","revision":{"version":2}}"#)])
                .await;

        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = processor(&adapter, "p1", &mut out).await;
        let report = text(out);

        result.unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["revision"]["version"], 2);
        assert!(report.contains("\n  \"id\": \"p1\""));
    }

    #[tokio::test]
    async fn test_provenance_report() {
        let server = MockServer::start(vec![
            token(),
            MockResponse::json(201, r#"{"provenance":{"id":"q1","finished":false}}"#),
            MockResponse::json(
                200,
                r#"{"provenance":{"id":"q1","finished":true,"results":{"provenanceEvents":[
                    {"componentName":"PutHDFS","componentType":"PutHDFS","eventTime":"11/14/2023 22:13:20.000 UTC","eventType":"SEND"}
                ]}}}"#,
            ),
            MockResponse::json(200, "{}"),
        ])
        .await;

        let policy = PollPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            max_wait: Duration::from_secs(10),
        };
        let adapter = adapter_for(&server);
        let mut out = Vec::new();
        let result = provenance(&adapter, "p1", 50, policy, CancellationToken::new(), &mut out).await;
        let report = text(out);

        result.unwrap();
        assert!(report.contains("componentName: PutHDFS\n"));
        assert!(report.contains("eventType    : SEND\n"));
        assert_eq!(server.requests().last().unwrap().method, "DELETE");
    }
}
