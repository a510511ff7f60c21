//! NiFi adapter using the NiFi REST API.
//!
//! Every top-level operation starts a [`NifiSession`], which exchanges the
//! configured credentials for a bearer token once and then issues all of
//! that operation's requests with it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use clusterwatch_adapters::nifi::NifiAdapter;
//! use clusterwatch_adapters::{Credentials, FlowWalker, HttpJsonClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpJsonClient::builder()
//!         .endpoint("https://nifi.example.com:9091")
//!         .build()?;
//!     let adapter = NifiAdapter::new(client, Credentials::new("admin", "secret"));
//!
//!     let session = adapter.session().await?;
//!     for processor in session.processors("root").await? {
//!         println!("{} {:?}", processor.id, processor.run_status());
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::{debug, info};

use clusterwatch_types::nifi::{
    ComponentState, ComponentStateEntity, ControllerServiceEntity, ControllerServicesEntity,
    ProcessGroupFlowEntity, ProcessorEntity, ProcessorsEntity, ProvenanceEntity, ProvenanceEvent,
    ProvenanceResults,
};

use crate::auth::{Auth, Credentials};
use crate::client::{decode, HttpJsonClient};
use crate::poller::{AsyncQuery, QueryStatus};
use crate::token::TokenProvider;
use crate::walker::{FlowNode, FlowSource};
use crate::AdapterError;

/// First path segment of every NiFi REST resource.
pub const API_ROOT: &str = "nifi-api";

/// Default `maxResults` for provenance searches.
pub const DEFAULT_PROVENANCE_MAX_RESULTS: u32 = 1000;

/// NiFi adapter holding the HTTP client and token provider.
#[derive(Debug)]
pub struct NifiAdapter {
    client: HttpJsonClient,
    tokens: TokenProvider,
}

impl NifiAdapter {
    pub fn new(client: HttpJsonClient, credentials: Credentials) -> Self {
        let tokens = TokenProvider::new(client.clone(), credentials);
        Self { client, tokens }
    }

    /// Reuse one token across sessions instead of exchanging per session.
    pub fn with_token_caching(mut self, enabled: bool) -> Self {
        self.tokens = self.tokens.with_caching(enabled);
        self
    }

    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    /// Obtain a token and open a session for one operation.
    pub async fn session(&self) -> Result<NifiSession<'_>, AdapterError> {
        let token = self.tokens.get_token().await?;
        Ok(NifiSession {
            client: &self.client,
            auth: Auth::Bearer(token),
        })
    }
}

/// Result of asking NiFi to stop a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The processor was already `STOPPED`; nothing was sent.
    AlreadyStopped,
    /// The stop request was accepted.
    Stopped,
    /// NiFi rejected the revision we sent (HTTP 409).
    RevisionConflict { version: i64 },
}

/// A stop attempt for one processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopResult {
    pub id: String,
    pub name: Option<String>,
    pub outcome: StopOutcome,
}

/// State of a processor's `/state` resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorState {
    Stateful(ComponentState),
    /// No state resource: the processor is stateless or does not exist.
    Stateless,
}

/// Requests authenticated with one bearer token.
#[derive(Debug)]
pub struct NifiSession<'a> {
    client: &'a HttpJsonClient,
    auth: Auth,
}

impl<'a> NifiSession<'a> {
    fn url(&self, segments: &[&str]) -> Url {
        let mut path = Vec::with_capacity(segments.len() + 1);
        path.push(API_ROOT);
        path.extend_from_slice(segments);
        self.client.url(&path)
    }

    async fn get_as<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AdapterError> {
        self.client.get_as(self.url(segments), &self.auth).await
    }

    /// `GET /flow/process-groups/{id}` as raw JSON.
    pub async fn process_group_flow_json(&self, group_id: &str) -> Result<Value, AdapterError> {
        let url = self.url(&["flow", "process-groups", group_id]);
        self.client.get(url, &self.auth).await
    }

    /// Controller services defined in one process group.
    pub async fn controller_services(
        &self,
        group_id: &str,
    ) -> Result<Vec<ControllerServiceEntity>, AdapterError> {
        let entity: ControllerServicesEntity = self
            .get_as(&["flow", "process-groups", group_id, "controller-services"])
            .await?;
        Ok(entity.controller_services)
    }

    /// Processors directly inside one process group.
    pub async fn processors(&self, group_id: &str) -> Result<Vec<ProcessorEntity>, AdapterError> {
        let entity: ProcessorsEntity = self
            .get_as(&["process-groups", group_id, "processors"])
            .await?;
        Ok(entity.processors)
    }

    /// One processor as raw JSON.
    pub async fn processor_json(&self, processor_id: &str) -> Result<Value, AdapterError> {
        let url = self.url(&["processors", processor_id]);
        self.client.get(url, &self.auth).await
    }

    pub async fn processor(&self, processor_id: &str) -> Result<ProcessorEntity, AdapterError> {
        self.get_as(&["processors", processor_id]).await
    }

    /// Stop a processor unless it is already stopped.
    ///
    /// The current revision is read first and sent back with the update.
    /// A 409 means someone else changed the processor in between; it is
    /// reported as [`StopOutcome::RevisionConflict`] and not retried.
    pub async fn stop_processor(&self, processor_id: &str) -> Result<StopResult, AdapterError> {
        let processor = self.processor(processor_id).await?;
        let name = processor.name().map(str::to_string);

        if processor.is_stopped() {
            return Ok(StopResult {
                id: processor_id.to_string(),
                name,
                outcome: StopOutcome::AlreadyStopped,
            });
        }

        let body = stop_request_body(&processor);
        let url = self.url(&["processors", processor_id]);
        let outcome = match self.client.put(url, &self.auth, &body).await {
            Ok(_) => {
                info!(processor_id, "processor stop requested");
                StopOutcome::Stopped
            }
            Err(e) if e.status() == Some(409) => StopOutcome::RevisionConflict {
                version: processor.revision.version,
            },
            Err(e) => return Err(e),
        };

        Ok(StopResult {
            id: processor_id.to_string(),
            name,
            outcome,
        })
    }

    /// Contents of the processor's state, or `Stateless` when NiFi has none.
    pub async fn processor_state(&self, processor_id: &str) -> Result<ProcessorState, AdapterError> {
        match self
            .get_as::<ComponentStateEntity>(&["processors", processor_id, "state"])
            .await
        {
            Ok(entity) => Ok(ProcessorState::Stateful(entity.component_state)),
            Err(e) if matches!(e.status(), Some(404 | 409)) => {
                debug!(processor_id, status = e.status(), "no state resource");
                Ok(ProcessorState::Stateless)
            }
            Err(e) => Err(e),
        }
    }

    /// A provenance search for events of one processor.
    pub fn provenance_query(&self, processor_id: &str, max_results: u32) -> ProvenanceQuery<'_> {
        ProvenanceQuery {
            session: self,
            processor_id: processor_id.to_string(),
            max_results,
        }
    }
}

#[async_trait]
impl<'a> FlowSource for NifiSession<'a> {
    async fn fetch_node(&self, id: &str) -> Result<FlowNode, AdapterError> {
        let payload = self.process_group_flow_json(id).await?;
        let url = self.url(&["flow", "process-groups", id]);
        let entity: ProcessGroupFlowEntity = decode(url.as_str(), payload.clone())?;

        Ok(FlowNode {
            id: id.to_string(),
            children: entity.child_group_ids(),
            payload,
        })
    }
}

/// Body of the PUT that stops a processor.
pub(crate) fn stop_request_body(processor: &ProcessorEntity) -> Value {
    let mut revision = json!({ "version": processor.revision.version });
    if let Some(client_id) = &processor.revision.client_id {
        revision["clientId"] = json!(client_id);
    }

    json!({
        "revision": revision,
        "status": { "aggregateSnapshot": { "runStatus": "STOPPED" } },
        "component": { "id": processor.id, "state": "STOPPED" },
        "id": processor.id,
    })
}

/// Provenance search submitted through `POST /provenance`.
#[derive(Debug)]
pub struct ProvenanceQuery<'a> {
    session: &'a NifiSession<'a>,
    processor_id: String,
    max_results: u32,
}

impl ProvenanceQuery<'_> {
    fn request_body(&self) -> Value {
        json!({
            "provenance": {
                "request": {
                    "maxResults": self.max_results,
                    "searchTerms": { "ProcessorID": self.processor_id }
                }
            }
        })
    }

    fn status_from(&self, url: &str, value: Value) -> Result<QueryStatus, AdapterError> {
        let results = value
            .pointer("/provenance/results")
            .cloned()
            .unwrap_or(Value::Null);
        let entity: ProvenanceEntity = decode(url, value)?;
        Ok(QueryStatus {
            id: entity.provenance.id,
            finished: entity.provenance.finished,
            results,
        })
    }

    /// Decode a finished query's results into events.
    pub fn events(results: Value) -> Result<Vec<ProvenanceEvent>, AdapterError> {
        if results.is_null() {
            return Ok(Vec::new());
        }
        let results: ProvenanceResults = decode("provenance results", results)?;
        Ok(results.provenance_events)
    }
}

#[async_trait]
impl<'a> AsyncQuery for ProvenanceQuery<'a> {
    async fn submit(&self) -> Result<QueryStatus, AdapterError> {
        let url = self.session.url(&["provenance"]);
        let value = self
            .session
            .client
            .post(url.clone(), &self.session.auth, &self.request_body())
            .await?;
        self.status_from(url.as_str(), value)
    }

    async fn poll(&self, id: &str) -> Result<QueryStatus, AdapterError> {
        let url = self.session.url(&["provenance", id]);
        let value = self
            .session
            .client
            .get(url.clone(), &self.session.auth)
            .await?;
        self.status_from(url.as_str(), value)
    }

    async fn cleanup(&self, id: &str) -> Result<(), AdapterError> {
        let url = self.session.url(&["provenance", id]);
        self.session.client.delete(url, &self.session.auth).await?;
        Ok(())
    }
}
