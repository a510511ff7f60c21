//! # clusterwatch-adapters
//!
//! Clients for cluster-management REST APIs, and the building blocks they
//! share.
//!
//! The core is always compiled:
//!
//! - [`HttpJsonClient`] performs authenticated JSON requests and treats any
//!   status other than 200/201 as an error
//! - [`TokenProvider`] exchanges NiFi credentials for a bearer token
//! - [`FlowWalker`] visits a remote process-group tree depth first
//! - [`QueryPoller`] drives a submit/poll/delete query to completion
//!
//! ## Supported Systems
//!
//! - **Ambari** (`ambari` feature) - clusters, alert history, host components
//! - **NiFi** (`nifi` feature) - flows, controller services, processors,
//!   processor state, provenance and stopping processors
//! - **Oozie** (`oozie` feature) - coordinator jobs and their recent actions
//!
//! ## Quick Start (NiFi)
//!
//! ```rust,ignore
//! use clusterwatch_adapters::nifi::NifiAdapter;
//! use clusterwatch_adapters::{Credentials, HttpJsonClient, PollPolicy, QueryPoller};
//! use clusterwatch_adapters::nifi::ProvenanceQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpJsonClient::builder()
//!         .endpoint("https://nifi.example.com:9091")
//!         .build()?;
//!     let adapter = NifiAdapter::new(client, Credentials::new("admin", "secret"));
//!
//!     let session = adapter.session().await?;
//!     let query = session.provenance_query("0a1b2c3d", 1000);
//!     let events = QueryPoller::new(PollPolicy::default())
//!         .run_with(&query, ProvenanceQuery::events)
//!         .await?;
//!
//!     println!("{} provenance events", events.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod poller;
pub mod token;
pub mod walker;

#[cfg(feature = "ambari")]
pub mod ambari;

#[cfg(feature = "nifi")]
pub mod nifi;

#[cfg(feature = "oozie")]
pub mod oozie;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use auth::{Auth, BearerToken, Credentials};
pub use client::{HttpJsonClient, HttpJsonClientBuilder};
pub use error::AdapterError;
pub use poller::{AsyncQuery, PollPolicy, QueryPoller, QueryStatus};
pub use token::TokenProvider;
pub use walker::{FlowNode, FlowSource, FlowVisitor, FlowWalker, WalkStats};

// Re-export types for convenience
pub use clusterwatch_types::{
    AlertHistory, ConnectionEntity, ControllerServiceEntity, CoordinatorAction, CoordinatorJob,
    HostComponent, ProcessorEntity, ProvenanceEvent, StateEntry,
};
