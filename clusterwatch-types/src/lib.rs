//! # clusterwatch-types
//!
//! Response types for the cluster-management REST APIs queried by
//! clusterwatch: Ambari, NiFi and Oozie.
//!
//! ## Design Goals
//!
//! - **Lenient decoding**: every field a report prints but a server may omit
//!   is an `Option`, so a missing field becomes a placeholder in the report
//!   rather than a failed request
//! - **Optional serialization**: enable the `serde` feature to derive
//!   `Deserialize` for the response envelopes
//! - **No I/O**: these are plain data types, the HTTP side lives in
//!   `clusterwatch-adapters`
//!
//! ## Features
//!
//! - `serde`: `Deserialize` implementations matching the JSON the servers send
//!
//! ## Example
//!
//! ```rust
//! use clusterwatch_types::oozie::{select_latest_coordinators, CoordinatorJob};
//!
//! let jobs = vec![
//!     CoordinatorJob::new("ingest", "0001-C", "KILLED"),
//!     CoordinatorJob::new("ingest", "0002-C", "RUNNING"),
//! ];
//!
//! let latest = select_latest_coordinators(jobs);
//! assert_eq!(latest.len(), 1);
//! assert_eq!(latest[0].coord_job_id, "0002-C");
//! ```

pub mod ambari;
pub mod nifi;
pub mod oozie;

pub use ambari::{AlertHistory, ClusterSummary, HostComponent, HostSummary, ItemList};
pub use nifi::{
    ConnectionEntity, ControllerServiceEntity, ProcessGroupFlowEntity, ProcessorEntity,
    ProvenanceEvent, Revision, StateEntry,
};
pub use oozie::{CoordinatorAction, CoordinatorJob};
