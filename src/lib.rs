//! # clusterwatch
//!
//! Command-line reports for Hadoop-style clusters, built on the Ambari, NiFi
//! and Oozie REST APIs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────────────────┐    ┌──────────┐
//! │  config  │───▶│ commands │───▶│ clusterwatch-adapters │───▶│ REST API │
//! │(Settings)│    │          │    │ (client, walker, ...) │    │          │
//! └──────────┘    └────┬─────┘    └───────────────────────┘    └──────────┘
//!                      │
//!                      ▼
//!                 ┌──────────┐
//!                 │  report  │──▶ stdout
//!                 │  (text)  │
//!                 └──────────┘
//! ```
//!
//! - **[`config`]**: layered [`Settings`] (defaults, TOML file, environment)
//! - **[`commands`]**: one async function per report; each opens its own
//!   session, writes to the given writer and stops at the first error
//! - **[`report`]**: pure formatters for tables and field blocks
//! - **[`duration`]**: duration strings used in the settings
//!
//! ## Usage
//!
//! ```bash
//! export CLUSTERWATCH_USER=admin CLUSTERWATCH_PASSWORD=secret
//!
//! clusterwatch ambari alerts
//! clusterwatch nifi processors --group root
//! clusterwatch nifi stop 9c37671e-cb70-39bf-ae10-14245caec181
//! clusterwatch --config prod.toml oozie jobs --user etl
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use clusterwatch::{commands, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load(None)?;
//! let adapter = commands::oozie_adapter(&settings)?;
//!
//! let mut out = Vec::new();
//! let summary = commands::oozie::jobs(&adapter, "etl", &mut out).await?;
//! println!("{} coordinators", summary.coordinators);
//! # Ok::<(), anyhow::Error>(())
//! # }).unwrap();
//! ```

pub mod commands;
pub mod config;
pub mod duration;
pub mod report;

pub use config::Settings;
