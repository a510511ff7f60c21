//! Report commands.
//!
//! Each command is one top-level operation: it talks to one system, writes
//! its report to the given writer and stops at the first error.

pub mod ambari;
pub mod nifi;
pub mod oozie;

use std::future::Future;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use clusterwatch_adapters::ambari::AmbariAdapter;
use clusterwatch_adapters::nifi::NifiAdapter;
use clusterwatch_adapters::oozie::OozieAdapter;
use clusterwatch_adapters::{AdapterError, FlowWalker, HttpJsonClient};

use crate::config::Settings;

/// Process group a NiFi walk starts from when none is given.
pub const ROOT_GROUP: &str = "root";

fn http_client(
    settings: &Settings,
    endpoint: &str,
    accept_invalid_certs: bool,
) -> Result<HttpJsonClient> {
    let mut builder = HttpJsonClient::builder()
        .endpoint(endpoint)
        .timeout(settings.http.timeout)
        .accept_invalid_certs(accept_invalid_certs);
    if let Some(bundle) = &settings.tls.ca_bundle {
        builder = builder.ca_bundle(bundle);
    }
    builder
        .build()
        .with_context(|| format!("cannot create HTTP client for {}", endpoint))
}

pub fn ambari_adapter(settings: &Settings) -> Result<AmbariAdapter> {
    let client = http_client(settings, &settings.ambari.endpoint, false)?;
    Ok(AmbariAdapter::new(client, settings.credentials()))
}

pub fn nifi_adapter(settings: &Settings) -> Result<NifiAdapter> {
    let client = http_client(
        settings,
        &settings.nifi.endpoint,
        settings.nifi.accept_invalid_certs,
    )?;
    Ok(NifiAdapter::new(client, settings.credentials()).with_token_caching(settings.nifi.cache_token))
}

pub fn oozie_adapter(settings: &Settings) -> Result<OozieAdapter> {
    let client = http_client(settings, &settings.oozie.endpoint, false)?;
    Ok(OozieAdapter::new(client, settings.credentials()))
}

pub fn flow_walker(settings: &Settings) -> FlowWalker {
    FlowWalker::new(settings.walk.max_depth)
}

/// Run `work` until it completes or `cancel` fires.
///
/// On cancellation `work` is dropped mid-flight and
/// [`AdapterError::Cancelled`] is returned. Commands that must clean up
/// server-side state watch the token themselves instead.
pub async fn interruptible<T>(
    work: impl Future<Output = Result<T>>,
    cancel: &CancellationToken,
) -> Result<T> {
    tokio::select! {
        biased;
        result = work => result,
        _ = cancel.cancelled() => Err(AdapterError::Cancelled.into()),
    }
}
