//! Runtime settings.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. an optional TOML file passed with `--config`
//! 3. environment variables prefixed with `CLUSTERWATCH_`, using `__` between
//!    section and key (e.g. `CLUSTERWATCH_NIFI__ENDPOINT`)
//!
//! Credentials come from `CLUSTERWATCH_USER` and `CLUSTERWATCH_PASSWORD`
//! (or `user` / `password` at the top of the file).
//!
//! ```toml
//! [nifi]
//! endpoint = "https://nifi.example.com:9091"
//! cache_token = true
//!
//! [tls]
//! ca_bundle = "/etc/pki/cluster-bundle.pem"
//!
//! [provenance]
//! max_wait = "2m"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Deserializer};

use clusterwatch_adapters::{Credentials, PollPolicy};

use crate::duration::parse_duration;

const ENV_PREFIX: &str = "CLUSTERWATCH";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    user: Option<String>,
    password: Option<String>,
    pub ambari: AmbariSettings,
    pub nifi: NifiSettings,
    pub oozie: OozieSettings,
    #[serde(default)]
    pub tls: TlsSettings,
    pub http: HttpSettings,
    pub walk: WalkSettings,
    pub provenance: ProvenanceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmbariSettings {
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NifiSettings {
    pub endpoint: String,
    /// Reuse one token for the whole run.
    pub cache_token: bool,
    /// Skip certificate verification for NiFi only.
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OozieSettings {
    pub endpoint: String,
    /// Owner of the coordinators to report; defaults to the login user.
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsSettings {
    pub ca_bundle: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    #[serde(deserialize_with = "duration_from_str")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalkSettings {
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvenanceSettings {
    pub max_results: u32,
    #[serde(deserialize_with = "duration_from_str")]
    pub initial_delay: Duration,
    #[serde(deserialize_with = "duration_from_str")]
    pub max_delay: Duration,
    #[serde(deserialize_with = "duration_from_str")]
    pub max_wait: Duration,
}

impl ProvenanceSettings {
    // Delays are non-zero and never shrink; the wait leaves room for a poll.
    fn validate(&self) -> Result<()> {
        if self.initial_delay.is_zero() {
            bail!("provenance.initial_delay must be greater than zero");
        }
        if self.max_delay < self.initial_delay {
            bail!("provenance.max_delay must not be shorter than provenance.initial_delay");
        }
        if self.max_wait.is_zero() {
            bail!("provenance.max_wait must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            max_wait: self.max_wait,
        }
    }
}

fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

/// Builder preloaded with the built-in defaults.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("ambari.endpoint", "https://localhost:8443")?
        .set_default("nifi.endpoint", "https://localhost:9091")?
        .set_default("nifi.cache_token", false)?
        .set_default("nifi.accept_invalid_certs", false)?
        .set_default("oozie.endpoint", "https://localhost:11443")?
        .set_default("http.timeout", "30s")?
        .set_default("walk.max_depth", 64)?
        .set_default("provenance.max_results", 1000)?
        .set_default("provenance.initial_delay", "250ms")?
        .set_default("provenance.max_delay", "2s")?
        .set_default("provenance.max_wait", "60s")?)
}

// Values stay strings here; numeric and boolean fields are converted when
// deserialized, so credentials such as `007` keep their exact text.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(environment())
            .build()
            .context("failed to load configuration")?;
        Self::from_config(config)
    }

    /// Deserialize and validate an already built configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config
            .try_deserialize()
            .context("invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let missing = |v: &Option<String>| v.as_deref().map_or(true, str::is_empty);
        if missing(&self.user) || missing(&self.password) {
            bail!(
                "credentials missing: set {0}_USER and {0}_PASSWORD",
                ENV_PREFIX
            );
        }
        self.provenance.validate()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.user.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }

    /// Coordinator owner: the configured Oozie user or the login user.
    pub fn oozie_user(&self) -> &str {
        self.oozie
            .user
            .as_deref()
            .or(self.user.as_deref())
            .unwrap_or_default()
    }
}
