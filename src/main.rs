use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clusterwatch::commands::{self, ROOT_GROUP};
use clusterwatch::Settings;

#[derive(Parser, Debug)]
#[command(name = "clusterwatch")]
#[command(about = "Reports on Ambari, NiFi and Oozie clusters through their REST APIs")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long, global = true, env = "CLUSTERWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    system: System,
}

#[derive(Subcommand, Debug)]
enum System {
    /// Ambari cluster reports
    #[command(subcommand)]
    Ambari(AmbariCommand),
    /// NiFi flow reports and processor actions
    #[command(subcommand)]
    Nifi(NifiCommand),
    /// Oozie coordinator reports
    #[command(subcommand)]
    Oozie(OozieCommand),
}

impl System {
    /// Commands that watch the cancellation token and clean up before returning.
    fn handles_cancel(&self) -> bool {
        matches!(self, System::Nifi(NifiCommand::Provenance { .. }))
    }
}

#[derive(Subcommand, Debug)]
enum AmbariCommand {
    /// Alert history of every cluster
    Alerts,
    /// Components installed on every host
    Components,
}

#[derive(Subcommand, Debug)]
enum NifiCommand {
    /// Queue usage of every connection
    Connections {
        /// Process group to start from
        #[arg(short, long, default_value = ROOT_GROUP)]
        group: String,
    },
    /// Audit controller services (Hive validation query, HBase retries)
    Controllers {
        #[arg(short, long, default_value = ROOT_GROUP)]
        group: String,
    },
    /// Processor table per process group
    Processors {
        #[arg(short, long, default_value = ROOT_GROUP)]
        group: String,
    },
    /// Full JSON of one processor
    Processor { id: String },
    /// Stop processors
    Stop {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// State entries of one processor
    State { id: String },
    /// Provenance events of one processor
    Provenance {
        id: String,
        /// Maximum number of events (default: provenance.max_results)
        #[arg(long)]
        max_results: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
enum OozieCommand {
    /// Latest coordinator jobs with their recent actions
    Jobs {
        /// Coordinator owner (default: oozie.user, then the login user)
        #[arg(short, long)]
        user: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::load(args.config.as_deref())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start the async runtime")?;

    let cancel = CancellationToken::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = rt.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted, cancelling");
                on_interrupt.cancel();
            }
        });

        let handles_cancel = args.system.handles_cancel();
        let work = run(args.system, &settings, cancel.clone(), &mut out);
        if handles_cancel {
            work.await
        } else {
            commands::interruptible(work, &cancel).await
        }
    });

    out.flush()?;
    result
}

async fn run<W: Write>(
    system: System,
    settings: &Settings,
    cancel: CancellationToken,
    out: &mut W,
) -> Result<()> {
    match system {
        System::Ambari(command) => {
            let adapter = commands::ambari_adapter(settings)?;
            match command {
                AmbariCommand::Alerts => commands::ambari::alerts(&adapter, out).await,
                AmbariCommand::Components => commands::ambari::components(&adapter, out).await,
            }
        }
        System::Nifi(command) => {
            let adapter = commands::nifi_adapter(settings)?;
            let walker = commands::flow_walker(settings);
            match command {
                NifiCommand::Connections { group } => {
                    commands::nifi::connections(&adapter, &walker, &group, out).await
                }
                NifiCommand::Controllers { group } => {
                    commands::nifi::controllers(&adapter, &walker, &group, out).await
                }
                NifiCommand::Processors { group } => {
                    commands::nifi::processors(&adapter, &walker, &group, out).await
                }
                NifiCommand::Processor { id } => commands::nifi::processor(&adapter, &id, out).await,
                NifiCommand::Stop { ids } => commands::nifi::stop(&adapter, &ids, out).await,
                NifiCommand::State { id } => commands::nifi::state(&adapter, &id, out).await,
                NifiCommand::Provenance { id, max_results } => {
                    let max_results = max_results.unwrap_or(settings.provenance.max_results);
                    let policy = settings.provenance.poll_policy();
                    commands::nifi::provenance(&adapter, &id, max_results, policy, cancel, out).await
                }
            }
        }
        System::Oozie(OozieCommand::Jobs { user }) => {
            let adapter = commands::oozie_adapter(settings)?;
            let user = user.as_deref().unwrap_or_else(|| settings.oozie_user());
            commands::oozie::jobs(&adapter, user, out).await.map(|_| ())
        }
    }
}
