use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use clusterwatch_adapters::oozie::OozieAdapter;
use clusterwatch_types::oozie::select_latest_coordinators;

use crate::report::oozie::{coordinator_section, CoordinatorSummary};

/// Latest coordinator jobs of `user`, their recent actions and a summary.
pub async fn jobs<W: Write>(
    adapter: &OozieAdapter,
    user: &str,
    out: &mut W,
) -> Result<CoordinatorSummary> {
    let listed = adapter
        .coordinator_jobs(user)
        .await
        .with_context(|| format!("cannot list coordinator jobs of {}", user))?;
    let coordinators = select_latest_coordinators(listed);
    info!(user, coordinators = coordinators.len(), "coordinator report");

    let mut summary = CoordinatorSummary::default();
    for job in &coordinators {
        let actions = adapter
            .coordinator_actions(&job.coord_job_id)
            .await
            .with_context(|| format!("cannot read actions of {}", job.coord_job_id))?;

        out.write_all(coordinator_section(job, &actions).as_bytes())?;
        summary.record(job, &actions);
    }

    out.write_all(summary.render().as_bytes())?;
    Ok(summary)
}
