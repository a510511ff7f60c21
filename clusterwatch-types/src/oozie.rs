//! Oozie Web Services API (v2) response types.

/// `GET /oozie/v2/jobs?jobtype=coordinator`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct CoordinatorJobList {
    #[cfg_attr(feature = "serde", serde(default))]
    pub coordinatorjobs: Vec<CoordinatorJob>,
    pub total: Option<u64>,
}

/// A coordinator job as listed by the jobs endpoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoordinatorJob {
    pub coord_job_name: String,
    pub coord_job_id: String,
    /// `RUNNING`, `SUCCEEDED`, `KILLED`, `SUSPENDED`, ...
    pub status: String,
}

impl CoordinatorJob {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            coord_job_name: name.into(),
            coord_job_id: id.into(),
            status: status.into(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == "RUNNING"
    }
}

/// `GET /oozie/v2/job/{coordJobId}`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct CoordinatorDetail {
    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<CoordinatorAction>,
}

/// One materialised run of a coordinator.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoordinatorAction {
    pub id: String,
    pub status: Option<String>,
    pub created_time: Option<String>,
    pub nominal_time: Option<String>,
    pub last_modified_time: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl CoordinatorAction {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("SUCCEEDED")
    }
}

/// Reduce a job listing to one job per coordinator name.
///
/// A running job replaces any earlier job with the same name and moves to
/// the end; a job in any other state is kept only if its name has not been
/// seen yet.
pub fn select_latest_coordinators(jobs: Vec<CoordinatorJob>) -> Vec<CoordinatorJob> {
    let mut selected: Vec<CoordinatorJob> = Vec::new();

    for job in jobs {
        if job.is_running() {
            selected.retain(|j| j.coord_job_name != job.coord_job_name);
            selected.push(job);
        } else if !selected
            .iter()
            .any(|j| j.coord_job_name == job.coord_job_name)
        {
            selected.push(job);
        }
    }

    selected
}
