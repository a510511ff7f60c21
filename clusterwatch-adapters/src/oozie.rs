//! Oozie adapter using the Oozie Web Services API (v2).

use tracing::debug;

use clusterwatch_types::oozie::{
    CoordinatorAction, CoordinatorDetail, CoordinatorJob, CoordinatorJobList,
};

use crate::auth::{Auth, Credentials};
use crate::client::HttpJsonClient;
use crate::AdapterError;

/// Page size for the coordinator job listing.
pub const JOB_LIST_LEN: usize = 500;

/// Number of most recent actions fetched per coordinator.
pub const ACTIONS_PER_COORDINATOR: usize = 5;

/// Oozie adapter.
#[derive(Debug)]
pub struct OozieAdapter {
    client: HttpJsonClient,
    auth: Auth,
}

impl OozieAdapter {
    pub fn new(client: HttpJsonClient, credentials: Credentials) -> Self {
        Self {
            client,
            auth: Auth::Basic(credentials),
        }
    }

    /// Coordinator jobs submitted by `user`, as listed by the server.
    pub async fn coordinator_jobs(&self, user: &str) -> Result<Vec<CoordinatorJob>, AdapterError> {
        let filter = format!("user={}", user);
        let len = JOB_LIST_LEN.to_string();
        let url = self.client.url_with_query(
            &["oozie", "v2", "jobs"],
            &[
                ("jobtype", "coordinator"),
                ("filter", filter.as_str()),
                ("len", len.as_str()),
                ("timezone", "GMT"),
            ],
        );
        let list: CoordinatorJobList = self.client.get_as(url, &self.auth).await?;
        debug!(user, count = list.coordinatorjobs.len(), "fetched coordinator jobs");
        Ok(list.coordinatorjobs)
    }

    /// The most recent actions of one coordinator, newest first.
    pub async fn coordinator_actions(
        &self,
        job_id: &str,
    ) -> Result<Vec<CoordinatorAction>, AdapterError> {
        let len = ACTIONS_PER_COORDINATOR.to_string();
        let url = self.client.url_with_query(
            &["oozie", "v2", "job", job_id],
            &[("len", len.as_str()), ("timezone", "GMT"), ("order", "desc")],
        );
        let detail: CoordinatorDetail = self.client.get_as(url, &self.auth).await?;
        Ok(detail.actions)
    }
}
