//! Oozie report formatters.

use clusterwatch_types::{CoordinatorAction, CoordinatorJob};

use super::{or_not_defined, Column, Table};

const ACTION_COLUMNS: [Column; 7] = [
    Column::new("Action ID", 40),
    Column::new("Status", 9),
    Column::new("Created Time", 29),
    Column::new("Nominal Time", 29),
    Column::new("Last Modified Time", 29),
    Column::new("Error Code", 10),
    Column::new("Error Message", 13),
];

const SUMMARY_RULE: &str =
    "------------------------------------------------------------------------------------";

/// A coordinator header and its recent actions, newest first.
pub fn coordinator_section(job: &CoordinatorJob, actions: &[CoordinatorAction]) -> String {
    let mut table = Table::new(ACTION_COLUMNS).framed(true);
    for action in actions {
        table.push_row(vec![
            action.id.clone(),
            or_not_defined(action.status.as_deref()),
            or_not_defined(action.created_time.as_deref()),
            or_not_defined(action.nominal_time.as_deref()),
            or_not_defined(action.last_modified_time.as_deref()),
            or_not_defined(action.error_code.as_deref()),
            or_not_defined(action.error_message.as_deref()),
        ]);
    }

    format!(
        "\n{} ({})\n{}",
        job.coord_job_name,
        job.status,
        table.render()
    )
}

/// Counters behind the closing summary of the coordinator report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorSummary {
    pub coordinators: usize,
    pub not_running: usize,
    pub latest_not_succeeded: usize,
}

impl CoordinatorSummary {
    /// Count one coordinator given its actions, newest first.
    pub fn record(&mut self, job: &CoordinatorJob, actions: &[CoordinatorAction]) {
        self.coordinators += 1;
        if !job.is_running() {
            self.not_running += 1;
        }
        if actions.first().is_some_and(|latest| !latest.succeeded()) {
            self.latest_not_succeeded += 1;
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.not_running == 0 && self.latest_not_succeeded == 0
    }

    pub fn render(&self) -> String {
        let mut out = format!("\nSummary\n{}\n", SUMMARY_RULE);

        if self.not_running != 0 {
            out.push_str(&format!(
                "WARNING: {} coordinator job(s) is not running (total of {} coordinator jobs), please investigate.\n",
                self.not_running, self.coordinators
            ));
        } else {
            out.push_str(&format!(
                "SUCCESS: All {} coordinator jobs are running.\n",
                self.coordinators
            ));
        }

        if self.latest_not_succeeded != 0 {
            out.push_str(&format!(
                "WARNING: {} latest action(s) did not complete with a status of SUCCEEDED, please investigate.\n",
                self.latest_not_succeeded
            ));
        } else {
            out.push_str("SUCCESS: All latest actions have run successfully.\n");
        }

        out.push_str(SUMMARY_RULE);
        out.push('\n');
        out
    }
}
