//! Care-tips report composition

use std::sync::Arc;

use petclinic_common::pool::{join_all, WorkerPool};
use petclinic_domain::constants::{CARE_REPORT_BANNER, CARE_REPORT_SEPARATOR};
use petclinic_domain::{Owner, Result};
use tracing::{debug, info, instrument, warn};

use super::ports::{CareAdvisor, OwnerLookup, ReportSink};
use super::tasks::OwnerCareTask;

/// Builds the care-tips report by fanning out over owners and their pets
pub struct CareTipsService {
    owners: Arc<dyn OwnerLookup>,
    advisor: Arc<dyn CareAdvisor>,
    pool: WorkerPool,
    sink: Arc<dyn ReportSink>,
}

impl CareTipsService {
    /// Create a new care-tips service on top of a shared pool
    pub fn new(
        owners: Arc<dyn OwnerLookup>,
        advisor: Arc<dyn CareAdvisor>,
        pool: WorkerPool,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self { owners, advisor, pool, sink }
    }

    /// Fetch every owner, build the report and publish it
    ///
    /// # Errors
    ///
    /// Propagates lookup and report failures; nothing is published then.
    #[instrument(skip(self))]
    pub async fn compose_care_tips(&self) -> Result<String> {
        let owners = self.owners.all_owners().await?;
        let report = self.build_report(owners).await?;

        self.sink.publish(&report);
        info!("Care tips report published");
        Ok(report)
    }

    /// Build the report for the given owners
    ///
    /// Owner sections appear in input order regardless of completion order.
    /// Every owner task runs to completion before the result is returned.
    ///
    /// # Errors
    ///
    /// Fails with the first owner failure (in input order); no partial report
    /// is produced.
    pub async fn build_report(&self, owners: Vec<Owner>) -> Result<String> {
        debug!(owners = owners.len(), "Composing care tips report...");

        let mut handles = Vec::with_capacity(owners.len());
        for owner in owners {
            let task = OwnerCareTask::new(owner, self.pool.clone(), Arc::clone(&self.advisor));
            match self.pool.spawn_coordinator(task.call()) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    warn!(error = %err, "Owner task refused; aborting report");
                    handles.iter().for_each(|handle| handle.abort());
                    return Err(err.into());
                }
            }
        }

        let sections = join_all(handles)
            .await?
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        let mut report = String::from(CARE_REPORT_BANNER);
        report.push_str(&sections.join(CARE_REPORT_SEPARATOR));
        Ok(report)
    }

    /// Pool the owner and pet tasks run on
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}

impl std::fmt::Debug for CareTipsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CareTipsService").field("pool", &self.pool.metrics()).finish()
    }
}
