//! Report sink that writes to the tracing log

use petclinic_core::ReportSink;
use tracing::info;

/// Publishes reports as `info` events under the `petclinic::report` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReportSink;

impl ReportSink for TracingReportSink {
    fn publish(&self, text: &str) {
        info!(target: "petclinic::report", "{text}");
    }
}
