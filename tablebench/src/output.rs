use tablebench_core::WorkloadKind;
use tablebench_metrics::MetricSet;

use crate::cli::OutputFormat;

mod human;
mod json;

pub(crate) trait OutputFormatter: Send + Sync {
    fn print_summary(&self, workload: WorkloadKind, metrics: &MetricSet) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
