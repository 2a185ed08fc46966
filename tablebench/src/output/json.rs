use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write as _;

use tablebench_core::WorkloadKind;
use tablebench_metrics::MetricSet;

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_summary(&self, workload: WorkloadKind, metrics: &MetricSet) -> anyhow::Result<()> {
        let line = build_summary_line(workload, metrics);
        emit_json_line(&line)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummaryLine {
    pub kind: &'static str,
    pub workload: String,
    /// Sentinel `NaN` values become `null`.
    pub metrics: BTreeMap<String, Option<f64>>,
}

pub(crate) fn build_summary_line(workload: WorkloadKind, metrics: &MetricSet) -> JsonSummaryLine {
    JsonSummaryLine {
        kind: "summary",
        workload: workload.to_string(),
        metrics: metrics
            .iter()
            .map(|m| (m.name.clone(), m.value.is_finite().then_some(m.value)))
            .collect(),
    }
}

fn emit_json_line<T: Serialize>(line: &T) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, line)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
