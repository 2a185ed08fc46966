use std::io::Write as _;

use tablebench_core::WorkloadKind;
use tablebench_metrics::MetricSet;

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_summary(&self, workload: WorkloadKind, metrics: &MetricSet) -> anyhow::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(render(workload, metrics).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

pub(crate) fn render(workload: WorkloadKind, metrics: &MetricSet) -> String {
    let width = metrics.iter().map(|m| m.name.len()).max().unwrap_or(0);

    let mut s = format!("workload: {workload}\n\n");
    for m in metrics {
        s.push_str(&format!("{:<width$}  {}\n", m.name, format_value(m.value)));
    }
    s
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "-".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{v:.0}");
    }
    format!("{v:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_aligns_names_and_formats_values() {
        let metrics: MetricSet = [
            ("LOAD_TOTAL_COUNT", 4.0),
            ("LOAD_AVG_MS", 1.23456),
            ("X", f64::NAN),
        ]
        .into_iter()
        .map(|(n, v)| tablebench_metrics::Metric::new(n, v))
        .collect();

        let s = render(WorkloadKind::Load, &metrics);
        assert_eq!(
            s,
            "workload: load\n\nLOAD_TOTAL_COUNT  4\nLOAD_AVG_MS       1.235\nX                 -\n"
        );
    }
}
