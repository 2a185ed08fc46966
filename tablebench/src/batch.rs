use std::io::Write as _;

use anyhow::Context as _;
use clap::Parser as _;
use tablebench_metrics::MetricSet;

use crate::backend::BackendFactory;
use crate::cli::{BatchArgs, Cli, Command, RunArgs};
use crate::run::execute;
use crate::run_error::RunError;

/// Parsed batch script: exported metric names and the extra flags of every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchScript {
    pub columns: Vec<String>,
    pub runs: Vec<Vec<String>>,
}

pub fn parse_script(text: &str) -> anyhow::Result<BatchScript> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines.next().context("batch script is empty")?;
    let columns: Vec<String> = header
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    anyhow::ensure!(!columns.is_empty(), "batch script names no metrics");

    let runs = lines
        .map(|line| {
            line.split(';')
                .flat_map(str::split_whitespace)
                .map(str::to_string)
                .collect()
        })
        .collect();

    Ok(BatchScript { columns, runs })
}

pub fn run(args: BatchArgs) -> Result<(), RunError> {
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read batch script: {}", args.script.display()))
        .map_err(RunError::InvalidInput)?;
    let script = parse_script(&text).map_err(RunError::InvalidInput)?;

    // Fail on bad shared flags before the first run starts.
    run_args(&args, &[])?;
    let parsed = script
        .runs
        .iter()
        .enumerate()
        .map(|(idx, flags)| {
            run_args(&args, flags).map_err(|e| {
                RunError::InvalidInput(anyhow::anyhow!("batch line {}: {e}", idx + 2))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut backends = BackendFactory::default();
    let mut rows = Vec::with_capacity(parsed.len());
    for (idx, run) in parsed.iter().enumerate() {
        tracing::info!(
            run = idx + 1,
            total = parsed.len(),
            workload = %run.workload,
            "batch run"
        );
        let metrics = execute(&mut backends, run)?;
        rows.push(select_columns(&script.columns, &metrics));
    }

    let csv = render_csv(&script.columns, &rows);
    let mut out = std::io::stdout().lock();
    out.write_all(csv.as_bytes())
        .and_then(|()| out.flush())
        .context("failed to write batch results")
        .map_err(RunError::RuntimeError)
}

fn run_args(args: &BatchArgs, extra: &[String]) -> Result<RunArgs, RunError> {
    let argv = ["tablebench", "run", args.endpoint.as_str()]
        .into_iter()
        .map(str::to_string)
        .chain(args.flags.iter().cloned())
        .chain(extra.iter().cloned());

    match Cli::try_parse_from(argv) {
        Ok(Cli {
            command: Command::Run(run),
        }) => Ok(run),
        Ok(_) => Err(RunError::InvalidInput(anyhow::anyhow!(
            "batch flags must describe a run"
        ))),
        Err(err) => Err(RunError::InvalidInput(anyhow::anyhow!(
            "{}",
            err.render().to_string().trim_end()
        ))),
    }
}

/// Picks the values of `columns` from `metrics`; missing ones are logged and read as 0.
fn select_columns(columns: &[String], metrics: &MetricSet) -> Vec<f64> {
    let row = columns
        .iter()
        .map(|name| {
            metrics.get(name).unwrap_or_else(|| {
                tracing::warn!(metric = %name, "metric missing from run, writing 0");
                0.0
            })
        })
        .collect();

    for m in metrics {
        if !columns.iter().any(|c| c == &m.name) {
            tracing::debug!(metric = %m.name, "metric unused");
        }
    }

    row
}

pub(crate) fn render_csv(columns: &[String], rows: &[Vec<f64>]) -> String {
    let mut s = columns.join(";");
    s.push('\n');
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| format_number(*v)).collect();
        s.push_str(&cells.join(";"));
        s.push('\n');
    }
    s
}

/// At most five fractional digits, trailing zeros dropped. `NaN` is an empty cell.
pub(crate) fn format_number(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }

    let s = format!("{v:.5}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        return "0".to_string();
    }
    s.to_string()
}
