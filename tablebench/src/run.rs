use tablebench_core::run_workload;
use tablebench_metrics::MetricSet;

use crate::backend::{BackendFactory, BackendOptions};
use crate::cli::RunArgs;
use crate::output;
use crate::run_error::RunError;

pub fn run(args: RunArgs) -> Result<(), RunError> {
    let out = output::formatter(args.output);
    let mut backends = BackendFactory::default();

    let metrics = execute(&mut backends, &args)?;
    out.print_summary(args.workload, &metrics)
        .map_err(RunError::RuntimeError)
}

/// Runs one workload against a fresh client from `backends`.
pub(crate) fn execute(backends: &mut BackendFactory, args: &RunArgs) -> Result<MetricSet, RunError> {
    let cfg = args.options.run_config(&args.endpoint);
    let storage = backends.create_storage(
        &cfg,
        BackendOptions {
            version: args.options.backend_version(),
            latency: args.options.backend_latency,
        },
    )?;

    tracing::info!(
        workload = %args.workload,
        endpoint = %cfg.endpoint,
        backend = storage.name(),
        threads = cfg.threads,
        "start workload"
    );

    let metrics = run_workload(args.workload, cfg, storage)?;
    tracing::info!(workload = %args.workload, metrics = metrics.len(), "workload finished");
    Ok(metrics)
}
