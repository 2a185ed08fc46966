use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tablebench_core::{RunConfig, Storage};
use tablebench_memstore::{BackendVersion, MemStore, MemTables, SCHEME};

use crate::run_error::RunError;

/// Backend client settings that are not part of the workload config.
#[derive(Debug, Clone, Copy)]
pub struct BackendOptions {
    pub version: BackendVersion,
    pub latency: Option<Duration>,
}

/// Builds one storage client per run.
///
/// Bundled-backend data lives as long as the factory, keyed by endpoint, so consecutive
/// runs against the same endpoint see each other's writes.
#[derive(Debug, Default)]
pub struct BackendFactory {
    memory: HashMap<String, MemTables>,
}

impl BackendFactory {
    pub fn create_storage(
        &mut self,
        cfg: &RunConfig,
        opts: BackendOptions,
    ) -> Result<Arc<dyn Storage>, RunError> {
        if cfg.endpoint.starts_with(SCHEME) {
            let tables = self.memory.entry(cfg.endpoint.clone()).or_default().clone();
            let store = MemStore::builder()
                .version(opts.version)
                .table_name(cfg.table_name.clone())
                .threads(cfg.threads)
                .latency(opts.latency)
                .tables(tables)
                .build();
            return Ok(Arc::new(store));
        }

        Err(RunError::InvalidInput(anyhow::anyhow!(
            "unsupported endpoint `{}` (expected {SCHEME}<name>)",
            cfg.endpoint
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> BackendOptions {
        BackendOptions {
            version: BackendVersion::V2,
            latency: None,
        }
    }

    #[test]
    fn memory_scheme_selects_bundled_backend() {
        let cfg = RunConfig {
            endpoint: "memory://local".to_string(),
            ..RunConfig::default()
        };

        let storage = BackendFactory::default()
            .create_storage(&cfg, opts())
            .unwrap_or_else(|e| panic!("storage: {e}"));
        assert_eq!(storage.name(), "memstore-v2");
    }

    #[test]
    fn unknown_scheme_is_invalid_input() {
        let cfg = RunConfig {
            endpoint: "grpc://localhost:2136".to_string(),
            ..RunConfig::default()
        };

        let res = BackendFactory::default().create_storage(&cfg, opts());
        assert!(matches!(res, Err(RunError::InvalidInput(_))));
    }
}
