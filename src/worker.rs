use crate::config::AppConfig;
use crate::error::{Result, SimError};
use log::{error, info};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

const DEFAULT_STACK_SIZE: usize = 4 * 1024 * 1024;

/// Dedicated rayon pool for trial batches.
#[derive(Clone)]
pub struct TrialWorker {
    pool: Arc<ThreadPool>,
    num_threads: usize,
}

impl TrialWorker {
    /// `requested_threads == 0` picks all cores but one.
    pub fn new(requested_threads: usize) -> Result<Self> {
        let cores = available_cores();
        let num_threads = if requested_threads == 0 {
            if cores > 2 {
                cores - 1
            } else {
                cores
            }
        } else {
            requested_threads
        };
        Self::build_pool(num_threads, DEFAULT_STACK_SIZE)
    }

    pub fn new_with_config(config: &AppConfig) -> Result<Self> {
        let cores = available_cores();
        let mut num_threads = if cores > config.worker_reserve_cores {
            cores - config.worker_reserve_cores
        } else {
            1
        };
        if config.worker_max_threads > 0 && num_threads > config.worker_max_threads {
            num_threads = config.worker_max_threads;
        }
        let stack_size = if config.worker_stack_size_mb == 0 {
            DEFAULT_STACK_SIZE
        } else {
            config.worker_stack_size_mb * 1024 * 1024
        };
        Self::build_pool(num_threads, stack_size)
    }

    fn build_pool(num_threads: usize, stack_size: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("trial-worker-{}", i))
            .stack_size(stack_size)
            .panic_handler(|err| {
                error!("Worker thread panicked: {:?}", err);
            })
            .build()
            .map_err(|e| SimError::Worker(e.to_string()))?;

        info!("Worker initialized with {} threads.", num_threads);

        Ok(Self {
            pool: Arc::new(pool),
            num_threads,
        })
    }

    /// Runs `f` inside the pool, turning a panic into `SimError::Worker`.
    pub fn execute<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        let result = self
            .pool
            .install(|| panic::catch_unwind(AssertUnwindSafe(f)));

        result.map_err(|err| {
            let msg = if let Some(s) = err.downcast_ref::<&str>() {
                format!("Task panicked: {}", s)
            } else if let Some(s) = err.downcast_ref::<String>() {
                format!("Task panicked: {}", s)
            } else {
                "Task panicked with unknown error".to_string()
            };
            SimError::Worker(msg)
        })
    }

    pub fn thread_count(&self) -> usize {
        self.num_threads
    }
}

fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_thread_count_is_honoured() {
        let worker = TrialWorker::new(2).unwrap();
        assert_eq!(worker.thread_count(), 2);
        assert_eq!(worker.execute(|| rayon::current_num_threads()).unwrap(), 2);
    }

    #[test]
    fn config_caps_thread_count() {
        let config = AppConfig {
            worker_max_threads: 1,
            ..AppConfig::default()
        };
        let worker = TrialWorker::new_with_config(&config).unwrap();
        assert_eq!(worker.thread_count(), 1);
    }

    #[test]
    fn panics_become_errors() {
        let worker = TrialWorker::new(1).unwrap();
        let result: Result<()> = worker.execute(|| panic!("boom"));
        match result {
            Err(SimError::Worker(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected worker error, got {:?}", other),
        }
    }
}
