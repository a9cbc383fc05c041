//! Worker pool configuration

use std::num::NonZeroUsize;

use petclinic_domain::PoolConfig;

use super::error::{PoolError, PoolResult};

/// Configuration for [`WorkerPool`](super::WorkerPool) sizing and backpressure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Maximum number of tasks running at once
    pub workers: usize,
    /// Admitted tasks allowed to wait for a slot; `None` means unbounded
    pub max_queue: Option<usize>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { workers: available_parallelism(), max_queue: None }
    }
}

impl WorkerPoolConfig {
    /// Create a new configuration builder
    pub fn builder() -> WorkerPoolConfigBuilder {
        WorkerPoolConfigBuilder::new()
    }

    /// Resolve application settings, falling back to the available parallelism
    pub fn from_settings(settings: &PoolConfig) -> PoolResult<Self> {
        let config = Self {
            workers: settings.workers.unwrap_or_else(available_parallelism),
            max_queue: settings.max_queue,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> PoolResult<()> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig("workers must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Upper bound on admitted-but-unfinished tasks, if any
    pub fn capacity(&self) -> Option<usize> {
        self.max_queue.map(|queue| self.workers + queue)
    }
}

/// Builder for WorkerPoolConfig
#[derive(Debug, Default)]
pub struct WorkerPoolConfigBuilder {
    config: WorkerPoolConfig,
}

impl WorkerPoolConfigBuilder {
    pub fn new() -> Self {
        Self { config: WorkerPoolConfig::default() }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn max_queue(mut self, max: usize) -> Self {
        self.config.max_queue = Some(max);
        self
    }

    pub fn unbounded_queue(mut self) -> Self {
        self.config.max_queue = None;
        self
    }

    pub fn build(self) -> PoolResult<WorkerPoolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_zero_workers() {
        let result = WorkerPoolConfig::builder().workers(0).build();
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn test_capacity_only_when_bounded() {
        let bounded = WorkerPoolConfig::builder().workers(2).max_queue(3).build().unwrap();
        assert_eq!(bounded.capacity(), Some(5));

        let unbounded = WorkerPoolConfig::builder().workers(2).unbounded_queue().build().unwrap();
        assert_eq!(unbounded.capacity(), None);
    }

    #[test]
    fn test_from_settings_defaults_workers() {
        let config = WorkerPoolConfig::from_settings(&PoolConfig::default()).unwrap();
        assert!(config.workers >= 1);
        assert_eq!(config.max_queue, None);
    }
}
