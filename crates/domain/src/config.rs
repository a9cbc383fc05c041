//! Configuration structures
//!
//! Every section has working defaults, so an empty file (or no file at
//! all) yields a usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub risk: RiskConfig,
    pub care: CareConfig,
    pub pool: PoolConfig,
    pub pedigree: PedigreeConfig,
}

/// Disease-risk visit recommendations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub enabled: bool,
    /// Delay between the end of one recalculation and the start of the next
    pub recompute_interval_secs: u64,
    pub initial_delay_secs: u64,
    /// Simulated duration of one risk recalculation
    pub recalculation_secs: u64,
    /// Simulated cost of composing recommendations for one pet
    pub compose_delay_millis: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recompute_interval_secs: 5,
            initial_delay_secs: 0,
            recalculation_secs: 5,
            compose_delay_millis: 0,
        }
    }
}

impl RiskConfig {
    pub fn recompute_interval(&self) -> Duration {
        Duration::from_secs(self.recompute_interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn recalculation(&self) -> Duration {
        Duration::from_secs(self.recalculation_secs)
    }

    pub fn compose_delay(&self) -> Duration {
        Duration::from_millis(self.compose_delay_millis)
    }
}

/// Care tips report built once on startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareConfig {
    pub enabled: bool,
    /// Simulated duration of composing a tip for one pet
    pub advice_delay_secs: u64,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self { enabled: true, advice_delay_secs: 5 }
    }
}

impl CareConfig {
    pub fn advice_delay(&self) -> Duration {
        Duration::from_secs(self.advice_delay_secs)
    }
}

/// Shared worker pool sizing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker slots; `None` means the available parallelism
    pub workers: Option<usize>,
    /// Extra admitted tasks waiting for a slot; `None` means unbounded
    pub max_queue: Option<usize>,
}

/// Pedigree name tracking (beta)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedigreeConfig {
    pub enabled: bool,
    pub update_interval_secs: u64,
}

impl Default for PedigreeConfig {
    fn default() -> Self {
        Self { enabled: false, update_interval_secs: 5 }
    }
}

impl PedigreeConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.risk.enabled);
        assert!(!config.pedigree.enabled);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [risk]
            recompute_interval_secs = 30

            [pool]
            workers = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.risk.recompute_interval(), Duration::from_secs(30));
        assert_eq!(config.risk.recalculation(), Duration::from_secs(5));
        assert_eq!(config.pool.workers, Some(2));
        assert_eq!(config.pool.max_queue, None);
    }
}
