//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Load the first config file found by [`find_config_file`], or start
//!    from defaults when there is none
//! 2. Apply environment variable overrides on top
//!
//! Every setting has a default, so no variable or file is required.
//!
//! ## Environment Variables
//! - `PETCLINIC_RISK_ENABLED`: Whether risk recalculation is scheduled
//! - `PETCLINIC_RISK_INTERVAL`: Delay between recalculations in seconds
//! - `PETCLINIC_CARE_ENABLED`: Whether the care report is built on startup
//! - `PETCLINIC_POOL_WORKERS`: Worker slots in the shared pool
//! - `PETCLINIC_POOL_MAX_QUEUE`: Pending task limit (unbounded when unset)
//! - `PETCLINIC_PEDIGREE_ENABLED`: Whether pedigree updates are scheduled
//!
//! ## File Locations
//! The loader searches `./petclinic.toml`, `./petclinic.json`, `./config.toml`
//! and `./config.json` in the working directory, then the same names next to
//! the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use petclinic_domain::{ClinicError, Config, Result};

const CANDIDATE_NAMES: [&str; 4] = ["petclinic.toml", "petclinic.json", "config.toml", "config.json"];

/// Load configuration from the first config file found (or defaults) plus environment
///
/// # Errors
/// Returns `ClinicError::Config` if a found file cannot be read or parsed,
/// or an environment variable has an invalid value.
pub fn load() -> Result<Config> {
    let config = match find_config_file() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(config)
}

/// Load configuration from defaults and environment variables only
///
/// # Errors
/// Returns `ClinicError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    apply_env_overrides(Config::default())
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. Format is detected by
/// file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ClinicError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClinicError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            ClinicError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ClinicError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Apply the `PETCLINIC_*` environment variables on top of `config`
///
/// Unset variables leave the corresponding setting untouched.
///
/// # Errors
/// Returns `ClinicError::Config` if a variable has an invalid value.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Some(enabled) = env_bool("PETCLINIC_RISK_ENABLED")? {
        config.risk.enabled = enabled;
    }
    if let Some(secs) = env_parse::<u64>("PETCLINIC_RISK_INTERVAL")? {
        config.risk.recompute_interval_secs = secs;
    }
    if let Some(enabled) = env_bool("PETCLINIC_CARE_ENABLED")? {
        config.care.enabled = enabled;
    }
    if let Some(workers) = env_parse::<usize>("PETCLINIC_POOL_WORKERS")? {
        config.pool.workers = Some(workers);
    }
    if let Some(max_queue) = env_parse::<usize>("PETCLINIC_POOL_MAX_QUEUE")? {
        config.pool.max_queue = Some(max_queue);
    }
    if let Some(enabled) = env_bool("PETCLINIC_PEDIGREE_ENABLED")? {
        config.pedigree.enabled = enabled;
    }
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClinicError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClinicError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ClinicError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CANDIDATE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Parse a numeric environment variable, `None` when unset
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ClinicError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Anything else is a configuration error rather than `false`.
fn env_bool(key: &str) -> Result<Option<bool>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ClinicError::Config(format!("Invalid value for {}: expected a boolean, got '{}'", key, raw))),
    }
}
