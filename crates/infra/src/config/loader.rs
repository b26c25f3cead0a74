//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `LAUNDER_DB_PATH` is set, configuration comes from the environment
//! 2. Otherwise probes multiple paths for a config file
//! 3. Without a file, built-in defaults are used
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LAUNDER_DB_PATH`: Database file path (selects environment loading)
//! - `LAUNDER_DB_POOL_SIZE`: Connection pool size
//! - `LAUNDER_DEFAULT_TIMEZONE`: Zone for events stored without one
//! - `LAUNDER_RANDOM_DRAW`: `per_endpoint` or `shared`
//! - `LAUNDER_TOKEN_SECRET`: Secret for settings request tokens
//! - `LAUNDER_SCHEDULE_RECURRENCE`: `hourly`, `twicedaily` or `daily`
//! - `LAUNDER_SCHEDULE_DELAY_SECS`: Delay before the first run
//! - `LAUNDER_JOB_TIMEOUT_SECS`: Timeout for one laundry run
//! - `LAUNDER_RUN_ON_START`: Run one pass at startup (true/false)
//! - `LAUNDER_LOG_LEVEL`: Default log filter
//! - `LAUNDER_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./launder.json` or `./launder.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use launder_domain::{Config, LaunderError, Result};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `LaunderError::Config` if a selected source is malformed.
pub fn load() -> Result<Config> {
    if std::env::var_os("LAUNDER_DB_PATH").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `LAUNDER_DB_PATH` is required; every other variable falls back to its
/// default when unset.
///
/// # Errors
/// Returns `LaunderError::Config` if the database path is missing or a
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("LAUNDER_DB_PATH")?;
    if let Some(pool_size) = env_parse::<u32>("LAUNDER_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }

    if let Ok(timezone) = std::env::var("LAUNDER_DEFAULT_TIMEZONE") {
        config.laundry.default_timezone = timezone;
    }
    if let Some(policy) = env_parse("LAUNDER_RANDOM_DRAW")? {
        config.laundry.random_draw = policy;
    }
    config.laundry.token_secret = std::env::var("LAUNDER_TOKEN_SECRET").ok();

    if let Some(recurrence) = env_parse("LAUNDER_SCHEDULE_RECURRENCE")? {
        config.scheduler.recurrence = recurrence;
    }
    if let Some(delay) = env_parse::<u64>("LAUNDER_SCHEDULE_DELAY_SECS")? {
        config.scheduler.initial_delay_seconds = delay;
    }
    if let Some(timeout) = env_parse::<u64>("LAUNDER_JOB_TIMEOUT_SECS")? {
        config.scheduler.job_timeout_seconds = timeout;
    }
    config.scheduler.run_on_start = env_bool("LAUNDER_RUN_ON_START", false);

    if let Ok(level) = std::env::var("LAUNDER_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("LAUNDER_LOG_JSON", false);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LaunderError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LaunderError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LaunderError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LaunderError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LaunderError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LaunderError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LaunderError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(config_candidates(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(config_candidates(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn config_candidates(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("launder.json"),
        dir.join("launder.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `LaunderError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LaunderError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `LaunderError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| LaunderError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
