//! Configuration loading and representation.
//!
//! Everything comes from environment variables with a default each; the
//! binary may load a `.env` file first. A value that does not parse is
//! reported and replaced by its default.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use hris_observability::LogFormat;

use crate::models::FileModelStore;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MODEL_DIR: &str = "ml_models";
pub const DEFAULT_PAYROLL_MODEL_FILE: &str = "payroll_risk_model.json";
pub const DEFAULT_ATTRITION_MODEL_FILE: &str = "attrition_model.json";

#[derive(Debug, Clone, PartialEq)]
pub struct HrisConfig {
    pub bind_addr: SocketAddr,
    pub model_dir: PathBuf,
    pub payroll_model_file: String,
    pub attrition_model_file: String,
    /// Ignore persisted artifacts at startup.
    pub force_retrain: bool,
    /// JSONL trigger log; `None` keeps triggers in memory.
    pub trigger_log: Option<PathBuf>,
    pub seed_sample_data: bool,
    pub log_format: LogFormat,
}

impl Default for HrisConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            payroll_model_file: DEFAULT_PAYROLL_MODEL_FILE.to_string(),
            attrition_model_file: DEFAULT_ATTRITION_MODEL_FILE.to_string(),
            force_retrain: false,
            trigger_log: None,
            seed_sample_data: true,
            log_format: LogFormat::Json,
        }
    }
}

impl HrisConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (tests use a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            bind_addr: parsed(&lookup, "HRIS_BIND_ADDR", defaults.bind_addr),
            model_dir: text("HRIS_MODEL_DIR").map(PathBuf::from).unwrap_or(defaults.model_dir),
            payroll_model_file: text("HRIS_PAYROLL_MODEL_FILE").unwrap_or(defaults.payroll_model_file),
            attrition_model_file: text("HRIS_ATTRITION_MODEL_FILE").unwrap_or(defaults.attrition_model_file),
            force_retrain: flag(&lookup, "HRIS_FORCE_RETRAIN", defaults.force_retrain),
            trigger_log: text("HRIS_TRIGGER_LOG").map(PathBuf::from),
            seed_sample_data: flag(&lookup, "HRIS_SEED_SAMPLE_DATA", defaults.seed_sample_data),
            log_format: parsed(&lookup, "HRIS_LOG_FORMAT", defaults.log_format),
        }
    }

    pub fn model_store(&self) -> FileModelStore {
        FileModelStore::new(
            self.model_dir.clone(),
            self.payroll_model_file.clone(),
            self.attrition_model_file.clone(),
        )
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            warn!(key, value = %raw, error = %e, "invalid config value; using default");
            default
        }
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(key, value = %raw, "invalid boolean config value; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> HrisConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HrisConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg, HrisConfig::default());
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(
            cfg.model_store().path_for(hris_ai::RiskModelKind::Payroll),
            PathBuf::from("ml_models/payroll_risk_model.json")
        );
    }

    #[test]
    fn explicit_values_override_defaults() {
        let cfg = config(&[
            ("HRIS_BIND_ADDR", "127.0.0.1:9000"),
            ("HRIS_MODEL_DIR", "/var/lib/hris/models"),
            ("HRIS_FORCE_RETRAIN", "TRUE"),
            ("HRIS_TRIGGER_LOG", "/var/log/hris/triggers.jsonl"),
            ("HRIS_SEED_SAMPLE_DATA", "0"),
            ("HRIS_LOG_FORMAT", "pretty"),
        ]);

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.model_dir, PathBuf::from("/var/lib/hris/models"));
        assert!(cfg.force_retrain);
        assert_eq!(cfg.trigger_log, Some(PathBuf::from("/var/log/hris/triggers.jsonl")));
        assert!(!cfg.seed_sample_data);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let cfg = config(&[
            ("HRIS_BIND_ADDR", "not-an-address"),
            ("HRIS_FORCE_RETRAIN", "maybe"),
            ("HRIS_LOG_FORMAT", "xml"),
            ("HRIS_TRIGGER_LOG", "   "),
        ]);
        assert_eq!(cfg, HrisConfig::default());
    }
}
