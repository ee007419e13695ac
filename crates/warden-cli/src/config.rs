// crates/warden-cli/src/config.rs
//
// Runtime configuration for the warden CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use warden_core::config::ReputationConfig;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct WardenConfig {
    /// Directory holding the reputation RocksDB database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level used when RUST_LOG is not set: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Number of per-node lock shards used by the reputation service.
    #[serde(default = "default_lock_shards")]
    pub lock_shards: usize,

    /// Reputation parameters applied to every audit.
    #[serde(default)]
    pub reputation: ReputationConfig,
}

fn default_data_dir() -> String {
    "~/.warden/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lock_shards() -> usize {
    256
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            lock_shards: default_lock_shards(),
            reputation: ReputationConfig::default(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// reputation parameters are out of range.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: WardenConfig = toml::from_str(contents)?;
        config.reputation.validate()?;
        Ok(config)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = WardenConfig::parse("").unwrap();
        assert_eq!(cfg.data_dir, "~/.warden/data");
        assert_eq!(cfg.lock_shards, 256);
        assert_eq!(cfg.reputation, ReputationConfig::default());
    }

    #[test]
    fn reputation_table_overrides_defaults() {
        let cfg = WardenConfig::parse(
            r#"
            data_dir = "/var/lib/warden"

            [reputation]
            audit_dq = 0.9
            suspension_dq_enabled = true

            [reputation.audit_history]
            window_size_secs = 3600
            tracking_period_secs = 14400
            offline_dq_enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_dir, "/var/lib/warden");
        assert_eq!(cfg.reputation.audit_dq, 0.9);
        assert!(cfg.reputation.suspension_dq_enabled);
        assert_eq!(cfg.reputation.audit_history.windows_per_tracking_period(), 4);
        assert!(cfg.reputation.audit_history.offline_dq_enabled);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(WardenConfig::parse("[reputation]\naudit_lambda = 1.5\n").is_err());
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/tmp/warden"), "/tmp/warden");
    }
}
