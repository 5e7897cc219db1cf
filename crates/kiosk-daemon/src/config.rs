//! Configuration file management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use kiosk_market::MarketConfig;

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Ledger behavior: allowance, settlement policy, claim policy.
    #[serde(default)]
    pub ledger: MarketConfig,
    /// Payout provider settings.
    #[serde(default)]
    pub payout: PayoutConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

/// Payout provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutConfig {
    /// Make every simulated transfer fail. Development toggle for
    /// exercising the payout-failure path end to end.
    #[serde(default)]
    pub simulate_failures: bool,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: DaemonConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        // Check env var override first
        if let Ok(dir) = std::env::var("KIOSK_DATA_DIR") {
            return PathBuf::from(dir).join("config.toml");
        }
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("KIOSK_DATA_DIR") {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/Kiosk")
        }
        #[cfg(target_os = "linux")]
        {
            dirs_fallback(".kiosk")
        }
        #[cfg(target_os = "windows")]
        {
            dirs_fallback("Kiosk")
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            dirs_fallback(".kiosk")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/kiosk"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_ledger::claim::ClaimPolicy;
    use kiosk_ledger::policy::SettlementPolicy;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.ledger.allowance, kiosk_types::CREDIT_ALLOWANCE_MICRO);
        assert_eq!(config.ledger.settlement_policy, SettlementPolicy::FullReset);
        assert_eq!(config.ledger.claim_policy, ClaimPolicy::ConsumeWhole);
        assert!(!config.payout.simulate_failures);
        assert_eq!(config.advanced.log_level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = DaemonConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let _parsed: DaemonConfig = toml::from_str(&toml_str).expect("parse");
    }

    #[test]
    fn test_ledger_section_parses_policies() {
        let parsed: DaemonConfig = toml::from_str(
            r#"
            [ledger]
            allowance = 50000000
            settlement_policy = "refund_settled"
            claim_policy = "exact_only"
            "#,
        )
        .expect("parse");
        assert_eq!(parsed.ledger.allowance, 50_000_000);
        assert_eq!(parsed.ledger.settlement_policy, SettlementPolicy::RefundSettled);
        assert_eq!(parsed.ledger.claim_policy, ClaimPolicy::ExactOnly);
    }
}
