use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pledge::WorkflowSettings;

/// Main configuration structure for dao-pledge
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PledgeConfig {
    /// Chain connection settings
    pub chain: ChainConfig,
    /// Backend that mirrors applications
    pub backend: BackendConfig,
    /// Navigation after a successful pledge
    pub presentation: PresentationConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of a wallet-backed node
    pub rpc_url: String,
    /// Decimals of the deposit token
    pub token_decimals: u32,
    /// Blocks to wait for a receipt before giving up
    pub block_wait_window: u64,
    /// Delay between receipt polls in milliseconds
    pub poll_interval_ms: u64,
    /// Per-request limit for receipt and block-number polls in milliseconds
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    pub api_base_url: String,
    pub applications_path: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PresentationConfig {
    /// Prefix of the organization page, e.g. `/dao/v1`
    pub redirect_base: String,
    /// Value of the `successMessage` query parameter
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for PledgeConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                rpc_url: "http://localhost:8545".to_string(),
                token_decimals: 18,
                block_wait_window: 50, // web3 default
                poll_interval_ms: 1000,
                request_timeout_ms: 30_000,
            },
            backend: BackendConfig {
                api_base_url: "http://localhost:3000".to_string(),
                applications_path: "moloch/apply".to_string(),
                request_timeout_seconds: 30,
            },
            presentation: PresentationConfig {
                redirect_base: "/dao/v1".to_string(),
                success_message: "pledge".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl PledgeConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (dao-pledge.toml, .dao-pledge-rc)
    /// 3. Environment variables (prefixed with DAO_PLEDGE_)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`PledgeConfig::load`], looking for files in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let defaults = Config::try_from(&PledgeConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        let toml_path = dir.join("dao-pledge.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".dao-pledge-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(FileFormat::Toml));
        }

        // DAO_PLEDGE_CHAIN__RPC_URL -> chain.rpc_url
        builder = builder.add_source(
            Environment::with_prefix("DAO_PLEDGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            token_decimals: self.chain.token_decimals,
            redirect_base: self.presentation.redirect_base.clone(),
            success_message: self.presentation.success_message.clone(),
        }
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PledgeConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = PledgeConfig::load_env_file();
        PledgeConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static PledgeConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
