use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Tillsync synchronization server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "tillsync-server", version, about = "Tillsync synchronization server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "TILLSYNC_PORT", default_value = "8080")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "TILLSYNC_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./tillsync.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "TILLSYNC_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Directory served for non-API paths (terminal frontend assets)
    #[arg(long, env = "TILLSYNC_STATIC_DIR", default_value = "./public")]
    pub static_dir: String,

    /// Business settings (loaded from [settings] section in TOML)
    #[arg(skip)]
    #[serde(default)]
    pub settings: BusinessSettings,
}

/// Static business thresholds returned by GET /api/settings.
/// There is deliberately no mutation path for these at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSettings {
    /// Stock quantity at or below which terminals show a low-stock warning
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,

    /// Sales tax rate applied at checkout
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,

    /// ISO 4217 currency code shown by terminals
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            low_stock_threshold: 5,
            tax_rate: 0.16,
            currency: "USD".to_string(),
        }
    }
}

fn default_low_stock_threshold() -> u32 {
    5
}

fn default_tax_rate() -> f64 {
    0.16
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            config: "./tillsync.toml".to_string(),
            json_logs: false,
            generate_config: false,
            static_dir: "./public".to_string(),
            settings: BusinessSettings::default(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (TILLSYNC_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("TILLSYNC_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Tillsync Synchronization Server Configuration
# Place this file at ./tillsync.toml or specify with --config <path>
# All settings can be overridden via environment variables (TILLSYNC_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8080)
# port = 8080

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Directory served for non-API paths (terminal frontend assets)
# static_dir = "./public"

# ---- Business Settings ----
# [settings]

# Stock quantity at or below which terminals show a low-stock warning
# low_stock_threshold = 5

# Sales tax rate applied at checkout
# tax_rate = 0.16

# ISO 4217 currency code shown by terminals
# currency = "USD"
"#
    .to_string()
}
