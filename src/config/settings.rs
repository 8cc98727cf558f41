use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCALE: &str = "es-MX";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ApiSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Global request timeout; the transport default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}
