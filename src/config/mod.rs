mod settings;

pub use settings::{
    ApiSettings, Config, DisplaySettings, RefreshSettings, DEFAULT_INTERVAL_SECS, DEFAULT_LOCALE,
};

use crate::error::{AppError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.cuotas/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "cuotas") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".cuotas"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(AppError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| AppError::ConfigParse { path, source: e })
}

/// Load config.toml when the directory has been initialized, defaults otherwise.
///
/// Lets `show` and `watch` run from flags or env vars alone.
pub fn load_config_or_default(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        log::debug!(
            "no config directory at {}, using defaults",
            config_dir.display()
        );
        return Ok(Config::default());
    }
    load_config(config_dir)
}

/// Where a connection value came from, for `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    Config,
    Missing,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Flag => write!(f, "flag/env"),
            Source::Config => write!(f, "config.toml"),
            Source::Missing => write!(f, "not set"),
        }
    }
}

/// Endpoint and credential for the report service
#[derive(Debug, Clone)]
pub struct Connection {
    pub api_url: String,
    pub token: String,
    pub timeout_secs: Option<u64>,
}

fn pick(flag: Option<String>, config: Option<&String>) -> (Option<String>, Source) {
    match flag.filter(|v| !v.trim().is_empty()) {
        Some(v) => (Some(v), Source::Flag),
        None => match config.filter(|v| !v.trim().is_empty()) {
            Some(v) => (Some(v.clone()), Source::Config),
            None => (None, Source::Missing),
        },
    }
}

/// Report where the API URL and the token would come from, without requiring them
pub fn connection_sources(
    api_url: Option<String>,
    token: Option<String>,
    api: &ApiSettings,
) -> ((Option<String>, Source), (Option<String>, Source)) {
    (
        pick(api_url, api.url.as_ref()),
        pick(token, api.token.as_ref()),
    )
}

/// Resolve the connection: CLI flag / env var first, then config.toml
pub fn resolve_connection(
    api_url: Option<String>,
    token: Option<String>,
    api: &ApiSettings,
) -> Result<Connection> {
    let ((url, _), (token, _)) = connection_sources(api_url, token, api);
    let api_url = url.ok_or(AppError::MissingApiUrl)?;
    let token = token.ok_or(AppError::MissingToken)?;
    Ok(Connection {
        api_url,
        token,
        timeout_secs: api.timeout_secs,
    })
}

/// Show only the first characters of a secret
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
url = "https://api.example.com"
# token = "paste-admin-token-here"   # or pass --token / set CUOTAS_TOKEN
# timeout_secs = 10                  # optional, transport default when unset

[display]
locale = "es-MX"          # es-MX or en-US
currency_symbol = "$"

[refresh]
interval_secs = 60        # automatic re-fetch period for 'cuotas watch'
"#;
