//! Delivery configuration and its persistence.
//!
//! Settings are layered:
//!   1. `~/.config/figsnap/config.json` (or the platform config dir)
//!   2. `FIGMA_FILE_KEY` / `FIGMA_TOKEN` / `FIGMA_API_BASE` env vars
//!   3. OS keychain for the token, when neither of the above set one
//!
//! Nothing here falls back to a baked-in placeholder: an unset or
//! placeholder value fails validation before any request is built.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.figma.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const KEYRING_SERVICE: &str = "figsnap";
const KEYRING_USER: &str = "figma";

/// Values people leave in when copying an example config.
const PLACEHOLDERS: &[&str] = &[
    "YOUR_FILE_KEY",
    "YOUR_FIGMA_TOKEN",
    "YOUR_API_TOKEN",
    "YOUR_TOKEN",
    "FILE_KEY",
    "TOKEN",
    "changeme",
    "placeholder",
];

/// Everything the Figma sink needs to make its one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FigmaConfig {
    pub file_key: String,
    pub token: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl FigmaConfig {
    pub fn new(file_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject unset or placeholder values.
    pub fn validate(&self) -> Result<(), ExportError> {
        check_value("file key", &self.file_key)?;
        check_value("token", &self.token)?;
        if self.api_base.trim().is_empty() {
            return Err(ExportError::Configuration("API base URL is empty".to_string()));
        }
        Ok(())
    }

    /// `POST` target for node creation.
    pub fn nodes_url(&self) -> String {
        format!(
            "{}/files/{}/nodes",
            self.api_base.trim_end_matches('/'),
            self.file_key
        )
    }
}

/// True for empty strings and values that look like template leftovers.
pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    if v.is_empty() {
        return true;
    }
    if PLACEHOLDERS.iter().any(|p| v.eq_ignore_ascii_case(p)) {
        return true;
    }
    if v.to_ascii_uppercase().starts_with("YOUR_") {
        return true;
    }
    if v.starts_with('<') && v.ends_with('>') {
        return true;
    }
    v.len() >= 3 && v.chars().all(|c| c == 'x' || c == 'X')
}

fn check_value(field: &str, value: &str) -> Result<(), ExportError> {
    if value.trim().is_empty() {
        return Err(ExportError::Configuration(format!("{} is not set", field)));
    }
    if is_placeholder(value) {
        // The value itself stays out of the message: it may be a real secret.
        return Err(ExportError::Configuration(format!(
            "{} is still a placeholder",
            field
        )));
    }
    Ok(())
}

// ── Persisted settings ───────────────────────────────────────────────

/// On-disk settings. Every field is optional so a partial file still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub file_key: Option<String>,
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
}

/// Directory where settings are stored.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("figsnap")
}

/// Full path to the settings file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

impl Settings {
    /// Load from a file. Missing or invalid files give defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[CONFIG] Ignoring invalid {}: {}", path.display(), e);
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    /// Load the user's settings file, then apply env overrides and the
    /// keychain token.
    pub fn load() -> Self {
        let mut settings = Self::load_from(&config_path());
        settings.apply_env();
        settings.fill_token(keychain_token);
        settings
    }

    /// Take the token from `fallback` only when neither the file nor the
    /// environment supplied a non-empty one.
    pub fn fill_token(&mut self, fallback: impl FnOnce() -> Option<String>) {
        if self.token.as_deref().map_or(true, str::is_empty) {
            self.token = fallback();
        }
    }

    /// Persist to `path`, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write config: {}", e))?;
        log::info!("[CONFIG] Saved settings to {}", path.display());
        Ok(())
    }

    /// Override fields from `FIGMA_*` env vars that are set and non-empty.
    pub fn apply_env(&mut self) {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        if let Some(v) = var("FIGMA_FILE_KEY") {
            self.file_key = Some(v);
        }
        if let Some(v) = var("FIGMA_TOKEN") {
            self.token = Some(v);
        }
        if let Some(v) = var("FIGMA_API_BASE") {
            self.api_base = Some(v);
        }
    }

    /// Build a Figma config. Unset values become empty strings and are
    /// caught by `FigmaConfig::validate()`.
    pub fn figma_config(&self) -> FigmaConfig {
        let mut config = FigmaConfig::new(
            self.file_key.clone().unwrap_or_default(),
            self.token.clone().unwrap_or_default(),
        );
        if let Some(base) = &self.api_base {
            config.api_base = base.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

// ── Keychain ─────────────────────────────────────────────────────────

/// Read the Figma token from the OS keychain, if one was saved.
pub fn keychain_token() -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    match entry.get_password() {
        Ok(token) if !token.is_empty() => {
            log::info!("[CONFIG] Loaded Figma token from OS keychain");
            Some(token)
        }
        _ => None,
    }
}

/// Save the Figma token to the OS keychain.
pub fn save_keychain_token(token: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| format!("Keyring error: {}", e))?;
    entry
        .set_password(token)
        .map_err(|e| format!("Failed to save token: {}", e))?;
    log::info!("[CONFIG] Figma token saved to OS keychain");
    Ok(())
}
