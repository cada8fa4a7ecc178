use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::whatsapp::{DEFAULT_MESSAGE, DEFAULT_PHONE};
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub whatsapp_phone: String,
    pub whatsapp_message: String,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".into(),
            whatsapp_phone: DEFAULT_PHONE.into(),
            whatsapp_message: DEFAULT_MESSAGE.into(),
            request_timeout_seconds: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    whatsapp_phone: Option<String>,
    whatsapp_message: Option<String>,
    request_timeout_seconds: Option<u64>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file when it exists, then environment.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;

        if let Some(v) = file_cfg.api_url {
            settings.api_url = v;
        }
        if let Some(v) = file_cfg.whatsapp_phone {
            settings.whatsapp_phone = v;
        }
        if let Some(v) = file_cfg.whatsapp_message {
            settings.whatsapp_message = v;
        }
        if let Some(v) = file_cfg.request_timeout_seconds {
            settings.request_timeout_seconds = nonzero_timeout(v)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        }
    }

    if let Some(v) = env("STOREFRONT_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__WHATSAPP_PHONE") {
        settings.whatsapp_phone = v;
    }
    if let Some(v) = env("APP__WHATSAPP_MESSAGE") {
        settings.whatsapp_message = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        let seconds = v
            .trim()
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECONDS must be whole seconds, got '{v}'"))?;
        settings.request_timeout_seconds = nonzero_timeout(seconds)
            .context("APP__REQUEST_TIMEOUT_SECONDS is invalid")?;
    }

    Ok(settings)
}

// A zero timeout makes every request fail immediately.
fn nonzero_timeout(seconds: u64) -> anyhow::Result<u64> {
    if seconds == 0 {
        anyhow::bail!("request_timeout_seconds must be greater than zero");
    }
    Ok(seconds)
}
