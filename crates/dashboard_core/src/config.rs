use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint_url: Url,
    pub access_key: String,
    pub request_timeout: Duration,
    pub image_max_bytes: u64,
}

/// Values gathered from the config file and environment before validation.
#[derive(Debug)]
struct RawSettings {
    endpoint_url: Option<String>,
    access_key: Option<String>,
    request_timeout_secs: u64,
    image_max_bytes: u64,
}

impl RawSettings {
    fn defaults() -> Self {
        Self {
            endpoint_url: None,
            access_key: None,
            request_timeout_secs: 15,
            image_max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Loads settings from `config_path` (or `dashboard.toml` when present) and
/// the process environment. Missing connection parameters are fatal.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let file_contents = match config_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };

    Settings::from_sources(file_contents.as_deref(), |name| std::env::var(name).ok())
}

impl Settings {
    pub fn from_sources(
        file_contents: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut raw = RawSettings::defaults();

        if let Some(contents) = file_contents {
            let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(contents)
                .context("config file is not valid TOML")?;
            if let Some(v) = file_cfg.get("supabase_url").and_then(toml::Value::as_str) {
                raw.endpoint_url = Some(v.to_string());
            }
            if let Some(v) = file_cfg
                .get("supabase_anon_key")
                .and_then(toml::Value::as_str)
            {
                raw.access_key = Some(v.to_string());
            }
            if let Some(v) = file_cfg
                .get("request_timeout_secs")
                .and_then(toml::Value::as_integer)
            {
                raw.request_timeout_secs = u64::try_from(v)
                    .map_err(|_| anyhow!("request_timeout_secs must not be negative"))?;
            }
            if let Some(v) = file_cfg
                .get("image_max_bytes")
                .and_then(toml::Value::as_integer)
            {
                raw.image_max_bytes = u64::try_from(v)
                    .map_err(|_| anyhow!("image_max_bytes must not be negative"))?;
            }
        }

        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("VITE_SUPABASE_URL") {
            raw.endpoint_url = Some(v);
        }
        if let Some(v) = non_empty("SUPABASE_URL") {
            raw.endpoint_url = Some(v);
        }

        if let Some(v) = non_empty("VITE_SUPABASE_ANON_KEY") {
            raw.access_key = Some(v);
        }
        if let Some(v) = non_empty("SUPABASE_ANON_KEY") {
            raw.access_key = Some(v);
        }

        if let Some(v) = non_empty("APP__REQUEST_TIMEOUT_SECS") {
            raw.request_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?;
        }
        if let Some(v) = non_empty("APP__IMAGE_MAX_BYTES") {
            raw.image_max_bytes = v
                .trim()
                .parse()
                .with_context(|| format!("APP__IMAGE_MAX_BYTES is not a number: '{v}'"))?;
        }

        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> anyhow::Result<Settings> {
        let endpoint = self
            .endpoint_url
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("Missing Supabase environment variables"))?;
        let access_key = self
            .access_key
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("Missing Supabase environment variables"))?;

        let endpoint_url = Url::parse(endpoint.trim())
            .with_context(|| format!("supabase url '{endpoint}' is not a valid URL"))?;
        if !matches!(endpoint_url.scheme(), "http" | "https") {
            bail!(
                "supabase url must use http or https, got '{}'",
                endpoint_url.scheme()
            );
        }
        if self.request_timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }

        Ok(Settings {
            endpoint_url,
            access_key: access_key.trim().to_string(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            image_max_bytes: self.image_max_bytes,
        })
    }
}
