use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "admin.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Staging,
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "staging" => Some(Self::Staging),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn default_server_url(self) -> &'static str {
        match self {
            Self::Staging => "https://nrityaserver-2b241e0a97e5.herokuapp.com/",
            Self::Production => "https://djserver-production-ffe37b1b53b5.herokuapp.com/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub environment: Environment,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: Environment::Staging.default_server_url().into(),
            environment: Environment::Staging,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    server_url: Option<String>,
    environment: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings(cli_server_url: Option<String>) -> anyhow::Result<Settings> {
    load_settings_from(
        Path::new(CONFIG_FILE),
        |key| std::env::var(key).ok(),
        cli_server_url,
    )
}

/// Defaults, then the config file, then environment variables, then the
/// command line. The environment picks the server URL unless one is given.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
    cli_server_url: Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let mut explicit_url = None;

    if let Ok(raw) = fs::read_to_string(path) {
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        if let Some(v) = file_cfg.environment {
            settings.environment = parse_environment(&v)?;
        }
        if let Some(v) = file_cfg.server_url {
            explicit_url = Some(v);
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout_secs = v;
        }
    }

    if let Some(v) = env("APP__ENVIRONMENT") {
        settings.environment = parse_environment(&v)?;
    }
    if let Some(v) = env("ADMIN_SERVER_URL") {
        explicit_url = Some(v);
    }
    if let Some(v) = env("APP__SERVER_URL") {
        explicit_url = Some(v);
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = cli_server_url {
        explicit_url = Some(v);
    }

    let server_url = explicit_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| settings.environment.default_server_url().to_string());
    settings.server_url = normalize_server_url(&server_url);
    Ok(settings)
}

fn parse_environment(raw: &str) -> anyhow::Result<Environment> {
    match Environment::parse(raw) {
        Some(environment) => Ok(environment),
        None => bail!("unknown environment '{raw}', expected staging or production"),
    }
}

pub fn normalize_server_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
