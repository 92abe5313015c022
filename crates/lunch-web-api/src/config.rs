use std::{collections::BTreeMap, net::IpAddr, path::PathBuf, time::Duration};

use tokio::fs;

const DEFAULT_CONFIG_PATH: &str = "lunch_menu.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no upstream url, set TODAY_MEAL_URL or upstream.url")]
    MissingUpstreamUrl,
    #[error("invalid upstream url {url:?}: {reason}")]
    InvalidUpstreamUrl {
        url: String,
        reason: String,
    },
    #[error("invalid upstream header {0:?}")]
    InvalidHeader(String),
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
}

pub async fn read() -> Result<Config, ConfigError> {
    if let Err(err) = dotenv::dotenv() {
        tracing::debug!("no .env loaded: {err}");
    }

    let config_path = std::env::var("LUNCH_MENU_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let canon = fs::canonicalize(".").await?;
    tracing::info!("try reading config file {config_path:?} at {canon:?}");

    let mut config = if fs::try_exists(&config_path).await? {
        tracing::info!("found config");

        let config = fs::read_to_string(&config_path).await?;
        let config = toml::from_str(&config)?;
        tracing::info!("read config");
        config
    } else {
        tracing::info!("config does not exist, using default config");
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;

    tracing::info!("using config: {config:#?}");
    Ok(config)
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub slack: SlackConfig,
}

impl Config {
    /// Environment wins over the file.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("TODAY_MEAL_URL") {
            self.upstream.url = Some(url);
        }
        if let Some(token) = var("SLACK_TOKEN") {
            self.slack.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.upstream.url.as_deref().map(str::trim) {
            None | Some("") => Err(ConfigError::MissingUpstreamUrl),
            Some(_) => Ok(()),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        #[cfg(not(debug_assertions))]
        tracing::warn!("using default server config in release");

        ServerConfig {
            address: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamMethod {
    #[default] Get,
    /// form encoded body from `upstream.form`
    Post,
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub url: Option<String>,
    pub method: UpstreamMethod,
    pub headers: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub lunch_code: String,
    pub corner_field: usize,
    pub menu_field: usize,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        use lunch_menu_api::MenuFilter;

        Self {
            url: None,
            method: UpstreamMethod::default(),
            headers: BTreeMap::new(),
            form: BTreeMap::new(),
            lunch_code: MenuFilter::DEFAULT_LUNCH_CODE.into(),
            corner_field: MenuFilter::DEFAULT_CORNER_FIELD,
            menu_field: MenuFilter::DEFAULT_MENU_FIELD,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, delay_ms: 1000 }
    }
}

#[derive(Default, serde::Deserialize)]
pub struct SlackConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
        .finish()
    }
}
