//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub http: HttpConfig,
    pub adapters: AdaptersConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    /// Mux name, also the first segment of HTTP handler paths
    pub name: String,
    pub description: String,
    pub prefix: String,
    pub alias: Option<String>,
    /// Seconds between heartbeat messages; unset disables the heartbeat
    pub heartbeat_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub listen: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdaptersConfig {
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            http: HttpConfig::default(),
            adapters: AdaptersConfig {
                console: Some(ConsoleConfig {
                    enabled: true,
                    username: None,
                }),
            },
            log_level: "info".to_string(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "chatmux".to_string(),
            description: "A chat bot".to_string(),
            prefix: "!".to_string(),
            alias: None,
            heartbeat_secs: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce unusable HTTP paths or commands
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.name.is_empty() {
            return Err(ConfigError::MissingField("bot.name".to_string()));
        }
        if self.bot.name.contains('/') {
            return Err(ConfigError::InvalidValue(format!(
                "bot.name must not contain '/': {}",
                self.bot.name
            )));
        }
        if self.bot.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue("bot.prefix must not contain whitespace".to_string()));
        }
        Ok(())
    }

    /// Whether the console adapter should run
    pub fn console_enabled(&self) -> bool {
        self.adapters.console.as_ref().map(|c| c.enabled).unwrap_or(false)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(name) = std::env::var("BOT_NAME") {
            config.bot.name = name;
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }

        if let Ok(listen) = std::env::var("HTTP_LISTEN") {
            config.http.listen = listen;
            config.http.enabled = true;
        }

        config
    }
}
