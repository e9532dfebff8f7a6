use anyhow::Context;
use camino::{
    Utf8Path,
    Utf8PathBuf,
};
use rtanks::ClientOptions;
use serde::Deserialize;
use std::{
    borrow::Cow,
    collections::HashMap,
    time::Duration,
};
use url::Url;

/// The number of rank insignia, one per ladder tier plus one for legends
pub const RANK_ICON_COUNT: usize = 31;

fn default_base_url() -> Url {
    Url::parse(rtanks::DEFAULT_BASE_URL).expect("invalid DEFAULT_BASE_URL")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_min_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    1500
}

fn default_user_agents() -> Vec<String> {
    rtanks::DEFAULT_USER_AGENTS
        .iter()
        .map(|user_agent| user_agent.to_string())
        .collect()
}

fn default_log_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("./logs")
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_base_url")]
    base_url: Url,

    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    #[serde(default = "default_min_delay_ms")]
    min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    max_delay_ms: u64,

    #[serde(default = "default_user_agents")]
    user_agents: Vec<String>,

    #[serde(default = "default_log_dir")]
    log_dir: Utf8PathBuf,

    rank_icons: Option<RankIconsConfig>,

    #[serde(flatten)]
    extra: HashMap<String, toml::Value>,
}

#[derive(Deserialize, Debug)]
pub struct RankIconsConfig {
    #[serde(default)]
    standard: Vec<String>,

    #[serde(default)]
    premium: Vec<String>,

    #[serde(flatten)]
    extra: HashMap<String, toml::Value>,
}

impl Config {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn user_agents(&self) -> &[String] {
        &self.user_agents
    }

    pub fn log_dir(&self) -> &Utf8Path {
        &self.log_dir
    }

    pub fn rank_icons(&self) -> Option<&RankIconsConfig> {
        self.rank_icons.as_ref()
    }

    /// Get options for a [`rtanks::Client`]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            timeout: self.timeout(),
            min_delay: self.min_delay(),
            max_delay: self.max_delay(),
            user_agents: self.user_agents.clone(),
        }
    }

    /// Load a config from a path
    pub fn load_from_path(path: &Utf8Path) -> anyhow::Result<Self> {
        std::fs::read(path)
            .with_context(|| format!("failed to read config from `{path}`"))
            .and_then(|b| Self::load_from_bytes(&b))
    }

    /// Load a config from bytes
    pub fn load_from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes).context("config is not utf8")?;
        toml::from_str(text).context("failed to parse config")
    }

    /// Validate a config
    pub fn validate(&self) -> Vec<ValidationMessage> {
        let mut errors = Vec::new();

        if self.timeout_secs == 0 {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::ZeroTimeout,
            });
        }

        if self.min_delay_ms > self.max_delay_ms {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::InvertedDelay {
                    min: self.min_delay_ms,
                    max: self.max_delay_ms,
                },
            });
        }

        if self.user_agents.is_empty() {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::NoUserAgents,
            });
        }

        if !matches!(self.base_url.scheme(), "http" | "https") {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::UnsupportedScheme(self.base_url.scheme().to_string()),
            });
        } else if self.base_url.cannot_be_a_base() {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::Generic("base url cannot be a base".into()),
            });
        }

        if let Some(rank_icons) = self.rank_icons.as_ref() {
            for (table, icons) in [
                ("standard", &rank_icons.standard),
                ("premium", &rank_icons.premium),
            ] {
                if !icons.is_empty() && icons.len() != RANK_ICON_COUNT {
                    errors.push(ValidationMessage {
                        severity: Severity::Warn,
                        error: ValidationError::IconCount {
                            table,
                            count: icons.len(),
                        },
                    });
                }
            }

            errors.extend(unknown_keys(&rank_icons.extra, "rank_icons."));
        }

        errors.extend(unknown_keys(&self.extra, ""));

        errors
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            user_agents: default_user_agents(),
            log_dir: default_log_dir(),
            rank_icons: None,
            extra: HashMap::new(),
        }
    }
}

impl RankIconsConfig {
    /// Icons for regular players, by insignia
    pub fn standard(&self) -> &[String] {
        &self.standard
    }

    /// Icons for premium players, by insignia
    pub fn premium(&self) -> &[String] {
        &self.premium
    }
}

fn unknown_keys<'a>(
    extra: &'a HashMap<String, toml::Value>,
    prefix: &'a str,
) -> impl Iterator<Item = ValidationMessage> + 'a {
    let mut keys: Vec<_> = extra.keys().collect();
    keys.sort();

    keys.into_iter().map(move |key| ValidationMessage {
        severity: Severity::Warn,
        error: ValidationError::UnknownKey(format!("{prefix}{key}")),
    })
}

#[derive(Debug)]
pub struct ValidationMessage {
    severity: Severity,
    error: ValidationError,
}

impl ValidationMessage {
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn error(&self) -> &ValidationError {
        &self.error
    }
}

#[derive(Debug)]
pub enum ValidationError {
    ZeroTimeout,
    InvertedDelay { min: u64, max: u64 },
    NoUserAgents,
    UnsupportedScheme(String),
    IconCount { table: &'static str, count: usize },
    UnknownKey(String),
    Generic(Cow<'static, str>),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroTimeout => write!(f, "Timeout must be greater than 0"),
            ValidationError::InvertedDelay { min, max } => write!(
                f,
                "Min delay ({min}ms) is greater than max delay ({max}ms)"
            ),
            ValidationError::NoUserAgents => write!(f, "No User Agents"),
            ValidationError::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported Base Url Scheme `{scheme}`")
            }
            ValidationError::IconCount { table, count } => write!(
                f,
                "Rank icon table `{table}` has {count} entries, expected {RANK_ICON_COUNT}"
            ),
            ValidationError::UnknownKey(key) => write!(f, "Unknown Key `{key}`"),
            ValidationError::Generic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}
