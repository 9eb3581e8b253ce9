//! Client configuration.
//!
//! A [`ClientConfig`] is built once and handed to [`crate::client::FaostatClient`].
//! It is never mutated after construction: every builder method consumes the
//! value and returns a new one.
//!
//! Tunable request options go through [`ClientConfig::set_option`], which only
//! accepts names listed in [`CLIENT_OPTIONS`].

use reqwest::Url;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// FAOSTAT API root.
pub const DEFAULT_BASE_URL: &str = "https://faostatservices.fao.org/api/v1";

/// Per-request timeout.
///
/// Large domains can take well over a minute to flatten server-side.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Option names accepted by [`ClientConfig::set_option`].
pub const CLIENT_OPTIONS: &[&str] = &["timeout"];

/// Languages served by the FAOSTAT API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Fr,
    Es,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            "es" => Ok(Language::Es),
            _ => Err(ConfigError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Immutable FAOSTAT client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: Url,
    language: Language,
    timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            language: Language::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at a custom API root (mirrors, test servers).
    pub fn new(base_url: &str) -> ConfigResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Set the response language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set one named option.
    ///
    /// # Errors
    /// [`ConfigError::UnknownOption`] if `key` is not in [`CLIENT_OPTIONS`],
    /// [`ConfigError::InvalidValue`] if the value cannot be used.
    pub fn set_option(mut self, key: &str, value: &str) -> ConfigResult<Self> {
        match key {
            "timeout" => {
                self.timeout = parse_timeout(value)?;
                Ok(self)
            }
            _ => Err(ConfigError::UnknownOption {
                option: key.to_string(),
                expected: CLIENT_OPTIONS.join(", "),
            }),
        }
    }

    /// Apply several options in order, stopping at the first invalid one.
    pub fn configure<I, K, V>(self, options: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        options
            .into_iter()
            .try_fold(self, |config, (key, value)| {
                config.set_option(key.as_ref(), value.as_ref())
            })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Split a `key=value` option string.
pub fn parse_option(raw: &str) -> ConfigResult<(String, String)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
        option: raw.to_string(),
        value: String::new(),
        message: "expected key=value".to_string(),
    })?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn parse_base_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

fn parse_timeout(value: &str) -> ConfigResult<Duration> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        option: "timeout".to_string(),
        value: value.to_string(),
        message: message.to_string(),
    };

    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("expected a number of seconds"))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(invalid("must be a positive number of seconds"));
    }

    Ok(Duration::from_secs_f64(seconds))
}
