//! Runtime configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::{DEFAULT_GEMINI_MODEL, DEFAULT_LLM_TIMEOUT};
use crate::matcher::DEFAULT_PRICE_TOLERANCE;
use crate::session::DEFAULT_SESSION_TIMEOUT;
use crate::synonyms::DEFAULT_FUZZY_THRESHOLD;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub catalog_path: PathBuf,
    pub port: u16,
    /// Without a key the bot runs on local heuristics only.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub classifier_timeout: Duration,
    pub session_timeout: chrono::Duration,
    /// Artificial pause before answering, to feel less robotic.
    pub reply_delay: Duration,
    pub fuzzy_threshold: f64,
    pub price_tolerance: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            port: DEFAULT_PORT,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            classifier_timeout: DEFAULT_LLM_TIMEOUT,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            reply_delay: Duration::ZERO,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            price_tolerance: DEFAULT_PRICE_TOLERANCE,
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or blank variables
    /// keep their defaults; malformed ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(path) = get("CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(port) = parse_var(&get, "PORT")? {
            config.port = port;
        }
        config.gemini_api_key = get("GEMINI_API_KEY");
        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(secs) = parse_var::<u64>(&get, "CLASSIFIER_TIMEOUT_SECS")? {
            config.classifier_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<i64>(&get, "SESSION_TIMEOUT_SECS")? {
            if secs <= 0 {
                return Err(invalid("SESSION_TIMEOUT_SECS", secs.to_string()));
            }
            config.session_timeout = chrono::Duration::seconds(secs);
        }
        if let Some(ms) = parse_var::<u64>(&get, "REPLY_DELAY_MS")? {
            config.reply_delay = Duration::from_millis(ms);
        }
        if let Some(threshold) = parse_var::<f64>(&get, "FUZZY_THRESHOLD")? {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(invalid("FUZZY_THRESHOLD", threshold.to_string()));
            }
            config.fuzzy_threshold = threshold;
        }
        if let Some(tolerance) = parse_var::<f64>(&get, "PRICE_TOLERANCE")? {
            if !tolerance.is_finite() || tolerance < 1.0 {
                return Err(invalid("PRICE_TOLERANCE", tolerance.to_string()));
            }
            config.price_tolerance = tolerance;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(var) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

fn invalid(var: &'static str, value: String) -> ConfigError {
    ConfigError::InvalidValue { var, value }
}

/// `data/catalog.json` under the working directory if present, otherwise
/// the platform data directory.
pub fn default_catalog_path() -> PathBuf {
    let local = PathBuf::from("data").join("catalog.json");
    if local.exists() {
        return local;
    }

    let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.join("catalog-bot").join("catalog.json")
}
