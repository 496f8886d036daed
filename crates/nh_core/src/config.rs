use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_NEWSDATA_URL: &str = "https://newsdata.io/api/1/latest";
pub const DEFAULT_LLM_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_LLM_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_USER_AGENT: &str = "news-hub-bot/1.0 (+https://example.com)";

/// Runtime settings, read from the environment.
#[derive(Clone)]
pub struct Settings {
    pub newsdata_api_key: Option<String>,
    pub newsdata_base_url: String,
    pub bucket: String,
    pub prefix: String,
    pub gcs_access_token: Option<String>,
    pub storage: String,
    pub storage_root: PathBuf,
    pub request_timeout: Duration,
    pub per_request_sleep: Duration,
    pub user_agent: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub embedding_url: Option<String>,
    pub classifier_url: Option<String>,
    pub classifier_token: Option<String>,
    pub service_timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_deref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("newsdata_api_key", &redact(&self.newsdata_api_key))
            .field("newsdata_base_url", &self.newsdata_base_url)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("gcs_access_token", &redact(&self.gcs_access_token))
            .field("storage", &self.storage)
            .field("storage_root", &self.storage_root)
            .field("request_timeout", &self.request_timeout)
            .field("per_request_sleep", &self.per_request_sleep)
            .field("user_agent", &self.user_agent)
            .field("llm_api_key", &redact(&self.llm_api_key))
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("embedding_url", &self.embedding_url)
            .field("classifier_url", &self.classifier_url)
            .field("classifier_token", &redact(&self.classifier_token))
            .field("service_timeout", &self.service_timeout)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            newsdata_api_key: None,
            newsdata_base_url: DEFAULT_NEWSDATA_URL.to_string(),
            bucket: "news-hub".to_string(),
            prefix: "news_data".to_string(),
            gcs_access_token: None,
            storage: "fs".to_string(),
            storage_root: PathBuf::from("./news-hub"),
            request_timeout: Duration::from_secs(15),
            per_request_sleep: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            llm_api_key: None,
            llm_base_url: DEFAULT_LLM_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            embedding_url: None,
            classifier_url: None,
            classifier_token: None,
            service_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    /// Loads a `.env` file from the working directory (or a parent) first.
    /// Variables already set in the process win over the file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Settings::from_env`], but with an explicit `KEY=value` file as the
    /// fallback. The process environment is left untouched.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let read_err = |e: dotenvy::Error| Error::Config(format!("Failed to read {}: {}", path.display(), e));
        let file = dotenvy::from_path_iter(path)
            .map_err(read_err)?
            .collect::<std::result::Result<HashMap<String, String>, _>>()
            .map_err(read_err)?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            newsdata_api_key: get("NEWSDATA_API_KEY"),
            newsdata_base_url: get("NEWSDATA_BASE_URL").unwrap_or(defaults.newsdata_base_url),
            bucket: get("GCS_BUCKET").unwrap_or(defaults.bucket),
            prefix: get("GCS_PREFIX").unwrap_or(defaults.prefix),
            gcs_access_token: get("GCS_ACCESS_TOKEN"),
            storage: get("STORAGE").unwrap_or(defaults.storage),
            storage_root: get("STORAGE_ROOT").map(PathBuf::from).unwrap_or(defaults.storage_root),
            request_timeout: secs(get("REQUEST_TIMEOUT_S"), "REQUEST_TIMEOUT_S")?
                .unwrap_or(defaults.request_timeout),
            per_request_sleep: secs(get("PER_REQUEST_SLEEP_S"), "PER_REQUEST_SLEEP_S")?
                .unwrap_or(defaults.per_request_sleep),
            user_agent: get("HTTP_USER_AGENT").unwrap_or(defaults.user_agent),
            llm_api_key: get("LLM_API_KEY").or_else(|| get("GEMINI_API_KEY")),
            llm_base_url: get("LLM_BASE_URL").unwrap_or(defaults.llm_base_url),
            llm_model: get("LLM_MODEL").unwrap_or(defaults.llm_model),
            embedding_url: get("EMBEDDING_URL"),
            classifier_url: get("CLASSIFIER_URL"),
            classifier_token: get("CLASSIFIER_TOKEN"),
            service_timeout: secs(get("SERVICE_TIMEOUT_S"), "SERVICE_TIMEOUT_S")?
                .unwrap_or(defaults.service_timeout),
        })
    }
}

fn secs(value: Option<String>, key: &str) -> Result<Option<Duration>> {
    value
        .map(|v| {
            f64::from_str(&v)
                .ok()
                .filter(|s| s.is_finite() && *s >= 0.0)
                .map(Duration::from_secs_f64)
                .ok_or_else(|| Error::Config(format!("{} must be a non-negative number of seconds, got {:?}", key, v)))
        })
        .transpose()
}
