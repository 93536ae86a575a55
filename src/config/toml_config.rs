use crate::adapters::couriers::COURIER_IDS;
use crate::adapters::http::{HttpSettings, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::utils::error::{Result, TrackError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HISTORY_FILE: &str = "history.json";
pub const DEFAULT_DATA_DIR: &str = ".parcel-track";

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern should compile"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub couriers: BTreeMap<String, CourierConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourierConfig {
    pub enabled: Option<bool>,
    pub base_url: Option<String>,
}

impl TrackerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrackError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TrackError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ACS_BASE_URL})，未設定的保留原字樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(timeout) = self.http.timeout_seconds {
            validate_range("http.timeout_seconds", timeout, 1, MAX_TIMEOUT_SECS)?;
        }

        if let Some(user_agent) = &self.http.user_agent {
            validate_non_empty_string("http.user_agent", user_agent)?;
        }

        if let Some(path) = &self.history.path {
            validate_path("history.path", path)?;
        }

        for (id, courier) in &self.couriers {
            if !COURIER_IDS.contains(&id.as_str()) {
                return Err(TrackError::InvalidConfigValueError {
                    field: "couriers".to_string(),
                    value: id.clone(),
                    reason: format!("Unknown courier. Valid couriers: {}", COURIER_IDS.join(", ")),
                });
            }
            if let Some(base_url) = &courier.base_url {
                validate_url(&format!("couriers.{}.base_url", id), base_url)?;
            }
        }

        Ok(())
    }

    /// 單次請求逾時
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: self.timeout(),
            user_agent: self
                .http
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }

    pub fn courier_enabled(&self, id: &str) -> bool {
        self.couriers
            .get(id)
            .and_then(|courier| courier.enabled)
            .unwrap_or(true)
    }

    pub fn base_url(&self, id: &str) -> Option<&str> {
        self.couriers
            .get(id)
            .and_then(|courier| courier.base_url.as_deref())
    }

    /// 歷史紀錄檔位置，預設為 ~/.parcel-track/history.json
    pub fn history_path(&self) -> PathBuf {
        match &self.history.path {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_DATA_DIR)
                .join(DEFAULT_HISTORY_FILE),
        }
    }
}

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
