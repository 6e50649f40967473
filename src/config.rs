use crate::error::{Result, SommelierError};
use serde::{Deserialize, Serialize};
use sommelier_ai_common::{DEFAULT_MAX_WINES_PER_DISH, DEFAULT_SIMILARITY_THRESHOLD};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub similarity_threshold: f64,
    pub max_wines_per_dish: usize,
    pub weight_frequency: f64,
    pub weight_quality: f64,
    pub retry_max_attempts: u32,
    pub retry_default_wait_secs: u64,
    pub retry_min_wait_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-flash-preview".into(),
            temperature: 0.3,
            max_output_tokens: 8192, // 大きいメニューで切断されにくくする
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_wines_per_dish: DEFAULT_MAX_WINES_PER_DISH,
            weight_frequency: 0.6,
            weight_quality: 0.4,
            retry_max_attempts: 3,
            retry_default_wait_secs: 30,
            retry_min_wait_secs: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SommelierError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("sommelier-ai").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var("GOOGLE_AI_API_KEY") {
            return Ok(key);
        }

        self.api_key.clone().ok_or(SommelierError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}
