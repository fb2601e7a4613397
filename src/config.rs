use crate::analyzer::{KeySource, DEFAULT_MODEL};
use crate::error::{DetectorError, Result};
use crate::theme::AppTheme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 永続設定（~/.config/ai-detector/config.json）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            theme: AppTheme::Midnight.id().into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DetectorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("ai-detector").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先（空白のみの値は未設定扱い）
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(DetectorError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    /// 保存済みテーマ。未知のIDはデフォルトに落とす。
    pub fn theme(&self) -> AppTheme {
        AppTheme::from_id(&self.theme).unwrap_or_default()
    }

    pub fn set_theme(&mut self, theme: AppTheme) -> Result<()> {
        self.theme = theme.id().to_string();
        self.save()
    }
}

/// 呼び出しごとに環境変数と設定ファイルを読み直すキー取得クロージャ
///
/// 解析のたびに評価されるため、途中でキーを設定し直しても
/// プロセスを再起動せずに反映される。
pub fn key_source() -> KeySource {
    Box::new(|| {
        let config = Config::load().unwrap_or_default();
        config.get_api_key().ok()
    })
}

// =====================================================
// テスト
// =====================================================
