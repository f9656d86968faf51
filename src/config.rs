//! 設定
//!
//! ギャップ容量・履歴モード・ログ出力を JSON ファイルから読み込む。
//! 未指定の項目は既定値を使用する。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::buffer::gap_store::DEFAULT_CAPACITY;
use crate::error::ConfigError;
use crate::history::HistoryMode;
use crate::logging::LogLevel;

const CONFIG_DIR_NAME: &str = "edittree";
const CONFIG_FILE_NAME: &str = "config.json";

/// コア設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// ギャップストアの初期容量（文字数）
    pub gap_capacity: usize,
    /// 履歴モード
    pub history_mode: HistoryMode,
    /// ログレベル
    pub log_level: LogLevel,
    /// ログファイル（`~` / 環境変数を展開する）
    pub log_file: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            gap_capacity: DEFAULT_CAPACITY,
            history_mode: HistoryMode::Branching,
            log_level: LogLevel::Info,
            log_file: None,
        }
    }
}

impl CoreConfig {
    /// 既定の設定ファイルパス（`<config dir>/edittree/config.json`）
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// `~` と環境変数を展開したパスを返す
    pub fn expand_path(path: &str) -> Result<PathBuf, ConfigError> {
        shellexpand::full(path)
            .map(|expanded| PathBuf::from(expanded.into_owned()))
            .map_err(|e| ConfigError::InvalidValue {
                key: "path".to_string(),
                value: format!("{}: {}", path, e),
            })
    }

    /// JSON 文字列から読み込む
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::InvalidFile {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 設定ファイルを読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: CoreConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::InvalidFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        log::debug!("configuration loaded from {}", path.display());
        Ok(config)
    }

    /// パス文字列を展開してから読み込む
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Self::load(Self::expand_path(path)?)
    }

    /// 既定パスに設定ファイルがあれば読み込み、なければ既定値を返す
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// 値の検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gap_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "gap_capacity".to_string(),
                value: self.gap_capacity.to_string(),
            });
        }
        Ok(())
    }

    /// 展開済みのログファイルパス
    ///
    /// 展開に失敗した場合は記述どおりのパスを使う。
    pub fn resolved_log_file(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(|raw| {
            Self::expand_path(raw).unwrap_or_else(|_| PathBuf::from(raw))
        })
    }
}
