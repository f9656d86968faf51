//! エラーハンドリングシステム
//!
//! バッファ・履歴・設定の各層で使用されるエラー型と、
//! コマンド層がステータス表示へ変換するためのユーティリティを定義する。
//! コア内の操作はすべて `Result` を返し、プロセスを終了させることはない。

use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// バッファ操作エラー
    #[error("Buffer operation failed: {0}")]
    Buffer(#[from] BufferError),

    /// 履歴操作エラー
    #[error("History operation failed: {0}")]
    History(#[from] HistoryError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 存在しないセッション
    #[error("Session not found: {id}")]
    SessionNotFound { id: usize },

    /// 履歴ツリーの書き出し失敗
    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

/// バッファ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Position {position} is out of bounds (length {length})")]
    OutOfBounds { position: usize, length: usize },

    #[error("Line {line} is out of range (line count {line_count})")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("Range start {start} is after range end {end}")]
    InvertedRange { start: usize, end: usize },
}

/// 履歴操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History node not found: {id}")]
    NodeNotFound { id: usize },

    /// ツリー不変条件の破損（ユーザー操作の境界エラーとは区別する）
    #[error("Invalid history state: {reason}")]
    InvalidState { reason: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file: {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// エラー分類
///
/// `OutOfBounds` / `NodeNotFound` は通常の操作失敗、
/// `InvalidState` は内部不変条件の破損を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OutOfBounds,
    NodeNotFound,
    SessionNotFound,
    InvalidState,
    Config,
}

impl CoreError {
    /// エラー分類を取得
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Buffer(_) => ErrorKind::OutOfBounds,
            CoreError::History(HistoryError::NodeNotFound { .. }) => ErrorKind::NodeNotFound,
            CoreError::History(HistoryError::InvalidState { .. }) => ErrorKind::InvalidState,
            CoreError::SessionNotFound { .. } => ErrorKind::SessionNotFound,
            CoreError::Config(_) => ErrorKind::Config,
            CoreError::Serialization { .. } => ErrorKind::InvalidState,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Io {
            message: error.to_string(),
        }
    }
}

/// ステータス表示のレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
}

/// コマンド層へ返すステータス表示情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// 表示メッセージ
    pub message: String,
    /// 表示レベル
    pub level: ErrorLevel,
}

impl StatusMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ErrorLevel::Info,
        }
    }

    /// エラーをステータス表示へ変換
    pub fn from_error(error: &CoreError) -> Self {
        let (message, level) = Self::format_error(error);
        Self { message, level }
    }

    fn format_error(error: &CoreError) -> (String, ErrorLevel) {
        match error {
            CoreError::Buffer(BufferError::OutOfBounds { position, length }) => (
                format!("Position {} is outside the buffer (length {})", position, length),
                ErrorLevel::Warning,
            ),
            CoreError::Buffer(BufferError::LineOutOfRange { line, line_count }) => (
                format!("No line {} (buffer has {} lines)", line, line_count),
                ErrorLevel::Warning,
            ),
            CoreError::Buffer(BufferError::InvertedRange { start, end }) => (
                format!("Invalid range: {} is after {}", start, end),
                ErrorLevel::Warning,
            ),
            CoreError::History(HistoryError::NodeNotFound { id }) => {
                (format!("No history node {}", id), ErrorLevel::Warning)
            }
            CoreError::SessionNotFound { id } => {
                (format!("No buffer session {}", id), ErrorLevel::Warning)
            }
            CoreError::History(HistoryError::InvalidState { reason }) => {
                (format!("History is corrupted: {}", reason), ErrorLevel::Error)
            }
            _ => (format!("Error: {}", error), ErrorLevel::Error),
        }
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, CoreError>;

/// 各モジュール固有のResult型
pub mod buffer {
    pub type Result<T> = std::result::Result<T, super::BufferError>;
}

pub mod history {
    pub type Result<T> = std::result::Result<T, super::HistoryError>;
}
