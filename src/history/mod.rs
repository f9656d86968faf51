//! 編集履歴モジュール
//!
//! テキストバッファのスナップショットを木構造で保持し、
//! undo / redo と分岐間の移動を提供する。

pub mod tree;

use crate::buffer::TextBuffer;
use crate::error::StatusMessage;
use crate::position::Position;
use serde::{Deserialize, Serialize};

// 公開API
pub use tree::{HistoryNode, HistoryTree, NodeId, NodeSummary};
pub use crate::error::HistoryError;

/// 最古の変更に到達したときのメッセージ
pub const AT_OLDEST_MESSAGE: &str = "Already at oldest change";
/// 最新の変更に到達したときのメッセージ
pub const AT_NEWEST_MESSAGE: &str = "Already at newest change";

/// 履歴の動作モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// undo 後の編集は新しい分岐として追加される
    #[default]
    Branching,
    /// undo 後の編集は未到達の履歴を破棄する
    Linear,
}

/// 履歴移動で復元される状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// 移動先ノード（`None` は最初の編集より前）
    pub node: Option<NodeId>,
    pub snapshot: TextBuffer,
    pub cursor_line: Option<usize>,
    pub cursor_column: Option<usize>,
}

impl Checkpoint {
    /// 行・列の両方が記録されている場合のカーソル位置
    pub fn cursor(&self) -> Option<Position> {
        match (self.cursor_line, self.cursor_column) {
            (Some(line), Some(column)) => Some(Position::new(line, column)),
            _ => None,
        }
    }
}

/// undo / redo の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStatus {
    /// 移動して状態を復元した
    Moved(Checkpoint),
    /// これ以上 undo できない
    AtOldest,
    /// これ以上 redo できない
    AtNewest,
}

impl HistoryStatus {
    /// 境界に到達した場合のステータスメッセージ
    pub fn message(&self) -> Option<&'static str> {
        match self {
            HistoryStatus::Moved(_) => None,
            HistoryStatus::AtOldest => Some(AT_OLDEST_MESSAGE),
            HistoryStatus::AtNewest => Some(AT_NEWEST_MESSAGE),
        }
    }

    /// コマンド層向けのステータス表示（移動した場合は `None`）
    pub fn status_message(&self) -> Option<StatusMessage> {
        self.message().map(StatusMessage::info)
    }

    pub fn moved(&self) -> bool {
        matches!(self, HistoryStatus::Moved(_))
    }
}
