//! edittree - ギャップバッファと分岐undo履歴
//!
//! モーダルテキストエディタのバッファ格納・位置変換と、
//! スナップショットによる編集履歴ツリーを提供する

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;
pub mod position;

// 履歴層
pub mod history;
pub mod session;

// 公開API
pub use buffer::{BufferStats, GapStore, TextBuffer};
pub use config::CoreConfig;
pub use error::{CoreError, ErrorKind, Result, StatusMessage};
pub use history::{Checkpoint, HistoryMode, HistoryStatus, HistoryTree, NodeId, NodeSummary};
pub use position::{Position, Range};
pub use session::{EditSession, SessionId, SessionManager};
