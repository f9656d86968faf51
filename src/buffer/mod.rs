//! バッファモジュール
//!
//! ギャップストアと、行・列アドレッシングを持つテキストバッファを提供

pub mod gap_store;
pub mod text_buffer;

// 公開API
pub use gap_store::GapStore;
pub use text_buffer::{BufferStats, TextBuffer};
pub use crate::error::BufferError;
