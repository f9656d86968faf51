//! 編集セッション
//!
//! 1つのバッファの現在値・カーソル・履歴をまとめた値と、
//! 複数セッションを管理するマネージャを提供する。
//! 履歴はプロセス全体で共有せず、セッションごとに保持する。

use std::collections::HashMap;

use crate::buffer::TextBuffer;
use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::history::{Checkpoint, HistoryMode, HistoryStatus, HistoryTree, NodeId};
use crate::position::{Position, Range};

/// セッションの一意識別子
pub type SessionId = usize;

/// 単一バッファの編集セッション
///
/// 編集は新しいバッファを計算してから履歴へ登録する。
/// 失敗した操作はバッファ・カーソル・履歴のいずれも変更しない。
#[derive(Debug, Clone)]
pub struct EditSession {
    buffer: TextBuffer,
    history: HistoryTree,
    cursor: Position,
}

impl EditSession {
    /// 初期バッファから分岐モードのセッションを作成
    pub fn new(initial: TextBuffer) -> Self {
        Self::with_mode(initial, HistoryMode::Branching)
    }

    pub fn with_mode(initial: TextBuffer, mode: HistoryMode) -> Self {
        Self {
            history: HistoryTree::with_mode(initial.clone(), mode),
            buffer: initial,
            cursor: Position::origin(),
        }
    }

    /// 設定に従ってファイル内容からセッションを作成
    pub fn from_content(content: &str, config: &CoreConfig) -> Self {
        let normalized = TextBuffer::from_file_content(content);
        let initial = TextBuffer::with_capacity(&normalized.content(), config.gap_capacity);
        Self::with_mode(initial, config.history_mode)
    }

    /// 現在のバッファ
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryTree {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryTree {
        &mut self.history
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// カーソルを移動する（列は行末に丸める）
    pub fn set_cursor(&mut self, position: Position) -> Result<()> {
        self.cursor = clamp_position(&self.buffer, position)?;
        Ok(())
    }

    /// 文字列を挿入し、カーソルを挿入文字列の直後へ移動する
    pub fn insert(&mut self, position: Position, text: &str) -> Result<NodeId> {
        let next = self.buffer.insert(position, text)?;
        let offset = self.buffer.position_to_offset(position)? + text.chars().count();
        let cursor = next.offset_to_position(offset)?;
        Ok(self.commit(format!("insert {:?}", text), next, cursor))
    }

    /// 範囲を削除し、カーソルを範囲の先頭へ移動する
    pub fn delete(&mut self, range: Range) -> Result<NodeId> {
        let removed = self.buffer.text_in(range)?;
        let start = self.buffer.position_to_offset(range.start)?;
        let next = self.buffer.delete(range)?;
        let cursor = next.offset_to_position(start)?;
        Ok(self.commit(format!("delete {:?}", removed), next, cursor))
    }

    /// 範囲を置換し、カーソルを置換文字列の直後へ移動する
    pub fn replace(&mut self, range: Range, text: &str) -> Result<NodeId> {
        let deleted = self.buffer.delete(range)?;
        let offset = deleted.position_to_offset(range.start)? + text.chars().count();
        let next = deleted.insert(range.start, text)?;
        let cursor = next.offset_to_position(offset)?;
        Ok(self.commit(format!("replace {} with {:?}", range, text), next, cursor))
    }

    /// 一つ前の状態へ戻す
    pub fn undo(&mut self) -> Result<HistoryStatus> {
        let status = self.history.undo()?;
        if let HistoryStatus::Moved(checkpoint) = &status {
            self.restore(checkpoint);
        }
        Ok(status)
    }

    /// 最も古い子の状態へ進める
    pub fn redo(&mut self) -> Result<HistoryStatus> {
        let status = self.history.redo()?;
        if let HistoryStatus::Moved(checkpoint) = &status {
            self.restore(checkpoint);
        }
        Ok(status)
    }

    /// 指定ノードの状態へ移動する
    pub fn goto_node(&mut self, id: NodeId) -> Result<()> {
        let checkpoint = self.history.goto_node(id)?;
        self.restore(&checkpoint);
        Ok(())
    }

    /// 内容を読み込み直し、履歴を破棄する
    pub fn reload(&mut self, content: &str) {
        let buffer = TextBuffer::from_file_content(content);
        self.history.clear(buffer.clone());
        self.buffer = buffer;
        self.cursor = Position::origin();
    }

    fn commit(&mut self, description: String, next: TextBuffer, cursor: Position) -> NodeId {
        let id = self
            .history
            .push(description, next.clone(), Some(cursor.line), Some(cursor.column));
        self.buffer = next;
        self.cursor = cursor;
        id
    }

    fn restore(&mut self, checkpoint: &Checkpoint) {
        self.buffer = checkpoint.snapshot.clone();
        let target = match (checkpoint.node, checkpoint.cursor()) {
            (_, Some(position)) => position,
            (None, None) => Position::origin(),
            (Some(_), None) => self.cursor,
        };
        self.cursor = clamp_position(&self.buffer, target).unwrap_or_default();
    }
}

/// 行をバッファ内に、列を行末までに収める
fn clamp_position(buffer: &TextBuffer, position: Position) -> Result<Position> {
    let line = position.line.min(buffer.line_count() - 1);
    let offset = buffer.position_to_offset(Position::new(line, position.column))?;
    Ok(buffer.offset_to_position(offset)?)
}

/// 複数セッションを管理する構造体
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<SessionId, EditSession>,
    /// 現在アクティブなセッションID
    current: Option<SessionId>,
    /// 次に割り当てるセッションID
    next_id: SessionId,
    config: CoreConfig,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            current: None,
            next_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// 空のセッションを作成し、IDを返す
    pub fn create(&mut self) -> SessionId {
        self.open_with_content("")
    }

    /// 内容を指定してセッションを作成し、IDを返す
    ///
    /// 最初のセッションは自動的に現在のセッションになる。
    pub fn open_with_content(&mut self, content: &str) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions
            .insert(id, EditSession::from_content(content, &self.config));

        if self.current.is_none() {
            self.current = Some(id);
        }
        log::debug!("session {} opened", id);
        id
    }

    pub fn current_id(&self) -> Option<SessionId> {
        self.current
    }

    pub fn current(&self) -> Option<&EditSession> {
        self.current.and_then(|id| self.sessions.get(&id))
    }

    pub fn current_mut(&mut self) -> Option<&mut EditSession> {
        self.current.and_then(|id| self.sessions.get_mut(&id))
    }

    pub fn get(&self, id: SessionId) -> Option<&EditSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut EditSession> {
        self.sessions.get_mut(&id)
    }

    /// 現在のセッションを切り替える
    pub fn switch_to(&mut self, id: SessionId) -> Result<()> {
        if self.sessions.contains_key(&id) {
            self.current = Some(id);
            Ok(())
        } else {
            Err(CoreError::SessionNotFound { id })
        }
    }

    /// セッションを閉じる（履歴も破棄される）
    ///
    /// 現在のセッションを閉じた場合は、残りのうち最小IDのセッションに切り替える。
    pub fn close(&mut self, id: SessionId) -> Result<EditSession> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(CoreError::SessionNotFound { id })?;

        if self.current == Some(id) {
            self.current = self.sessions.keys().min().copied();
        }
        log::debug!("session {} closed", id);
        Ok(session)
    }

    /// セッションID一覧（昇順）
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
