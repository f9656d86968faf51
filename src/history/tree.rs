//! 履歴ツリー
//!
//! ノードは編集順に単調増加するIDを持ち、親子関係で分岐を表す。
//! ルートは外部から与えられた初期スナップショットで、ノードとしては持たない。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::buffer::TextBuffer;
use crate::error::{history::Result, HistoryError};
use crate::history::{Checkpoint, HistoryMode, HistoryStatus};
use crate::position::Position;

/// 履歴ノードID
pub type NodeId = usize;

/// 履歴ノード
#[derive(Debug, Clone)]
pub struct HistoryNode {
    id: NodeId,
    parent: Option<NodeId>,
    /// 子ノード（作成順）
    children: Vec<NodeId>,
    snapshot: TextBuffer,
    cursor_line: Option<usize>,
    cursor_column: Option<usize>,
    description: String,
}

impl HistoryNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn snapshot(&self) -> &TextBuffer {
        &self.snapshot
    }

    pub fn cursor_line(&self) -> Option<usize> {
        self.cursor_line
    }

    pub fn cursor_column(&self) -> Option<usize> {
        self.cursor_column
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            node: Some(self.id),
            snapshot: self.snapshot.clone(),
            cursor_line: self.cursor_line,
            cursor_column: self.cursor_column,
        }
    }
}

/// 可視化用のノード情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub description: String,
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub child_ids: Vec<NodeId>,
    pub is_current: bool,
}

/// 分岐付き編集履歴
#[derive(Debug, Clone)]
pub struct HistoryTree {
    nodes: BTreeMap<NodeId, HistoryNode>,
    /// 最初の編集より前の状態
    root_snapshot: TextBuffer,
    /// ルート直下のノード（作成順）
    root_children: Vec<NodeId>,
    /// 現在位置（`None` は最初の編集より前）
    current: Option<NodeId>,
    next_id: NodeId,
    mode: HistoryMode,
}

impl HistoryTree {
    /// 初期スナップショットから分岐モードの履歴を作成
    pub fn new(initial: TextBuffer) -> Self {
        Self::with_mode(initial, HistoryMode::Branching)
    }

    /// モードを指定して履歴を作成
    pub fn with_mode(initial: TextBuffer, mode: HistoryMode) -> Self {
        Self {
            nodes: BTreeMap::new(),
            root_snapshot: initial,
            root_children: Vec::new(),
            current: None,
            next_id: 0,
            mode,
        }
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    /// モードを切り替える（既存ノードは保持し、次回の push から適用）
    pub fn set_mode(&mut self, mode: HistoryMode) {
        self.mode = mode;
    }

    /// 履歴を破棄して新しい初期スナップショットから始める
    pub fn clear(&mut self, initial: TextBuffer) {
        log::debug!("history cleared ({} nodes dropped)", self.nodes.len());
        self.nodes.clear();
        self.root_children.clear();
        self.root_snapshot = initial;
        self.current = None;
    }

    pub fn current_id(&self) -> Option<NodeId> {
        self.current
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&HistoryNode> {
        self.nodes.get(&id)
    }

    /// 最初の編集より前のスナップショット
    pub fn root_snapshot(&self) -> &TextBuffer {
        &self.root_snapshot
    }

    /// 現在位置のスナップショット
    pub fn current_snapshot(&self) -> Result<&TextBuffer> {
        match self.current {
            None => Ok(&self.root_snapshot),
            Some(id) => self.current_node(id).map(HistoryNode::snapshot),
        }
    }

    /// 現在位置で記録されたカーソル（ルートや未記録のノードでは `None`）
    pub fn current_cursor(&self) -> Result<Option<Position>> {
        match self.current {
            None => Ok(None),
            Some(id) => {
                let node = self.current_node(id)?;
                Ok(match (node.cursor_line, node.cursor_column) {
                    (Some(line), Some(column)) => Some(Position::new(line, column)),
                    _ => None,
                })
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_redo(&self) -> bool {
        match self.current {
            None => !self.root_children.is_empty(),
            Some(id) => self
                .nodes
                .get(&id)
                .is_some_and(|node| !node.children.is_empty()),
        }
    }

    /// スナップショットを現在位置の子として追加し、そこへ移動する
    ///
    /// 分岐モードでは既存の子を残したまま新しい子を末尾に追加する。
    /// 線形モードでは既存の子とその子孫を破棄する。
    pub fn push(
        &mut self,
        description: impl Into<String>,
        snapshot: TextBuffer,
        cursor_line: Option<usize>,
        cursor_column: Option<usize>,
    ) -> NodeId {
        let mut parent = self.current;
        if let Some(id) = parent {
            if !self.nodes.contains_key(&id) {
                log::warn!("current history node {} is missing; attaching new edit to root", id);
                parent = None;
            }
        }

        if self.mode == HistoryMode::Linear {
            self.discard_children(parent);
        }

        let id = self.next_id;
        self.next_id += 1;

        let node = HistoryNode {
            id,
            parent,
            children: Vec::new(),
            snapshot,
            cursor_line,
            cursor_column,
            description: description.into(),
        };
        log::debug!("history push {} ({:?}) under {:?}", id, node.description, parent);
        self.nodes.insert(id, node);

        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.root_children.push(id),
        }
        self.current = Some(id);
        id
    }

    /// 親ノードへ移動する
    pub fn undo(&mut self) -> Result<HistoryStatus> {
        let Some(id) = self.current else {
            return Ok(HistoryStatus::AtOldest);
        };

        let parent = self.current_node(id)?.parent;
        let checkpoint = match parent {
            Some(parent_id) => self.current_node(parent_id)?.checkpoint(),
            None => self.root_checkpoint(),
        };
        self.current = parent;
        log::debug!("history undo {} -> {:?}", id, parent);
        Ok(HistoryStatus::Moved(checkpoint))
    }

    /// 最も古い子ノードへ移動する
    pub fn redo(&mut self) -> Result<HistoryStatus> {
        let next = match self.current {
            None => self.root_children.first().copied(),
            Some(id) => self.current_node(id)?.children.first().copied(),
        };

        let Some(next_id) = next else {
            return Ok(HistoryStatus::AtNewest);
        };

        let checkpoint = self.current_node(next_id)?.checkpoint();
        log::debug!("history redo {:?} -> {}", self.current, next_id);
        self.current = Some(next_id);
        Ok(HistoryStatus::Moved(checkpoint))
    }

    /// 任意のノードへ直接移動する
    pub fn goto_node(&mut self, id: NodeId) -> Result<Checkpoint> {
        let checkpoint = self
            .nodes
            .get(&id)
            .map(HistoryNode::checkpoint)
            .ok_or(HistoryError::NodeNotFound { id })?;
        log::debug!("history goto {:?} -> {}", self.current, id);
        self.current = Some(id);
        Ok(checkpoint)
    }

    /// 指定ノードの子ノード一覧（作成順）
    pub fn get_branches(&self, id: NodeId) -> Result<&[NodeId]> {
        self.nodes
            .get(&id)
            .map(HistoryNode::children)
            .ok_or(HistoryError::NodeNotFound { id })
    }

    /// ルート直下のノード一覧（作成順）
    pub fn root_branches(&self) -> &[NodeId] {
        &self.root_children
    }

    /// 全ノードを可視化用に書き出す（ID順）
    pub fn tree_structure(&self) -> Vec<NodeSummary> {
        self.nodes
            .values()
            .map(|node| NodeSummary {
                description: node.description.clone(),
                id: node.id,
                parent_id: node.parent,
                child_ids: node.children.clone(),
                is_current: self.current == Some(node.id),
            })
            .collect()
    }

    /// 可視化用の構造をJSONで書き出す
    pub fn tree_structure_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(&self.tree_structure())?)
    }

    fn current_node(&self, id: NodeId) -> Result<&HistoryNode> {
        self.nodes.get(&id).ok_or_else(|| HistoryError::InvalidState {
            reason: format!("history node {} is referenced but missing", id),
        })
    }

    fn root_checkpoint(&self) -> Checkpoint {
        Checkpoint {
            node: None,
            snapshot: self.root_snapshot.clone(),
            cursor_line: None,
            cursor_column: None,
        }
    }

    /// 指定ノード（`None` はルート）の子孫をすべて削除
    fn discard_children(&mut self, parent: Option<NodeId>) {
        let children = match parent {
            Some(id) => self
                .nodes
                .get_mut(&id)
                .map(|node| std::mem::take(&mut node.children))
                .unwrap_or_default(),
            None => std::mem::take(&mut self.root_children),
        };

        let mut pending = children;
        let mut dropped = 0usize;
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                pending.extend(node.children);
                dropped += 1;
            }
        }

        if dropped > 0 {
            log::debug!("linear history discarded {} redo nodes", dropped);
        }
    }
}
