//! ギャップストア実装
//!
//! 固定容量の文字配列と、カーソル付近の挿入・削除を吸収する
//! 移動可能な空き領域（ギャップ）からなる文字ストア。
//! 編集操作は受け手を変更せず、新しい `GapStore` を返す。

use crate::error::{buffer::Result, BufferError};
use std::fmt;

/// 既定の初期容量（文字数）
pub const DEFAULT_CAPACITY: usize = 64;
const GROWTH_FACTOR: usize = 2;
/// ギャップ内の空きスロット
const EMPTY_SLOT: char = '\0';

/// ギャップストア構造体
///
/// 論理内容は `slots[0, gap_start) ++ slots[gap_end, capacity)`。
/// ギャップ内のスロットはアドレス可能な内容を持たない。
#[derive(Debug, Clone)]
pub struct GapStore {
    /// 内部配列（文字単位）
    slots: Vec<char>,
    /// ギャップの開始位置
    gap_start: usize,
    /// ギャップの終了位置（排他的）
    gap_end: usize,
}

impl GapStore {
    /// 空のギャップストアを既定容量で作成
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 指定容量で空のギャップストアを作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![EMPTY_SLOT; capacity],
            gap_start: 0,
            gap_end: capacity,
        }
    }

    /// 文字列からギャップストアを作成
    ///
    /// 容量は既定値と内容長の大きい方。内容は先頭に置かれ、残りがギャップになる。
    pub fn from_text(initial: &str) -> Self {
        Self::from_text_with_capacity(initial, DEFAULT_CAPACITY)
    }

    /// 最小容量を指定して文字列からギャップストアを作成
    pub fn from_text_with_capacity(initial: &str, min_capacity: usize) -> Self {
        let chars: Vec<char> = initial.chars().collect();
        let capacity = min_capacity.max(chars.len());
        let mut slots = Vec::with_capacity(capacity);
        slots.extend_from_slice(&chars);
        slots.resize(capacity, EMPTY_SLOT);

        Self {
            slots,
            gap_start: chars.len(),
            gap_end: capacity,
        }
    }

    /// 内部配列の容量
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 現在のギャップサイズ
    pub fn gap_size(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// ギャップの位置（論理位置）
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// 論理長（文字数）
    pub fn len(&self) -> usize {
        self.slots.len() - self.gap_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 論理内容の文字イテレータ
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.slots[..self.gap_start]
            .iter()
            .chain(self.slots[self.gap_end..].iter())
            .copied()
    }

    /// 全内容を文字列として取得
    pub fn text(&self) -> String {
        self.chars().collect()
    }

    /// 指定位置の文字を取得
    pub fn char_at(&self, position: usize) -> Result<char> {
        if position >= self.len() {
            return Err(self.out_of_bounds(position));
        }

        let index = if position < self.gap_start {
            position
        } else {
            position + self.gap_size()
        };
        Ok(self.slots[index])
    }

    /// `[start, end)` の内容を取得
    ///
    /// `char_at` を順に呼び、最初のエラーで打ち切る。
    pub fn substring(&self, start: usize, end: usize) -> Result<String> {
        if start > end {
            return Err(BufferError::InvertedRange { start, end });
        }
        (start..end).map(|pos| self.char_at(pos)).collect()
    }

    /// 指定位置に文字列を挿入した新しいストアを返す
    pub fn insert(&self, position: usize, text: &str) -> Result<GapStore> {
        if position > self.len() {
            return Err(self.out_of_bounds(position));
        }

        let mut next = self.clone();
        next.insert_in_place(position, text);
        Ok(next)
    }

    /// 指定位置から `length` 文字削除した新しいストアを返す
    ///
    /// 長さ0の削除は末尾位置までなら何もしない。
    /// 長さは残りの内容を超えないよう切り詰める。
    pub fn delete(&self, position: usize, length: usize) -> Result<GapStore> {
        if length == 0 {
            if position > self.len() {
                return Err(self.out_of_bounds(position));
            }
            return Ok(self.clone());
        }
        if position >= self.len() {
            return Err(self.out_of_bounds(position));
        }

        let clamped = length.min(self.len() - position);
        let mut next = self.clone();
        next.delete_in_place(position, clamped);
        Ok(next)
    }

    fn insert_in_place(&mut self, position: usize, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        self.move_gap_to(position);

        if chars.len() > self.gap_size() {
            self.grow(chars.len());
        }

        let start = self.gap_start;
        self.slots[start..start + chars.len()].copy_from_slice(&chars);
        self.gap_start += chars.len();
    }

    fn delete_in_place(&mut self, position: usize, length: usize) {
        self.move_gap_to(position);
        let new_gap_end = (self.gap_end + length).min(self.slots.len());
        self.slots[self.gap_end..new_gap_end].fill(EMPTY_SLOT);
        self.gap_end = new_gap_end;
    }

    /// ギャップを論理位置 `position` に移動
    ///
    /// 左へ k 移動する場合はギャップ直前の k 文字をギャップ末尾側へ、
    /// 右へ移動する場合はギャップ直後の k 文字をギャップ先頭側へコピーし、
    /// 空いたスロットを空に戻す。
    fn move_gap_to(&mut self, position: usize) {
        if position == self.gap_start {
            return;
        }

        if position < self.gap_start {
            // ギャップを左に移動
            let move_size = self.gap_start - position;
            let new_gap_end = self.gap_end - move_size;
            self.slots.copy_within(position..self.gap_start, new_gap_end);
            self.slots[position..new_gap_end].fill(EMPTY_SLOT);
            self.gap_start = position;
            self.gap_end = new_gap_end;
        } else {
            // ギャップを右に移動
            let move_size = position - self.gap_start;
            let new_gap_end = self.gap_end + move_size;
            self.slots.copy_within(self.gap_end..new_gap_end, self.gap_start);
            self.slots[position..new_gap_end].fill(EMPTY_SLOT);
            self.gap_start = position;
            self.gap_end = new_gap_end;
        }
    }

    /// 容量を `max(2×capacity, capacity+needed)` に拡張
    fn grow(&mut self, needed: usize) {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity
            .saturating_mul(GROWTH_FACTOR)
            .max(old_capacity + needed);
        let suffix_len = old_capacity - self.gap_end;

        let mut slots = Vec::with_capacity(new_capacity);
        slots.extend_from_slice(&self.slots[..self.gap_start]);
        slots.resize(new_capacity - suffix_len, EMPTY_SLOT);
        slots.extend_from_slice(&self.slots[self.gap_end..]);

        log::debug!(
            "gap store grew from {} to {} slots (needed {})",
            old_capacity,
            new_capacity,
            needed
        );

        self.slots = slots;
        self.gap_end = new_capacity - suffix_len;
    }

    fn out_of_bounds(&self, position: usize) -> BufferError {
        BufferError::OutOfBounds {
            position,
            length: self.len(),
        }
    }
}

impl Default for GapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GapStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.chars() {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

impl PartialEq for GapStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.chars().eq(other.chars())
    }
}

impl Eq for GapStore {}
