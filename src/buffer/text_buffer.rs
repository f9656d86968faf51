//! テキストバッファ
//!
//! ギャップストアを包み、行・列による位置指定と行キャッシュを提供する。
//! 編集ごとに新しい `TextBuffer` を返し、元の値は変更しない。
//! 内部データは不変で共有されるため、スナップショットの複製は安価。

use crate::buffer::gap_store::{GapStore, DEFAULT_CAPACITY};
use crate::error::{buffer::Result, BufferError};
use crate::position::{Position, Range};
use serde::Serialize;
use std::sync::Arc;
use unicode_width::UnicodeWidthStr;

const BOM: char = '\u{feff}';

/// バッファ統計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    pub lines: usize,
    pub characters: usize,
    pub words: usize,
}

/// 行キャッシュ付きテキストバッファ
#[derive(Debug, Clone)]
pub struct TextBuffer {
    store: Arc<GapStore>,
    /// 改行で分割した内容（常に `store` と一致する）
    lines: Arc<[String]>,
    /// 各行の開始オフセット（文字単位）
    line_starts: Arc<[usize]>,
}

impl TextBuffer {
    /// 空のバッファを作成
    pub fn new() -> Self {
        Self::from_store(GapStore::new())
    }

    /// 文字列からバッファを作成
    pub fn from_text(text: &str) -> Self {
        Self::with_capacity(text, DEFAULT_CAPACITY)
    }

    /// ギャップストアの最小容量を指定してバッファを作成
    pub fn with_capacity(text: &str, capacity: usize) -> Self {
        Self::from_store(GapStore::from_text_with_capacity(text, capacity))
    }

    /// ファイル層から受け取った文字列でバッファを作成
    ///
    /// BOMを除去し、CRLF / CR を LF に統一する。
    pub fn from_file_content(content: &str) -> Self {
        Self::from_text(&normalize_line_endings(content))
    }

    fn from_store(store: GapStore) -> Self {
        let (lines, line_starts) = split_lines(&store);
        Self {
            store: Arc::new(store),
            lines: lines.into(),
            line_starts: line_starts.into(),
        }
    }

    /// 下層のギャップストア
    pub fn store(&self) -> &GapStore {
        &self.store
    }

    /// 全内容を取得
    pub fn content(&self) -> String {
        self.store.text()
    }

    /// 文字数
    pub fn len_chars(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// 行数（空のバッファでも1）
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 行キャッシュ
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 指定行を取得
    pub fn line(&self, line: usize) -> Result<&str> {
        self.lines
            .get(line)
            .map(String::as_str)
            .ok_or_else(|| self.line_out_of_range(line))
    }

    /// 指定行の文字数
    pub fn line_length(&self, line: usize) -> Result<usize> {
        self.check_line(line)?;
        Ok(self.line_len_unchecked(line))
    }

    /// 指定行の表示幅（全角文字は2桁）
    pub fn line_display_width(&self, line: usize) -> Result<usize> {
        self.line(line).map(UnicodeWidthStr::width)
    }

    /// バッファ末尾の位置
    pub fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last, self.line_len_unchecked(last))
    }

    /// 行・列を文字オフセットに変換
    ///
    /// 範囲外の行はエラー。行末を超える列は行末に丸める。
    pub fn position_to_offset(&self, position: Position) -> Result<usize> {
        self.check_line(position.line)?;
        let column = position.column.min(self.line_len_unchecked(position.line));
        Ok(self.line_starts[position.line] + column)
    }

    /// 文字オフセットを行・列に変換
    pub fn offset_to_position(&self, offset: usize) -> Result<Position> {
        if offset > self.len_chars() {
            return Err(BufferError::OutOfBounds {
                position: offset,
                length: self.len_chars(),
            });
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        Ok(Position::new(line, offset - self.line_starts[line]))
    }

    /// 指定位置に文字列を挿入した新しいバッファを返す
    pub fn insert(&self, position: Position, text: &str) -> Result<TextBuffer> {
        let offset = self.position_to_offset(position)?;
        let store = self.store.insert(offset, text)?;
        log::debug!("insert {} chars at {} (offset {})", text.chars().count(), position, offset);
        Ok(Self::from_store(store))
    }

    /// 指定範囲を削除した新しいバッファを返す
    pub fn delete(&self, range: Range) -> Result<TextBuffer> {
        let (start, end) = self.range_to_offsets(range)?;
        let store = self.store.delete(start, end - start)?;
        log::debug!("delete {} (offsets {}..{})", range, start, end);
        Ok(Self::from_store(store))
    }

    /// 指定範囲を文字列で置換した新しいバッファを返す
    ///
    /// 範囲を削除したバッファの `range.start` へ挿入する。
    /// 列は削除後の行で丸められる。
    pub fn replace(&self, range: Range, text: &str) -> Result<TextBuffer> {
        let deleted = self.delete(range)?;
        deleted.insert(range.start, text)
    }

    /// 指定範囲のテキストを取得
    pub fn text_in(&self, range: Range) -> Result<String> {
        let (start, end) = self.range_to_offsets(range)?;
        self.store.substring(start, end)
    }

    /// 行数・文字数・単語数
    pub fn stats(&self) -> BufferStats {
        let content = self.content();
        BufferStats {
            lines: self.line_count(),
            characters: content.chars().count(),
            words: content.split_whitespace().count(),
        }
    }

    fn range_to_offsets(&self, range: Range) -> Result<(usize, usize)> {
        let start = self.position_to_offset(range.start)?;
        let end = self.position_to_offset(range.end)?;
        if start > end {
            return Err(BufferError::InvertedRange { start, end });
        }
        Ok((start, end))
    }

    fn check_line(&self, line: usize) -> Result<()> {
        if line < self.line_count() {
            Ok(())
        } else {
            Err(self.line_out_of_range(line))
        }
    }

    fn line_len_unchecked(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - self.line_starts[line] - 1,
            None => self.len_chars() - self.line_starts[line],
        }
    }

    fn line_out_of_range(&self, line: usize) -> BufferError {
        BufferError::LineOutOfRange {
            line,
            line_count: self.line_count(),
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TextBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.lines == other.lines
    }
}

impl Eq for TextBuffer {}

/// 行キャッシュと行開始オフセットを構築
fn split_lines(store: &GapStore) -> (Vec<String>, Vec<usize>) {
    let mut lines = Vec::new();
    let mut starts = vec![0];
    let mut current = String::new();

    for (offset, ch) in store.chars().enumerate() {
        if ch == '\n' {
            lines.push(std::mem::take(&mut current));
            starts.push(offset + 1);
        } else {
            current.push(ch);
        }
    }
    lines.push(current);

    (lines, starts)
}

/// BOM除去と改行コード統一
fn normalize_line_endings(content: &str) -> String {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    if !content.contains('\r') {
        return content.to_string();
    }

    log::warn!("Non-LF line endings detected, normalizing to LF");
    content.replace("\r\n", "\n").replace('\r', "\n")
}
