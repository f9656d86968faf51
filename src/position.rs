//! 行・列による位置指定
//!
//! 0ベースの `Position` と半開区間の `Range` を提供

use serde::{Deserialize, Serialize};
use std::fmt;

/// 行・列で表したバッファ内の位置（0ベース）
///
/// 順序は行→列の辞書式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 行番号（0ベース）
    pub line: usize,
    /// 列番号（0ベース、文字単位）
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 原点（0行0列）
    pub fn origin() -> Self {
        Self::default()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// 半開区間 `[start, end)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// 区間を作成
    ///
    /// `start > end` の区間もそのまま保持し、編集時に検出される。
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// 端点の順序を揃えて区間を作成
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// 行・列の組から区間を作成
    pub fn from_coords(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self::new(
            Position::new(start_line, start_column),
            Position::new(end_line, end_column),
        )
    }

    /// 長さ0の区間
    pub fn empty_at(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `start <= end` を満たすか
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_line_then_column() {
        assert!(Position::new(0, 10) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn test_range_ordered_swaps_endpoints() {
        let range = Range::ordered(Position::new(3, 0), Position::new(1, 4));
        assert_eq!(range.start, Position::new(1, 4));
        assert_eq!(range.end, Position::new(3, 0));
        assert!(range.is_ordered());
    }

    #[test]
    fn test_range_inverted_is_detected() {
        let range = Range::from_coords(2, 0, 1, 0);
        assert!(!range.is_ordered());
        assert!(!range.is_empty());
    }
}
