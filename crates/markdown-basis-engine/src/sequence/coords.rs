//! Line/column coordinates of base offsets.
//!
//! All coordinates are 1-based. Offsets past the end of the base are clamped
//! to it, and offsets inside a multi-byte char snap back to its start.

use std::fmt;
use std::ops::Range;

use super::{ANY_EOL, EOL, SourceView};

/// A 1-based line and column. Columns count chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl SourceView {
    /// Line and column of absolute `index`; `\n`, `\r\n` and a lone `\r`
    /// each end a line.
    pub fn base_line_column_at(&self, index: usize) -> LineColumn {
        let base = self.base_str();
        let index = clamp_to_boundary(base, index);
        let bytes = base.as_bytes();
        let mut line = 1;
        for (i, &b) in bytes[..index].iter().enumerate() {
            let lone_cr = b == b'\r' && bytes.get(i + 1) != Some(&b'\n');
            if b == b'\n' || lone_cr {
                line += 1;
            }
        }
        LineColumn {
            line,
            column: self.base_column_at(index),
        }
    }

    pub fn base_line_column_at_start(&self) -> LineColumn {
        self.base_line_column_at(self.start_offset())
    }

    pub fn base_line_column_at_end(&self) -> LineColumn {
        self.base_line_column_at(self.end_offset())
    }

    /// 1-based char column of absolute `index` within its line.
    pub fn base_column_at(&self, index: usize) -> usize {
        let base = self.base_str();
        let index = clamp_to_boundary(base, index);
        let line_start = self.base_start_of_line_any_eol_at(index);
        base[line_start..index].chars().count() + 1
    }

    pub fn base_column_at_start(&self) -> usize {
        self.base_column_at(self.start_offset())
    }

    pub fn base_column_at_end(&self) -> usize {
        self.base_column_at(self.end_offset())
    }

    /// Offset of the next `\n` at or after `index`, or the base length.
    pub fn base_end_of_line_at(&self, index: usize) -> usize {
        self.scan_forward(index, |c| c == EOL)
    }

    /// Offset of the next `\r` or `\n` at or after `index`, or the base length.
    pub fn base_end_of_line_any_eol_at(&self, index: usize) -> usize {
        self.scan_forward(index, |c| ANY_EOL.contains(c))
    }

    pub fn base_end_of_line(&self) -> usize {
        self.base_end_of_line_at(self.end_offset())
    }

    pub fn base_end_of_line_any_eol(&self) -> usize {
        self.base_end_of_line_any_eol_at(self.end_offset())
    }

    /// Offset just after the previous `\n` before `index`, or 0.
    pub fn base_start_of_line_at(&self, index: usize) -> usize {
        self.scan_backward(index, |c| c == EOL)
    }

    /// Offset just after the previous line terminator before `index`, or 0.
    /// A `\r\n` pair is one terminator, so an index between its two bytes
    /// still belongs to the line the pair ends.
    pub fn base_start_of_line_any_eol_at(&self, index: usize) -> usize {
        let base = self.base_str();
        let index = clamp_to_boundary(base, index);
        let bytes = base.as_bytes();
        bytes[..index]
            .iter()
            .enumerate()
            .rposition(|(i, &b)| b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n')))
            .map_or(0, |i| i + 1)
    }

    pub fn base_start_of_line(&self) -> usize {
        self.base_start_of_line_at(self.start_offset())
    }

    pub fn base_start_of_line_any_eol(&self) -> usize {
        self.base_start_of_line_any_eol_at(self.start_offset())
    }

    /// Absolute range of the line holding `index`, without its terminator.
    pub fn base_line_range_at(&self, index: usize) -> Range<usize> {
        let start = self.base_start_of_line_any_eol_at(index);
        let mut end = self.base_end_of_line_any_eol_at(index);
        if end > start && self.base_str().as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        start..end
    }

    pub fn base_line_range_at_start(&self) -> Range<usize> {
        self.base_line_range_at(self.start_offset())
    }

    pub fn base_line_range_at_end(&self) -> Range<usize> {
        self.base_line_range_at(self.end_offset())
    }

    fn scan_forward(&self, index: usize, is_eol: impl Fn(char) -> bool) -> usize {
        let base = self.base_str();
        let index = clamp_to_boundary(base, index);
        base[index..]
            .find(is_eol)
            .map_or(base.len(), |i| index + i)
    }

    fn scan_backward(&self, index: usize, is_eol: impl Fn(char) -> bool) -> usize {
        let base = self.base_str();
        let index = clamp_to_boundary(base, index);
        // every terminator is a single byte
        base[..index].rfind(is_eol).map_or(0, |i| i + 1)
    }
}

fn clamp_to_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
