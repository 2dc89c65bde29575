use log::trace;

use crate::error::Result;

use super::{LineInfo, Preformatted};

/// Finalized output lines with running offset sums.
///
/// Appending is O(1): each line chains its sums onto the previous one, so the
/// start offset of any line and the total length are available without a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<LineInfo>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalizes a line after the current last one.
    pub fn append_line(
        &mut self,
        prefix_length: usize,
        text_length: usize,
        length: usize,
        blank_prefix: bool,
        blank_text: bool,
        preformatted: Preformatted,
    ) -> Result<&LineInfo> {
        let line = match self.lines.last() {
            Some(prev) => prev.next(
                prefix_length,
                text_length,
                length,
                blank_prefix,
                blank_text,
                preformatted,
            )?,
            None => LineInfo::first(
                prefix_length,
                text_length,
                length,
                blank_prefix,
                blank_text,
                preformatted,
            )?,
        };
        trace!("append {line}");
        self.lines.push(line);
        Ok(&self.lines[self.lines.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&LineInfo> {
        self.lines.get(index)
    }

    pub fn last(&self) -> Option<&LineInfo> {
        self.lines.last()
    }

    pub fn lines(&self) -> &[LineInfo] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineInfo> {
        self.lines.iter()
    }

    /// Total output length, end-of-lines included.
    pub fn total_length(&self) -> usize {
        self.last().map_or(0, LineInfo::sum_length)
    }

    /// Start offset of line `index`; `len()` gives the total length.
    pub fn offset_of(&self, index: usize) -> Option<usize> {
        match self.lines.get(index) {
            Some(line) => Some(line.start_offset()),
            None if index == self.lines.len() => Some(self.total_length()),
            None => None,
        }
    }

    /// The line holding output offset `offset`.
    pub fn line_at_offset(&self, offset: usize) -> Option<&LineInfo> {
        let index = self.lines.partition_point(|line| line.sum_length() <= offset);
        self.lines.get(index)
    }

    /// Blank lines at the end of the buffer outside any preformatted run.
    pub fn trailing_blank_lines(&self) -> usize {
        self.lines
            .iter()
            .rev()
            .take_while(|line| line.is_blank_text_and_prefix() && !line.is_preformatted())
            .count()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.lines.truncate(len);
    }

    /// Reclassifies the last line; the sums do not depend on it.
    pub(crate) fn set_last_preformatted(&mut self, preformatted: Preformatted) {
        if let Some(last) = self.lines.last_mut() {
            *last = last.with_preformatted(preformatted);
        }
    }
}

impl<'a> IntoIterator for &'a LineBuffer {
    type Item = &'a LineInfo;
    type IntoIter = std::slice::Iter<'a, LineInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
