use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

use crate::error::{Result, SequenceError};

use super::WHITESPACE;
use super::tracking::TrackedOffset;

/// An immutable window `[start, end)` onto a shared base text.
///
/// Offsets are absolute byte offsets into the base and always fall on `char`
/// boundaries. Cloning a view never copies text: every derived view holds the
/// same `Arc<str>`, and two views are "from the same base" exactly when they
/// hold the same allocation.
#[derive(Clone)]
pub struct SourceView {
    base: Arc<str>,
    start: usize,
    end: usize,
    pub(super) tracked: Option<TrackedOffset>,
}

impl SourceView {
    /// A view spanning the whole text.
    ///
    /// Passing an `Arc<str>` keeps its identity, so views created from clones
    /// of the same `Arc` share a base.
    pub fn of(text: impl Into<Arc<str>>) -> Self {
        let base = text.into();
        let end = base.len();
        Self {
            base,
            start: 0,
            end,
            tracked: None,
        }
    }

    /// A view from `start` to the end of the text.
    pub fn of_from(text: impl Into<Arc<str>>, start: usize) -> Result<Self> {
        let base = text.into();
        let end = base.len();
        Self::new(base, start, end)
    }

    /// A view over `[start, end)` of the text.
    pub fn of_range(text: impl Into<Arc<str>>, start: usize, end: usize) -> Result<Self> {
        Self::new(text.into(), start, end)
    }

    fn new(base: Arc<str>, start: usize, end: usize) -> Result<Self> {
        check_range(&base, start, end)?;
        Ok(Self {
            base,
            start,
            end,
            tracked: None,
        })
    }

    /// Derives a view over the same base. Callers have already validated the range.
    pub(super) fn derive(&self, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= self.base.len());
        Self {
            base: Arc::clone(&self.base),
            start,
            end,
            tracked: self.tracked,
        }
    }

    pub fn base(&self) -> &Arc<str> {
        &self.base
    }

    /// The full base text.
    pub fn base_str(&self) -> &str {
        &self.base
    }

    pub fn start_offset(&self) -> usize {
        self.start
    }

    pub fn end_offset(&self) -> usize {
        self.end
    }

    pub fn source_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_str(&self) -> &str {
        &self.base[self.start..self.end]
    }

    pub fn chars(&self) -> std::str::Chars<'_> {
        self.as_str().chars()
    }

    /// Absolute base offset of relative `index` (which may equal `len()`).
    pub fn index_offset(&self, index: usize) -> Result<usize> {
        if index > self.len() {
            return Err(SequenceError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.start + index)
    }

    /// The char starting at relative byte `index`.
    pub fn char_at(&self, index: usize) -> Result<char> {
        let text = self.as_str();
        if index >= text.len() {
            return Err(SequenceError::IndexOutOfRange {
                index,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(index) {
            return Err(SequenceError::NotCharBoundary {
                offset: self.start + index,
            });
        }
        text[index..]
            .chars()
            .next()
            .ok_or(SequenceError::IndexOutOfRange {
                index,
                len: text.len(),
            })
    }

    /// Like [`char_at`](Self::char_at) but returns `'\0'` outside the view
    /// (including negative indices) or inside a multi-byte char.
    pub fn safe_char_at(&self, index: isize) -> char {
        if index < 0 || index as usize >= self.len() {
            return '\0';
        }
        char_at_boundary(self.as_str(), index as usize)
    }

    /// Char at an absolute base offset, or `'\0'` outside the base.
    ///
    /// Lets callers peek before and after the view's own extent.
    pub fn safe_base_char_at(&self, index: isize) -> char {
        if index < 0 || index as usize >= self.base.len() {
            return '\0';
        }
        char_at_boundary(&self.base, index as usize)
    }

    /// Sub-view over relative `[start, end)`.
    pub fn sub_sequence(&self, start: usize, end: usize) -> Result<Self> {
        if start > end || end > self.len() {
            return Err(SequenceError::OutOfRange {
                start,
                end,
                len: self.len(),
            });
        }
        let (abs_start, abs_end) = (self.start + start, self.start + end);
        check_boundary(&self.base, abs_start)?;
        check_boundary(&self.base, abs_end)?;
        Ok(self.derive(abs_start, abs_end))
    }

    pub fn sub_sequence_from(&self, start: usize) -> Result<Self> {
        self.sub_sequence(start, self.len())
    }

    /// View over absolute `[start, end)` of the base, free to reach outside this view.
    pub fn base_sub_sequence(&self, start: usize, end: usize) -> Result<Self> {
        check_range(&self.base, start, end)?;
        Ok(self.derive(start, end))
    }

    pub fn base_sub_sequence_from(&self, start: usize) -> Result<Self> {
        self.base_sub_sequence(start, self.base.len())
    }

    /// Zero-length view anchored at this view's start.
    pub fn empty_prefix(&self) -> Self {
        self.derive(self.start, self.start)
    }

    /// Zero-length view anchored at this view's end.
    pub fn empty_suffix(&self) -> Self {
        self.derive(self.end, self.end)
    }

    pub fn same_base(&self, other: &SourceView) -> bool {
        Arc::ptr_eq(&self.base, &other.base)
    }

    fn assert_same_base(&self, other: &SourceView, op: &str) {
        assert!(
            self.same_base(other),
            "{op}: views {:?} and {:?} reference different base buffers",
            self.source_range(),
            other.source_range()
        );
    }

    /// True when `other` starts exactly where this view ends.
    ///
    /// # Panics
    /// If the views reference different base buffers.
    pub fn is_continued_by(&self, other: &SourceView) -> bool {
        self.assert_same_base(other, "is_continued_by");
        other.start == self.end
    }

    /// True when this view starts exactly where `other` ends.
    pub fn is_continuation_of(&self, other: &SourceView) -> bool {
        other.is_continued_by(self)
    }

    /// A view spanning this view and the adjacent `other`.
    ///
    /// The result keeps this view's tracked offset, or `other`'s if this one
    /// tracks nothing.
    ///
    /// # Panics
    /// If `other` does not continue this view.
    pub fn splice_at_end(&self, other: &SourceView) -> Self {
        assert!(
            self.is_continued_by(other),
            "splice_at_end: view {:?} does not continue {:?}",
            other.source_range(),
            self.source_range()
        );
        let mut spliced = self.derive(self.start, other.end);
        spliced.tracked = self.tracked.or(other.tracked);
        spliced
    }

    /// Checked [`splice_at_end`](Self::splice_at_end).
    pub fn try_splice_at_end(&self, other: &SourceView) -> Result<Self> {
        if !self.same_base(other) || other.start != self.end {
            return Err(SequenceError::NotContinuation {
                end: self.end,
                start: other.start,
            });
        }
        Ok(self.splice_at_end(other))
    }

    /// Offset containment: `other` lies entirely within this view.
    pub fn contains_all_of(&self, other: &SourceView) -> bool {
        self.assert_same_base(other, "contains_all_of");
        self.start <= other.start && other.end <= self.end
    }

    /// Offset overlap: the two ranges share at least one byte.
    pub fn contains_some_of(&self, other: &SourceView) -> bool {
        self.assert_same_base(other, "contains_some_of");
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// The part of this view before `other` starts.
    pub fn prefix_of(&self, other: &SourceView) -> Self {
        self.assert_same_base(other, "prefix_of");
        if other.start <= self.start {
            self.empty_prefix()
        } else {
            self.derive(self.start, self.end.min(other.start))
        }
    }

    /// The part of this view after `other` ends.
    pub fn suffix_of(&self, other: &SourceView) -> Self {
        self.assert_same_base(other, "suffix_of");
        if other.end >= self.end {
            self.empty_suffix()
        } else {
            self.derive(self.start.max(other.end), self.end)
        }
    }

    /// The overlapping range; empty and clamped into this view when disjoint.
    pub fn intersect(&self, other: &SourceView) -> Self {
        self.assert_same_base(other, "intersect");
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            self.derive(start, end)
        } else {
            let at = start.clamp(self.start, self.end);
            self.derive(at, at)
        }
    }

    pub fn trim_start(&self) -> Self {
        let trimmed = self.as_str().trim_start_matches(|c| WHITESPACE.contains(c));
        self.derive(self.end - trimmed.len(), self.end)
    }

    pub fn trim_end(&self) -> Self {
        let trimmed = self.as_str().trim_end_matches(|c| WHITESPACE.contains(c));
        self.derive(self.start, self.start + trimmed.len())
    }

    pub fn trim(&self) -> Self {
        self.trim_start().trim_end()
    }

    /// Drops a single trailing `\n`, `\r\n` or `\r`.
    pub fn trim_eol(&self) -> Self {
        let text = self.as_str();
        let eol = if text.ends_with("\r\n") {
            2
        } else if text.ends_with(['\n', '\r']) {
            1
        } else {
            0
        };
        self.derive(self.start, self.end - eol)
    }

    /// Lines of this view, each including its line terminator.
    pub fn lines(&self) -> Lines {
        Lines { rest: self.clone() }
    }
}

/// Iterator returned by [`SourceView::lines`].
pub struct Lines {
    rest: SourceView,
}

impl Iterator for Lines {
    type Item = SourceView;

    fn next(&mut self) -> Option<SourceView> {
        if self.rest.is_empty() {
            return None;
        }
        let text = self.rest.as_str();
        let len = match text.find(['\r', '\n']) {
            Some(i) if text[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
            None => text.len(),
        };
        let line = self.rest.derive(self.rest.start, self.rest.start + len);
        self.rest = self.rest.derive(line.end, self.rest.end);
        Some(line)
    }
}

fn check_range(base: &str, start: usize, end: usize) -> Result<()> {
    if start > end || end > base.len() {
        return Err(SequenceError::OutOfRange {
            start,
            end,
            len: base.len(),
        });
    }
    check_boundary(base, start)?;
    check_boundary(base, end)
}

fn check_boundary(base: &str, offset: usize) -> Result<()> {
    if base.is_char_boundary(offset) {
        Ok(())
    } else {
        Err(SequenceError::NotCharBoundary { offset })
    }
}

fn char_at_boundary(text: &str, index: usize) -> char {
    if !text.is_char_boundary(index) {
        return '\0';
    }
    text[index..].chars().next().unwrap_or('\0')
}

impl PartialEq for SourceView {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for SourceView {}

impl PartialEq<str> for SourceView {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SourceView {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for SourceView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl AsRef<str> for SourceView {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SourceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for SourceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceView")
            .field("range", &self.source_range())
            .field("text", &self.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn base(text: &str) -> Arc<str> {
        Arc::from(text)
    }

    #[rstest]
    #[case("hello world", 0, 11)]
    #[case("hello world", 6, 11)]
    #[case("hello world", 3, 3)]
    #[case("", 0, 0)]
    fn test_of_range_slices_text(#[case] text: &str, #[case] start: usize, #[case] end: usize) {
        let view = SourceView::of_range(text, start, end).unwrap();
        assert_eq!(view.len(), end - start);
        for k in 0..view.len() {
            assert_eq!(
                view.char_at(k).unwrap(),
                text[start + k..].chars().next().unwrap()
            );
        }
    }

    #[rstest]
    #[case(3, 2)]
    #[case(0, 12)]
    #[case(12, 12)]
    fn test_of_range_rejects_bad_ranges(#[case] start: usize, #[case] end: usize) {
        assert!(matches!(
            SourceView::of_range("hello world", start, end),
            Err(SequenceError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_of_from_starts_at_offset() {
        let view = SourceView::of_from("hello world", 6).unwrap();
        assert_eq!(view, "world");
        assert_eq!(view.start_offset(), 6);
    }

    #[test]
    fn test_rejects_offsets_inside_a_char() {
        // "é" is two bytes
        assert_eq!(
            SourceView::of_range("café", 0, 4).unwrap_err(),
            SequenceError::NotCharBoundary { offset: 4 }
        );
        let view = SourceView::of("café");
        assert!(view.char_at(4).is_err());
        assert_eq!(view.safe_char_at(4), '\0');
        assert_eq!(view.char_at(3).unwrap(), 'é');
    }

    #[test]
    fn test_sub_sequence_uses_relative_indices() {
        let view = SourceView::of_range("hello world", 6, 11).unwrap();
        let sub = view.sub_sequence(1, 3).unwrap();
        assert_eq!(sub, "or");
        assert_eq!(sub.source_range(), 7..9);
        assert!(view.sub_sequence(2, 6).is_err());
        assert!(view.sub_sequence(3, 2).is_err());
    }

    #[test]
    fn test_base_sub_sequence_reaches_outside_view() {
        let view = SourceView::of_range("hello world", 6, 11).unwrap();
        let grown = view.base_sub_sequence(0, 11).unwrap();
        assert_eq!(grown, "hello world");
        assert!(grown.same_base(&view));
    }

    #[test]
    fn test_base_sub_sequence_round_trips() {
        let view = SourceView::of("hello world").sub_sequence(2, 9).unwrap();
        let again = view
            .base_sub_sequence(view.start_offset(), view.end_offset())
            .unwrap();
        assert_eq!(again, view);
        assert_eq!(again.source_range(), view.source_range());
    }

    #[test]
    fn test_safe_accessors_never_fail() {
        let view = SourceView::of_range("abcdef", 2, 4).unwrap();
        assert_eq!(view.safe_char_at(0), 'c');
        assert_eq!(view.safe_char_at(-1), '\0');
        assert_eq!(view.safe_char_at(2), '\0');
        assert_eq!(view.safe_base_char_at(1), 'b');
        assert_eq!(view.safe_base_char_at(5), 'f');
        assert_eq!(view.safe_base_char_at(6), '\0');
        assert_eq!(view.safe_base_char_at(-3), '\0');
    }

    #[test]
    fn test_empty_prefix_and_suffix_anchor_at_bounds() {
        let view = SourceView::of_range("abcdef", 2, 4).unwrap();
        assert_eq!(view.empty_prefix().source_range(), 2..2);
        assert_eq!(view.empty_suffix().source_range(), 4..4);
    }

    #[test]
    fn test_adjacent_views_splice() {
        let text = base("hello, world");
        let v1 = SourceView::of_range(Arc::clone(&text), 0, 5).unwrap();
        let v2 = SourceView::of_range(Arc::clone(&text), 5, 9).unwrap();
        assert!(v1.is_continued_by(&v2));
        assert!(v2.is_continuation_of(&v1));
        assert!(!v2.is_continued_by(&v1));

        let spliced = v1.splice_at_end(&v2);
        assert_eq!(spliced, SourceView::of_range(text, 0, 9).unwrap());
        assert_eq!(spliced.source_range(), 0..9);
    }

    #[test]
    #[should_panic(expected = "does not continue")]
    fn test_splice_of_non_adjacent_views_panics() {
        let text = base("hello, world");
        let v1 = SourceView::of_range(Arc::clone(&text), 0, 5).unwrap();
        let v2 = SourceView::of_range(text, 6, 9).unwrap();
        let _ = v1.splice_at_end(&v2);
    }

    #[test]
    fn test_try_splice_reports_non_continuation() {
        let text = base("hello, world");
        let v1 = SourceView::of_range(Arc::clone(&text), 0, 5).unwrap();
        let v2 = SourceView::of_range(text, 6, 9).unwrap();
        assert_eq!(
            v1.try_splice_at_end(&v2).unwrap_err(),
            SequenceError::NotContinuation { end: 5, start: 6 }
        );
    }

    #[test]
    #[should_panic(expected = "different base buffers")]
    fn test_interval_algebra_requires_same_base() {
        let a = SourceView::of("same text");
        let b = SourceView::of("same text");
        let _ = a.contains_all_of(&b);
    }

    #[test]
    fn test_interval_algebra() {
        let view = SourceView::of("0123456789");
        let mid = view.sub_sequence(3, 7).unwrap();
        let left = view.sub_sequence(1, 4).unwrap();
        let right = view.sub_sequence(8, 10).unwrap();

        assert!(view.contains_all_of(&mid));
        assert!(!mid.contains_all_of(&view));
        assert!(mid.contains_some_of(&left));
        assert!(!mid.contains_some_of(&right));

        assert_eq!(mid.intersect(&left), "3");
        assert_eq!(mid.intersect(&right).source_range(), 7..7);
        assert_eq!(mid.prefix_of(&view.sub_sequence(5, 6).unwrap()), "34");
        assert_eq!(mid.prefix_of(&left).source_range(), 3..3);
        assert_eq!(mid.suffix_of(&left), "456");
        assert_eq!(mid.suffix_of(&right).source_range(), 7..7);
    }

    #[test]
    fn test_trimming_keeps_base() {
        let view = SourceView::of("  item \t\n");
        assert_eq!(view.trim(), "item");
        assert_eq!(view.trim().source_range(), 2..6);
        assert_eq!(view.trim_start(), "item \t\n");
        assert_eq!(view.trim_end(), "  item");
        assert_eq!(view.trim_eol(), "  item \t");
        assert_eq!(SourceView::of("a\r\n").trim_eol(), "a");
    }

    #[test]
    fn test_lines_keep_their_terminators() {
        let view = SourceView::of("one\ntwo\r\nthree\rfour");
        let lines: Vec<String> = view.lines().map(|l| l.to_string()).collect();
        assert_eq!(lines, vec!["one\n", "two\r\n", "three\r", "four"]);
        assert_eq!(view.lines().nth(1).unwrap().source_range(), 4..9);
    }

    #[test]
    fn test_equality_is_by_content() {
        let a = SourceView::of("abc abc");
        let left = a.sub_sequence(0, 3).unwrap();
        let right = a.sub_sequence(4, 7).unwrap();
        assert_eq!(left, right);
        assert_eq!(left, "abc");
        assert_ne!(left.source_range(), right.source_range());
    }
}
