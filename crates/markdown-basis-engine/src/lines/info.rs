use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{Result, SequenceError};

/// Where a line sits relative to a preformatted run (a code block).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preformatted {
    #[default]
    None,
    First,
    Body,
    Last,
}

impl Preformatted {
    pub fn as_str(self) -> &'static str {
        match self {
            Preformatted::None => "none",
            Preformatted::First => "first",
            Preformatted::Body => "body",
            Preformatted::Last => "last",
        }
    }
}

impl TryFrom<u8> for Preformatted {
    type Error = SequenceError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Preformatted::None),
            1 => Ok(Preformatted::First),
            2 => Ok(Preformatted::Body),
            3 => Ok(Preformatted::Last),
            other => Err(SequenceError::InvalidPreformatted(other.to_string())),
        }
    }
}

impl FromStr for Preformatted {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Preformatted::None),
            "first" => Ok(Preformatted::First),
            "body" => Ok(Preformatted::Body),
            "last" => Ok(Preformatted::Last),
            other => Err(SequenceError::InvalidPreformatted(other.to_string())),
        }
    }
}

impl fmt::Display for Preformatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finalized output line: `prefix`, then `text`, then any end-of-line.
///
/// The running sums include this line, so `sum_length() - length()` is the
/// offset at which the line starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    index: usize,
    prefix_length: usize,
    text_length: usize,
    length: usize,
    sum_prefix_length: usize,
    sum_text_length: usize,
    sum_length: usize,
    blank_prefix: bool,
    blank_text: bool,
    preformatted: Preformatted,
}

impl LineInfo {
    /// The first line of a buffer.
    ///
    /// `blank_prefix`/`blank_text` mark whitespace-only parts; an empty part
    /// is blank regardless of the flag.
    pub fn first(
        prefix_length: usize,
        text_length: usize,
        length: usize,
        blank_prefix: bool,
        blank_text: bool,
        preformatted: Preformatted,
    ) -> Result<Self> {
        Self::chained(
            None,
            prefix_length,
            text_length,
            length,
            blank_prefix,
            blank_text,
            preformatted,
        )
    }

    /// The line following `self`, with sums carried over.
    pub fn next(
        &self,
        prefix_length: usize,
        text_length: usize,
        length: usize,
        blank_prefix: bool,
        blank_text: bool,
        preformatted: Preformatted,
    ) -> Result<Self> {
        Self::chained(
            Some(self),
            prefix_length,
            text_length,
            length,
            blank_prefix,
            blank_text,
            preformatted,
        )
    }

    fn chained(
        prev: Option<&LineInfo>,
        prefix_length: usize,
        text_length: usize,
        length: usize,
        blank_prefix: bool,
        blank_text: bool,
        preformatted: Preformatted,
    ) -> Result<Self> {
        let invalid = || SequenceError::InvalidLine {
            prefix_length,
            text_length,
            length,
        };
        let content = prefix_length.checked_add(text_length).ok_or_else(invalid)?;
        if length < content {
            return Err(invalid());
        }
        let (index, sum_prefix, sum_text, sum) = prev.map_or((0, 0, 0, 0), |p| {
            (
                p.index + 1,
                p.sum_prefix_length,
                p.sum_text_length,
                p.sum_length,
            )
        });
        Ok(Self {
            index,
            prefix_length,
            text_length,
            length,
            sum_prefix_length: sum_prefix.checked_add(prefix_length).ok_or_else(invalid)?,
            sum_text_length: sum_text.checked_add(text_length).ok_or_else(invalid)?,
            sum_length: sum.checked_add(length).ok_or_else(invalid)?,
            blank_prefix: blank_prefix || prefix_length == 0,
            blank_text: blank_text || text_length == 0,
            preformatted,
        })
    }

    pub(crate) fn with_preformatted(mut self, preformatted: Preformatted) -> Self {
        self.preformatted = preformatted;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    pub fn text_length(&self) -> usize {
        self.text_length
    }

    /// Full length including the end-of-line.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn sum_prefix_length(&self) -> usize {
        self.sum_prefix_length
    }

    pub fn sum_text_length(&self) -> usize {
        self.sum_text_length
    }

    pub fn sum_length(&self) -> usize {
        self.sum_length
    }

    /// Offset of the line's first byte in the whole output.
    pub fn start_offset(&self) -> usize {
        self.sum_length - self.length
    }

    pub fn end_offset(&self) -> usize {
        self.sum_length
    }

    pub fn is_blank_prefix(&self) -> bool {
        self.blank_prefix
    }

    pub fn is_blank_text(&self) -> bool {
        self.blank_text
    }

    /// Blank line, even when a whitespace-only prefix is present.
    pub fn is_blank_text_and_prefix(&self) -> bool {
        self.blank_prefix && self.blank_text
    }

    pub fn preformatted(&self) -> Preformatted {
        self.preformatted
    }

    pub fn is_preformatted(&self) -> bool {
        self.preformatted != Preformatted::None
    }

    pub fn ends_with_eol(&self) -> bool {
        self.prefix_length + self.text_length < self.length
    }

    pub fn eol_length(&self) -> usize {
        self.length - self.prefix_length - self.text_length
    }

    /// Start of the text within the line, past the prefix.
    pub fn text_start(&self) -> usize {
        self.prefix_length
    }

    pub fn text_end(&self) -> usize {
        self.prefix_length + self.text_length
    }

    pub fn text_range(&self) -> Range<usize> {
        self.text_start()..self.text_end()
    }
}

impl fmt::Display for LineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineInfo{{i={}, pl={}, tl={}, l={}, sumPl={}, sumTl={}, sumL={}",
            self.index,
            self.prefix_length,
            self.text_length,
            self.length,
            self.sum_prefix_length,
            self.sum_text_length,
            self.sum_length
        )?;
        if self.blank_prefix {
            f.write_str(", bp")?;
        }
        if self.blank_text {
            f.write_str(", bt")?;
        }
        if self.ends_with_eol() {
            f.write_str(", eol")?;
        }
        if self.is_preformatted() {
            write!(f, ", {}", self.preformatted)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_sums_chain_through_lines() {
        let first = LineInfo::first(0, 0, 1, true, true, Preformatted::None).unwrap();
        let second = first.next(2, 3, 6, false, false, Preformatted::None).unwrap();
        assert_eq!(second.index(), 1);
        assert_eq!(second.sum_prefix_length(), 2);
        assert_eq!(second.sum_text_length(), 3);
        assert_eq!(second.sum_length(), 7);
        assert_eq!(second.start_offset(), 1);
        assert!(first.is_blank_text_and_prefix());
        assert!(!second.is_blank_text_and_prefix());
    }

    #[test]
    fn test_empty_parts_are_blank_regardless_of_flags() {
        let line = LineInfo::first(0, 4, 5, false, false, Preformatted::None).unwrap();
        assert!(line.is_blank_prefix());
        assert!(!line.is_blank_text());

        let indented_blank = LineInfo::first(2, 0, 3, true, false, Preformatted::None).unwrap();
        assert!(indented_blank.is_blank_text_and_prefix());
    }

    #[test]
    fn test_text_range_excludes_prefix_and_eol() {
        let line = LineInfo::first(2, 3, 7, false, false, Preformatted::None).unwrap();
        assert_eq!(line.text_range(), 2..5);
        assert!(line.ends_with_eol());
        assert_eq!(line.eol_length(), 2);

        let unterminated = LineInfo::first(0, 3, 3, false, false, Preformatted::None).unwrap();
        assert!(!unterminated.ends_with_eol());
    }

    #[test]
    fn test_rejects_length_shorter_than_content() {
        assert_eq!(
            LineInfo::first(2, 3, 4, false, false, Preformatted::None).unwrap_err(),
            SequenceError::InvalidLine {
                prefix_length: 2,
                text_length: 3,
                length: 4
            }
        );
    }

    #[test]
    fn test_overflowing_lengths_are_rejected() {
        assert!(matches!(
            LineInfo::first(usize::MAX, 2, 5, false, false, Preformatted::None),
            Err(SequenceError::InvalidLine { .. })
        ));

        let huge = LineInfo::first(0, 0, usize::MAX, true, true, Preformatted::None).unwrap();
        assert_eq!(
            huge.next(0, 1, 1, true, false, Preformatted::None).unwrap_err(),
            SequenceError::InvalidLine {
                prefix_length: 0,
                text_length: 1,
                length: 1
            }
        );
    }

    #[rstest]
    #[case(0, Preformatted::None)]
    #[case(1, Preformatted::First)]
    #[case(2, Preformatted::Body)]
    #[case(3, Preformatted::Last)]
    fn test_preformatted_from_u8_and_name(#[case] raw: u8, #[case] expected: Preformatted) {
        assert_eq!(Preformatted::try_from(raw).unwrap(), expected);
        assert_eq!(expected.as_str().parse::<Preformatted>().unwrap(), expected);
    }

    #[test]
    fn test_preformatted_rejects_unknown_values() {
        assert!(matches!(
            Preformatted::try_from(4),
            Err(SequenceError::InvalidPreformatted(_))
        ));
        assert!("FIRST".parse::<Preformatted>().is_err());
    }

    #[test]
    fn test_display_lists_flags() {
        let line = LineInfo::first(0, 0, 1, true, true, Preformatted::First).unwrap();
        assert_eq!(
            line.to_string(),
            "LineInfo{i=0, pl=0, tl=0, l=1, sumPl=0, sumTl=0, sumL=1, bp, bt, eol, first}"
        );
    }
}
