//! Growing a view into the surrounding base text.
//!
//! Extension never fails: when nothing matches, the view comes back unchanged.

use log::trace;

use super::{ANY_EOL, SPACE_TAB, SourceView, TAB_WIDTH};

impl SourceView {
    /// Grows the end over the maximal run of chars in `chars`.
    pub fn extend_by_any(&self, chars: &str) -> Self {
        self.extend_by_any_max(chars, usize::MAX)
    }

    /// Grows the end over a run of chars in `chars`, at most `max_count` of them.
    pub fn extend_by_any_max(&self, chars: &str, max_count: usize) -> Self {
        let grown: usize = self.base_str()[self.end_offset()..]
            .chars()
            .take(max_count)
            .take_while(|c| chars.contains(*c))
            .map(char::len_utf8)
            .sum();
        self.with_end(self.end_offset() + grown)
    }

    /// Grows the end by one char if it is in `chars`.
    pub fn extend_by_one_of_any(&self, chars: &str) -> Self {
        self.extend_by_any_max(chars, 1)
    }

    /// Grows the end up to and including the first char in `chars`.
    pub fn extend_to_any(&self, chars: &str) -> Self {
        self.extend_to_any_max(chars, usize::MAX)
    }

    /// Like [`extend_to_any`](Self::extend_to_any), but gives up (returning
    /// the view unchanged) if no match occurs within `max_count` chars.
    pub fn extend_to_any_max(&self, chars: &str, max_count: usize) -> Self {
        let mut end = self.end_offset();
        for c in self.base_str()[end..].chars().take(max_count) {
            end += c.len_utf8();
            if chars.contains(c) {
                return self.with_end(end);
            }
        }
        self.clone()
    }

    pub fn extend_to_end_of_line(&self, include_eol: bool) -> Self {
        self.extend_to_end_of_line_with(ANY_EOL, include_eol)
    }

    /// Grows the end to the next char in `eol_chars` (or the end of the base).
    ///
    /// With `include_eol` the terminator itself is taken too; a `\r\n` pair
    /// counts as one terminator when both chars are in `eol_chars`.
    pub fn extend_to_end_of_line_with(&self, eol_chars: &str, include_eol: bool) -> Self {
        if self.chars().next_back().is_some_and(|c| eol_chars.contains(c)) {
            return self.clone();
        }
        let base = self.base_str();
        let rest = &base[self.end_offset()..];
        let Some((i, c)) = rest.char_indices().find(|(_, c)| eol_chars.contains(*c)) else {
            return self.with_end(base.len());
        };
        let eol_start = self.end_offset() + i;
        if !include_eol {
            return self.with_end(eol_start);
        }
        let crlf = c == '\r' && eol_chars.contains('\n') && base[eol_start..].starts_with("\r\n");
        let eol_len = if crlf { 2 } else { c.len_utf8() };
        self.with_end(eol_start + eol_len)
    }

    pub fn extend_to_start_of_line(&self, include_eol: bool) -> Self {
        self.extend_to_start_of_line_with(ANY_EOL, include_eol)
    }

    /// Grows the start back to just after the previous char in `eol_chars`
    /// (or the start of the base). With `include_eol` the preceding
    /// terminator is taken too.
    pub fn extend_to_start_of_line_with(&self, eol_chars: &str, include_eol: bool) -> Self {
        if self.chars().next().is_some_and(|c| eol_chars.contains(c)) {
            return self.clone();
        }
        let base = self.base_str();
        let before = &base[..self.start_offset()];
        let Some((i, c)) = before
            .char_indices()
            .rev()
            .find(|(_, c)| eol_chars.contains(*c))
        else {
            return self.with_start(0);
        };
        if !include_eol {
            return self.with_start(i + c.len_utf8());
        }
        let crlf = c == '\n' && eol_chars.contains('\r') && base[..i].ends_with('\r');
        self.with_start(if crlf { i - 1 } else { i })
    }

    /// Grows the start backward over spaces and tabs preceding the view,
    /// taking at most `max_columns` columns of indentation.
    ///
    /// Columns are counted from the start of the line with tabs advancing to
    /// the next multiple of four, so a tab may be worth one to four columns.
    /// A whitespace char that would overshoot the cap is not taken.
    pub fn prefix_with_indent(&self, max_columns: usize) -> Self {
        let base = self.base_str();
        let start = self.start_offset();
        let line_start = base[..start].rfind(['\r', '\n']).map_or(0, |i| i + 1);

        // column before each char of the line prefix
        let mut columns = Vec::new();
        let mut column = 0;
        for (i, c) in base[line_start..start].char_indices() {
            columns.push((line_start + i, c, column));
            column = match c {
                '\t' => column + TAB_WIDTH - column % TAB_WIDTH,
                _ => column + 1,
            };
        }
        let start_column = column;

        let mut new_start = start;
        for &(offset, c, column) in columns.iter().rev() {
            if !SPACE_TAB.contains(c) || start_column - column > max_columns {
                break;
            }
            new_start = offset;
        }
        trace!(
            "prefix_with_indent: {}..{} grew back to {}",
            start,
            self.end_offset(),
            new_start
        );
        self.with_start(new_start)
    }

    /// [`prefix_with_indent`](Self::prefix_with_indent) without a column cap.
    pub fn prefix_with_indent_all(&self) -> Self {
        self.prefix_with_indent(usize::MAX)
    }

    fn with_end(&self, end: usize) -> Self {
        if end == self.end_offset() {
            self.clone()
        } else {
            self.derive(self.start_offset(), end)
        }
    }

    fn with_start(&self, start: usize) -> Self {
        if start == self.start_offset() {
            self.clone()
        } else {
            self.derive(start, self.end_offset())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn view(text: &str, start: usize, end: usize) -> SourceView {
        SourceView::of_range(text, start, end).unwrap()
    }

    #[rstest]
    #[case("ab***cd", 2, usize::MAX, "***")]
    #[case("ab***cd", 2, 2, "**")]
    #[case("ab***cd", 0, usize::MAX, "")]
    #[case("ab***", 2, usize::MAX, "***")]
    fn test_extend_by_any_takes_a_run(
        #[case] text: &str,
        #[case] at: usize,
        #[case] max: usize,
        #[case] grown: &str,
    ) {
        let empty = view(text, at, at);
        assert_eq!(empty.extend_by_any_max("*", max), grown);
    }

    #[test]
    fn test_extend_by_one_of_any_takes_one() {
        let v = view("--x", 0, 0);
        assert_eq!(v.extend_by_one_of_any("-"), "-");
        assert_eq!(v.extend_by_any("-"), "--");
    }

    #[test]
    fn test_extend_to_any_stops_after_first_match() {
        let v = view("[link](url) rest", 0, 1);
        assert_eq!(v.extend_to_any("]"), "[link]");
        assert_eq!(v.extend_to_any(")]"), "[link]");
        assert_eq!(v.extend_to_any("#"), "[");
        assert_eq!(v.extend_to_any_max("]", 3), "[");
        assert_eq!(v.extend_to_any_max("]", 5), "[link]");
    }

    #[rstest]
    #[case("abc\ndef", false, "bc")]
    #[case("abc\ndef", true, "bc\n")]
    #[case("abc\r\ndef", false, "bc")]
    #[case("abc\r\ndef", true, "bc\r\n")]
    #[case("abc", true, "bc")]
    fn test_extend_to_end_of_line(#[case] text: &str, #[case] include: bool, #[case] out: &str) {
        assert_eq!(view(text, 1, 2).extend_to_end_of_line(include), out);
    }

    #[test]
    fn test_extend_to_end_of_line_is_noop_when_touching_eol() {
        let v = view("ab\ncd", 0, 3);
        let grown = v.extend_to_end_of_line(true);
        assert_eq!(grown.source_range(), 0..3);
    }

    #[test]
    fn test_extend_to_end_of_line_with_single_convention() {
        let v = view("ab\r\ncd", 0, 1);
        assert_eq!(v.extend_to_end_of_line_with("\n", false), "ab\r");
        assert_eq!(v.extend_to_end_of_line_with("\r", true), "ab\r");
    }

    #[rstest]
    #[case("abc\ndef", false, 4)]
    #[case("abc\ndef", true, 3)]
    #[case("abc\r\ndef", true, 3)]
    #[case("abc\r\ndef", false, 5)]
    fn test_extend_to_start_of_line(
        #[case] text: &str,
        #[case] include: bool,
        #[case] start: usize,
    ) {
        let end = text.len();
        let grown = view(text, end - 1, end).extend_to_start_of_line(include);
        assert_eq!(grown.source_range(), start..end);
    }

    #[test]
    fn test_extend_to_start_of_line_reaches_base_start() {
        assert_eq!(view("abc", 2, 3).extend_to_start_of_line(true), "abc");
    }

    #[rstest]
    // four spaces, cap at 2 columns
    #[case("    x", 2, "  x")]
    #[case("    x", 4, "    x")]
    #[case("    x", 10, "    x")]
    // a tab from column 0 is worth four columns
    #[case("\tx", 3, "x")]
    #[case("\tx", 4, "\tx")]
    // after two spaces the tab is only worth two
    #[case("  \tx", 2, "\tx")]
    #[case("  \tx", 3, " \tx")]
    #[case("  \tx", 4, "  \tx")]
    fn test_prefix_with_indent_honours_tab_stops(
        #[case] line: &str,
        #[case] max: usize,
        #[case] out: &str,
    ) {
        let text = format!("para\n{line}");
        let x = text.len() - 1;
        let grown = view(&text, x, x + 1).prefix_with_indent(max);
        assert_eq!(grown, out);
    }

    #[test]
    fn test_prefix_with_indent_stops_at_non_blank() {
        let v = view("- \titem", 3, 7);
        assert_eq!(v.prefix_with_indent_all(), " \titem");
    }
}
