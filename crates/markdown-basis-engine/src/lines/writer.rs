use log::{debug, trace};

use crate::error::Result;

use super::{LineBuffer, Preformatted};

#[derive(Debug, Clone)]
struct Prefix {
    /// Used for the next line only, then `rest` takes over.
    first: Option<String>,
    rest: String,
}

/// Assembles text fragments into classified output lines.
///
/// Text is written into a pending line; ending the line prepends the current
/// prefix stack and records a [`LineInfo`](super::LineInfo). Blank lines are
/// rate-limited outside preformatted runs, and trailing blank lines are
/// dropped by [`finish`](Self::finish).
#[derive(Debug)]
pub struct LineWriter {
    text: String,
    lines: LineBuffer,
    prefixes: Vec<Prefix>,
    pending: String,
    max_blank_lines: usize,
    preformatted_depth: usize,
    run_lines: usize,
    /// Consecutive blank-text lines at the end, whatever their prefix.
    trailing_blanks: usize,
}

impl Default for LineWriter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl LineWriter {
    pub fn new(max_blank_lines: usize) -> Self {
        Self {
            text: String::new(),
            lines: LineBuffer::new(),
            prefixes: Vec::new(),
            pending: String::new(),
            max_blank_lines,
            preformatted_depth: 0,
            run_lines: 0,
            trailing_blanks: 0,
        }
    }

    /// Output finalized so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &LineBuffer {
        &self.lines
    }

    pub fn is_pending_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pushes a prefix applied to every following line.
    pub fn push_prefix(&mut self, prefix: &str) {
        self.prefixes.push(Prefix {
            first: None,
            rest: prefix.to_string(),
        });
    }

    /// Pushes a prefix whose next line gets `first` and later lines `rest`,
    /// as a list item marker followed by its continuation indent.
    pub fn push_prefix_first(&mut self, first: &str, rest: &str) {
        self.prefixes.push(Prefix {
            first: Some(first.to_string()),
            rest: rest.to_string(),
        });
    }

    pub fn pop_prefix(&mut self) {
        self.prefixes.pop();
    }

    /// Appends text to the pending line. Each `\n` ends a line, blank or not.
    pub fn append(&mut self, text: &str) -> Result<()> {
        for piece in text.split_inclusive('\n') {
            match piece.strip_suffix('\n') {
                Some(content) => {
                    self.pending.push_str(content.strip_suffix('\r').unwrap_or(content));
                    self.end_line()?;
                }
                None => self.pending.push_str(piece),
            }
        }
        Ok(())
    }

    /// Ends the pending line if it has any text.
    pub fn line(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.end_line()
    }

    /// Ends the pending line, then adds a blank line unless that would exceed
    /// `max_blank_lines` consecutive blanks or precede all content.
    pub fn blank_line(&mut self) -> Result<()> {
        self.line()?;
        if self.preformatted_depth > 0 {
            return self.end_line();
        }
        if self.lines.is_empty() || self.trailing_blanks >= self.max_blank_lines {
            return Ok(());
        }
        self.end_line()
    }

    /// Starts a preformatted run; its lines are classified and never
    /// blank-limited.
    pub fn open_preformatted(&mut self) -> Result<()> {
        self.line()?;
        if self.preformatted_depth == 0 {
            self.run_lines = 0;
        }
        self.preformatted_depth += 1;
        Ok(())
    }

    /// Ends a preformatted run, marking its final line as the last.
    pub fn close_preformatted(&mut self) -> Result<()> {
        self.line()?;
        self.preformatted_depth = self.preformatted_depth.saturating_sub(1);
        if self.preformatted_depth == 0 {
            if self.run_lines > 1 {
                self.lines.set_last_preformatted(Preformatted::Last);
            }
            debug!("preformatted run of {} lines", self.run_lines);
        }
        Ok(())
    }

    /// Ends the pending line, drops trailing blank lines and returns the
    /// output with its line classification.
    pub fn finish(mut self) -> Result<(String, LineBuffer)> {
        self.line()?;
        if self.trailing_blanks > 0 {
            let keep = self.lines.len() - self.trailing_blanks;
            self.lines.truncate(keep);
            self.text.truncate(self.lines.total_length());
        }
        Ok((self.text, self.lines))
    }

    fn end_line(&mut self) -> Result<()> {
        let blank_text = self.pending.trim().is_empty();
        let preformatted = self.classify();
        // blank lines outside a run keep a pending first-line prefix for the content
        let blank = blank_text && preformatted == Preformatted::None;

        let mut prefix = String::new();
        for entry in &mut self.prefixes {
            match entry.first.as_deref() {
                Some(first) if !blank => prefix.push_str(first),
                _ => prefix.push_str(&entry.rest),
            }
            if !blank {
                entry.first = None;
            }
        }
        if blank {
            self.pending.clear();
            self.trailing_blanks += 1;
        } else {
            self.trailing_blanks = 0;
        }
        if self.pending.is_empty() {
            prefix.truncate(prefix.trim_end().len());
        }

        let blank_prefix = prefix.trim().is_empty();
        self.lines.append_line(
            prefix.len(),
            self.pending.len(),
            prefix.len() + self.pending.len() + 1,
            blank_prefix,
            blank_text,
            preformatted,
        )?;
        trace!("line {:?}{:?}", prefix, self.pending);
        self.text.push_str(&prefix);
        self.text.push_str(&self.pending);
        self.text.push('\n');
        self.pending.clear();
        Ok(())
    }

    fn classify(&mut self) -> Preformatted {
        if self.preformatted_depth == 0 {
            return Preformatted::None;
        }
        self.run_lines += 1;
        if self.run_lines == 1 {
            Preformatted::First
        } else {
            Preformatted::Body
        }
    }
}
