//! Text synthesis: unescaping and end-of-line normalization.
//!
//! Each operation borrows the view's text when nothing needs rewriting and
//! can record offset provenance into a [`RangeMapper`].

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use super::{RangeMapper, SourceView};

fn backslash_escape() -> &'static Regex {
    static BACKSLASH_ESCAPE: OnceLock<Regex> = OnceLock::new();
    BACKSLASH_ESCAPE
        .get_or_init(|| Regex::new(r"\\[!-/:-@\[-`{-~]").expect("Invalid escape regex"))
}

fn escape_or_entity() -> &'static Regex {
    static ESCAPE_OR_ENTITY: OnceLock<Regex> = OnceLock::new();
    ESCAPE_OR_ENTITY.get_or_init(|| {
        Regex::new(
            r"\\[!-/:-@\[-`{-~]|&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});",
        )
        .expect("Invalid entity regex")
    })
}

impl SourceView {
    /// Drops backslashes before ASCII punctuation and decodes entity references.
    pub fn unescape(&self) -> Cow<'_, str> {
        self.unescape_with(true, None)
    }

    /// Drops backslashes before ASCII punctuation, leaving `&...;` untouched.
    pub fn unescape_no_entities(&self) -> Cow<'_, str> {
        self.unescape_with(false, None)
    }

    /// [`unescape`](Self::unescape), recording provenance into `mapper`.
    pub fn unescape_mapped(&self, mapper: &mut RangeMapper) -> Cow<'_, str> {
        self.unescape_with(true, Some(mapper))
    }

    fn unescape_with(&self, entities: bool, mapper: Option<&mut RangeMapper>) -> Cow<'_, str> {
        let text = self.as_str();
        let pattern = if entities {
            escape_or_entity()
        } else {
            backslash_escape()
        };
        let mut out = Synthesizer::new(text, self.start_offset(), mapper);
        for found in pattern.find_iter(text) {
            let matched = found.as_str();
            if let Some(escaped) = matched.strip_prefix('\\') {
                out.replace(found.start(), found.end(), escaped);
                continue;
            }
            // unknown entity names decode to themselves and stay verbatim
            let decoded = html_escape::decode_html_entities(matched);
            if decoded != matched {
                out.replace(found.start(), found.end(), &decoded);
            }
        }
        out.finish()
    }

    /// Rewrites `\r\n` and lone `\r` to `\n`.
    pub fn normalize_eol(&self, mapper: &mut RangeMapper) -> Cow<'_, str> {
        self.normalize_eol_with(false, mapper)
    }

    /// [`normalize_eol`](Self::normalize_eol), then appends `\n` to non-empty
    /// text that does not already end a line.
    pub fn normalize_end_with_eol(&self, mapper: &mut RangeMapper) -> Cow<'_, str> {
        self.normalize_eol_with(true, mapper)
    }

    fn normalize_eol_with(&self, terminate: bool, mapper: &mut RangeMapper) -> Cow<'_, str> {
        let text = self.as_str();
        let mut out = Synthesizer::new(text, self.start_offset(), Some(mapper));
        let mut from = 0;
        while let Some(found) = text[from..].find('\r') {
            let at = from + found;
            let end = if text[at..].starts_with("\r\n") {
                at + 2
            } else {
                at + 1
            };
            out.replace(at, end, "\n");
            from = end;
        }
        if terminate && !text.is_empty() && !text.ends_with(['\n', '\r']) {
            out.replace(text.len(), text.len(), "\n");
        }
        out.finish()
    }
}

/// Copy-on-write builder that only allocates once the first replacement lands.
struct Synthesizer<'a, 'm> {
    text: &'a str,
    offset: usize,
    copied: usize,
    out: Option<String>,
    mapper: Option<&'m mut RangeMapper>,
}

impl<'a, 'm> Synthesizer<'a, 'm> {
    fn new(text: &'a str, offset: usize, mapper: Option<&'m mut RangeMapper>) -> Self {
        Self {
            text,
            offset,
            copied: 0,
            out: None,
            mapper,
        }
    }

    /// Replaces relative `[start, end)` with `with`. Calls arrive in order.
    fn replace(&mut self, start: usize, end: usize, with: &str) {
        let out = self
            .out
            .get_or_insert_with(|| String::with_capacity(self.text.len() + 1));
        out.push_str(&self.text[self.copied..start]);
        out.push_str(with);
        if let Some(mapper) = self.mapper.as_deref_mut() {
            mapper.push_original(self.offset + self.copied, self.offset + start);
            mapper.push_replacement(self.offset + start, self.offset + end, with.len());
        }
        self.copied = end;
    }

    fn finish(mut self) -> Cow<'a, str> {
        if let Some(mapper) = self.mapper.as_deref_mut() {
            mapper.push_original(self.offset + self.copied, self.offset + self.text.len());
        }
        match self.out {
            None => Cow::Borrowed(self.text),
            Some(mut out) => {
                out.push_str(&self.text[self.copied..]);
                Cow::Owned(out)
            }
        }
    }
}
