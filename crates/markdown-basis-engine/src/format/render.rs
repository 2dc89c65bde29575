use log::trace;

use crate::error::Result;
use crate::lines::{LineBuffer, LineWriter};
use crate::sequence::{SourceView, TAB_WIDTH};

use super::FormatOptions;
use super::document::{Block, List, ListItem};
use super::tasklist;

/// Writes a block tree back out as Markdown.
///
/// Text comes straight from the blocks' source views; only list markers,
/// task markers and container indentation are regenerated.
pub(crate) struct Renderer<'o> {
    out: LineWriter,
    options: &'o FormatOptions,
}

impl<'o> Renderer<'o> {
    pub(crate) fn new(options: &'o FormatOptions) -> Self {
        Self {
            out: LineWriter::new(options.max_blank_lines),
            options,
        }
    }

    pub(crate) fn finish(self) -> Result<(String, LineBuffer)> {
        self.out.finish()
    }

    /// Renders `blocks` whose source lines are indented by `indent` columns
    /// of container indentation.
    pub(crate) fn blocks(&mut self, blocks: &[Block], indent: usize, separate: bool) -> Result<()> {
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 && separate {
                self.out.blank_line()?;
            }
            self.block(block, indent)?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block, indent: usize) -> Result<()> {
        match block {
            Block::Paragraph(view) | Block::Heading(view) => self.text(view),
            Block::CodeBlock(view) => {
                self.out.open_preformatted()?;
                self.verbatim(view, indent)?;
                self.out.close_preformatted()
            }
            Block::Other(view) => self.verbatim(view, indent),
            Block::List(list) => self.list(list),
        }
    }

    /// Paragraph text: leading indentation is insignificant and dropped.
    fn text(&mut self, view: &SourceView) -> Result<()> {
        for line in view.trim().lines() {
            self.out.append(line.trim_start().trim_eol().as_str())?;
            self.out.line()?;
        }
        Ok(())
    }

    /// Source lines as they are, minus the container indentation.
    fn verbatim(&mut self, view: &SourceView, indent: usize) -> Result<()> {
        for line in view.prefix_with_indent_all().trim_end().lines() {
            let line = strip_indent(&line.trim_eol(), indent)?;
            self.out.append(line.as_str())?;
            self.out.append("\n")?;
        }
        Ok(())
    }

    fn list(&mut self, list: &List) -> Result<()> {
        let items = tasklist::arrange(&list.items, self.options)?;
        for (ordinal, item) in items.into_iter().enumerate() {
            if ordinal > 0 && list.loose {
                self.out.blank_line()?;
            }
            self.item(list, item, ordinal)?;
        }
        Ok(())
    }

    fn item(&mut self, list: &List, item: &ListItem, ordinal: usize) -> Result<()> {
        let marker = match list.start {
            Some(start) => {
                let delimiter = item.marker.as_str().chars().last().unwrap_or('.');
                format!("{}{delimiter}", start + ordinal as u64)
            }
            None => item.marker.to_string(),
        };
        let first = match tasklist::task_marker(item, self.options) {
            Some(task) => format!("{marker} {task} "),
            None => format!("{marker} "),
        };
        trace!("item {first:?} at {}", item.view.base_line_column_at_start());

        if item.children.iter().all(is_empty) {
            self.out.append(first.trim_end())?;
            return self.out.line();
        }
        let rest = " ".repeat(marker.len() + 1);
        self.out.push_prefix_first(&first, &rest);
        self.blocks(&item.children, item.content_column, list.loose)?;
        self.out.line()?;
        self.out.pop_prefix();
        Ok(())
    }
}

fn is_empty(block: &Block) -> bool {
    matches!(block, Block::Paragraph(view) if view.trim().is_empty())
}

/// Drops up to `columns` columns of leading blanks.
fn strip_indent(line: &SourceView, columns: usize) -> Result<SourceView> {
    let mut width = 0;
    let mut offset = 0;
    for c in line.chars() {
        if width >= columns {
            break;
        }
        match c {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH - width % TAB_WIDTH,
            _ => break,
        }
        offset += 1;
    }
    line.sub_sequence_from(offset)
}
