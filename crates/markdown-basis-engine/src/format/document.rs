//! Block tree carved out of the source as [`SourceView`]s.
//!
//! pulldown-cmark supplies the structure and the byte range of every block;
//! each block keeps a view over its own source text instead of a copy.
//!
//! # Event flow for task lists
//!
//! ```markdown
//! - [ ] open
//!   - [x] done
//! ```
//! produces `Start(List)`, `Start(Item)`, `TaskListMarker(false)`,
//! `Text("open")`, `Start(List)`, `Start(Item)`, `TaskListMarker(true)`, ...
//! Tight items carry their text directly; loose items wrap it in a
//! `Paragraph`, which may hold the task marker itself.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::error::Result;
use crate::sequence::{SPACE_TAB, SourceView, TAB_WIDTH};

const DIGITS: &str = "0123456789";
const BULLETS: &str = "-+*";
const ORDERED_DELIMITERS: &str = ".)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(SourceView),
    Heading(SourceView),
    CodeBlock(SourceView),
    List(List),
    /// Anything rendered verbatim: quotes, tables, HTML, rules.
    Other(SourceView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub view: SourceView,
    /// First number of an ordered list.
    pub start: Option<u64>,
    /// Items separated by blank lines.
    pub loose: bool,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn is_ordered(&self) -> bool {
        self.start.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub view: SourceView,
    /// `-`, `+`, `*`, or digits followed by `.` or `)`.
    pub marker: SourceView,
    pub task: Option<TaskState>,
    /// Column at which the item's content starts in the source.
    pub content_column: usize,
    pub children: Vec<Block>,
}

impl ListItem {
    pub fn is_ordered(&self) -> bool {
        self.marker.as_str().ends_with(['.', ')'])
    }

    pub fn is_task(&self) -> bool {
        self.task.is_some()
    }

    pub fn is_incomplete_task(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.done)
    }

    pub fn is_complete_task(&self) -> bool {
        self.task.as_ref().is_some_and(|task| task.done)
    }
}

/// The `[ ]` / `[x]` marker of a task item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    pub view: SourceView,
    pub done: bool,
}

/// Parses `source` into blocks whose views share its base.
pub fn parse_blocks(source: &SourceView) -> Result<Vec<Block>> {
    let options =
        Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source.as_str(), options);
    BlockBuilder {
        source,
        events: parser.into_offset_iter(),
        task_marker: None,
    }
    .blocks()
}

struct BlockBuilder<'a, I> {
    source: &'a SourceView,
    events: I,
    /// A task marker found while skipping over a block's inner events.
    task_marker: Option<(bool, Range<usize>)>,
}

impl<'a, I> BlockBuilder<'a, I>
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    fn blocks(mut self) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        while let Some((event, range)) = self.events.next() {
            match event {
                Event::Start(tag) => blocks.push(self.block(tag, range)?),
                Event::Rule => blocks.push(Block::Other(self.view(range)?)),
                _ => {}
            }
        }
        Ok(blocks)
    }

    fn block(&mut self, tag: Tag<'a>, range: Range<usize>) -> Result<Block> {
        let view = self.view(range)?;
        let block = match tag {
            Tag::List(start) => return Ok(Block::List(self.list(view, start)?)),
            Tag::Paragraph => Block::Paragraph(view),
            Tag::Heading { .. } => Block::Heading(view),
            Tag::CodeBlock(_) => Block::CodeBlock(view),
            _ => Block::Other(view),
        };
        self.skip_to_end();
        Ok(block)
    }

    fn list(&mut self, view: SourceView, start: Option<u64>) -> Result<List> {
        let mut items = Vec::new();
        let mut loose = false;
        while let Some((event, range)) = self.events.next() {
            match event {
                Event::Start(Tag::Item) => {
                    let (item, has_paragraphs) = self.item(range)?;
                    loose |= has_paragraphs;
                    items.push(item);
                }
                Event::End(TagEnd::List(_)) => break,
                _ => {}
            }
        }
        Ok(List {
            view,
            start,
            loose,
            items,
        })
    }

    /// Builds an item; the flag reports whether its text came in paragraphs.
    fn item(&mut self, range: Range<usize>) -> Result<(ListItem, bool)> {
        let view = self.view(range)?;
        let marker = list_marker(&view);
        let content_column = content_column(&marker);
        let mut task = None;
        let mut children = Vec::new();
        let mut inline: Option<Range<usize>> = None;
        let mut has_paragraphs = false;
        self.task_marker = None;

        while let Some((event, range)) = self.events.next() {
            match event {
                Event::End(TagEnd::Item) => break,
                Event::TaskListMarker(done) => {
                    task = Some(TaskState {
                        view: self.view(range)?,
                        done,
                    });
                }
                Event::Start(tag) if is_inline(&tag) => {
                    extend(&mut inline, range);
                    self.skip_to_end();
                }
                Event::Start(tag) => {
                    self.flush_inline(&mut inline, &mut children)?;
                    has_paragraphs |= matches!(tag, Tag::Paragraph);
                    children.push(self.block(tag, range)?);
                    if task.is_none()
                        && children.len() == 1
                        && let Some((done, range)) = self.task_marker.take()
                    {
                        task = Some(TaskState {
                            view: self.view(range)?,
                            done,
                        });
                    }
                }
                Event::Rule => {
                    self.flush_inline(&mut inline, &mut children)?;
                    children.push(Block::Other(self.view(range)?));
                }
                Event::End(_) => {}
                _ => extend(&mut inline, range),
            }
        }
        self.flush_inline(&mut inline, &mut children)?;

        // a marker inside the first paragraph is not part of its text
        if let (Some(task), Some(Block::Paragraph(first))) = (&task, children.first_mut())
            && first.contains_all_of(&task.view)
        {
            *first = first.suffix_of(&task.view).trim_start();
        }

        let item = ListItem {
            view,
            marker,
            task,
            content_column,
            children,
        };
        Ok((item, has_paragraphs))
    }

    fn flush_inline(
        &self,
        inline: &mut Option<Range<usize>>,
        children: &mut Vec<Block>,
    ) -> Result<()> {
        if let Some(range) = inline.take() {
            children.push(Block::Paragraph(self.view(range)?));
        }
        Ok(())
    }

    /// Consumes events up to the end of the block just started.
    fn skip_to_end(&mut self) {
        let mut depth = 0usize;
        for (event, range) in self.events.by_ref() {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => return,
                Event::End(_) => depth -= 1,
                Event::TaskListMarker(done) if self.task_marker.is_none() => {
                    self.task_marker = Some((done, range));
                }
                _ => {}
            }
        }
    }

    fn view(&self, range: Range<usize>) -> Result<SourceView> {
        self.source.sub_sequence(range.start, range.end)
    }
}

fn is_inline(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn extend(span: &mut Option<Range<usize>>, range: Range<usize>) {
    *span = Some(match span.take() {
        Some(span) => span.start.min(range.start)..span.end.max(range.end),
        None => range,
    });
}

fn list_marker(item: &SourceView) -> SourceView {
    let at = item.trim_start().empty_prefix();
    let digits = at.extend_by_any(DIGITS);
    if digits.is_empty() {
        at.extend_by_one_of_any(BULLETS)
    } else {
        digits.extend_by_one_of_any(ORDERED_DELIMITERS)
    }
}

/// Column of the first content char after `marker`: one to four blanks after
/// it count as the gap, more (or none, or an empty item) count as one.
fn content_column(marker: &SourceView) -> usize {
    let base = marker.base_str();
    let line_start = marker.base_start_of_line_any_eol();
    let marker_end = visual_width(&base[line_start..marker.end_offset()]);
    let gap_view = marker.empty_suffix().extend_by_any(SPACE_TAB);
    let gap = visual_width(&base[line_start..gap_view.end_offset()]) - marker_end;
    let at_eol = matches!(
        gap_view.safe_base_char_at(gap_view.end_offset() as isize),
        '\0' | '\r' | '\n'
    );
    if gap == 0 || gap > 4 || at_eol {
        marker_end + 1
    } else {
        marker_end + gap
    }
}

/// Display width with tabs advancing to the next tab stop.
pub(crate) fn visual_width(text: &str) -> usize {
    text.chars().fold(0, |column, c| match c {
        '\t' => column + TAB_WIDTH - column % TAB_WIDTH,
        _ => column + 1,
    })
}
