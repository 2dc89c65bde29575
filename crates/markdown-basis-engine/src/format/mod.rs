//! Task-list aware Markdown re-rendering.
//!
//! The formatter parses a document into blocks that are views over the
//! source, reorders task list items according to [`FormatOptions`], and
//! writes everything back through a [`LineWriter`](crate::lines::LineWriter)
//! so the output comes with its line classification.

mod document;
mod render;
mod tasklist;

use std::collections::HashMap;

use log::debug;

use crate::error::Result;
use crate::lines::LineBuffer;
use crate::sequence::SourceView;

pub use document::{Block, List, ListItem, TaskState, parse_blocks};
pub use tasklist::{TaskItemCase, TaskListItemPlacement};

use render::Renderer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub task_list_item_placement: TaskListItemPlacement,
    pub task_list_item_case: TaskItemCase,
    /// Sort incomplete items by descending priority.
    pub prioritized_task_items: bool,
    /// Priority of a task item by its bullet marker.
    pub task_item_priorities: HashMap<char, i32>,
    /// Priority of bullet markers missing from `task_item_priorities`.
    pub default_task_item_priority: i32,
    pub ordered_task_item_priority: i32,
    pub max_blank_lines: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            task_list_item_placement: TaskListItemPlacement::default(),
            task_list_item_case: TaskItemCase::default(),
            prioritized_task_items: false,
            task_item_priorities: HashMap::from([('+', 1), ('*', 0), ('-', -1)]),
            default_task_item_priority: 0,
            ordered_task_item_priority: 0,
            max_blank_lines: 1,
        }
    }
}

/// Output of [`format_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDocument {
    pub text: String,
    pub lines: LineBuffer,
}

impl FormattedDocument {
    /// Text of line `index` without its prefix or end of line.
    pub fn line_text(&self, index: usize) -> Option<&str> {
        let line = self.lines.line(index)?;
        let start = line.start_offset();
        self.text.get(start + line.text_start()..start + line.text_end())
    }
}

/// Re-renders `source` with task list items arranged per `options`.
pub fn format_document(source: &str, options: &FormatOptions) -> Result<FormattedDocument> {
    let source = SourceView::of(source);
    let blocks = parse_blocks(&source)?;
    debug!("formatting {} top-level blocks", blocks.len());

    let mut renderer = Renderer::new(options);
    renderer.blocks(&blocks, 0, true)?;
    let (text, lines) = renderer.finish()?;
    Ok(FormattedDocument { text, lines })
}
