use std::cmp::Reverse;

use log::debug;

use crate::error::Result;
use crate::positions::PositionTracker;

use super::FormatOptions;
use super::document::{Block, ListItem};

/// Where task items go when a list is re-rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskListItemPlacement {
    #[default]
    AsIs,
    /// Incomplete tasks first, everything else after them.
    IncompleteFirst,
    /// Like `IncompleteFirst`, also pulling forward items whose nested lists
    /// hold incomplete tasks.
    IncompleteNestedFirst,
    /// `IncompleteFirst`, and completed tasks lose their marker.
    CompleteToNonTask,
    /// `IncompleteNestedFirst`, and completed tasks lose their marker.
    CompleteNestedToNonTask,
}

impl TaskListItemPlacement {
    fn is_nested(self) -> bool {
        matches!(self, Self::IncompleteNestedFirst | Self::CompleteNestedToNonTask)
    }

    fn drops_complete_marker(self) -> bool {
        matches!(self, Self::CompleteToNonTask | Self::CompleteNestedToNonTask)
    }
}

/// Case of the `x` in a completed task marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskItemCase {
    #[default]
    AsIs,
    Lowercase,
    Uppercase,
}

/// Orders `items` for output: incomplete first, optionally by priority.
///
/// Items are moved through a [`PositionTracker`]: a cursor walks the list
/// while a boundary position marks where the next incomplete item goes, and
/// both stay on their elements as items are taken out and put back.
pub(crate) fn arrange<'a>(
    items: &'a [ListItem],
    options: &FormatOptions,
) -> Result<Vec<&'a ListItem>> {
    let placement = options.task_list_item_placement;
    let mut tracker: PositionTracker<&ListItem> = items.iter().collect();
    if placement == TaskListItemPlacement::AsIs {
        return Ok(tracker.into_items());
    }

    let nested = placement.is_nested();
    let mut boundary = tracker.first();
    let mut cursor = tracker.cursor();
    while let Some(position) = cursor.next(&tracker) {
        let Some(&item) = tracker.element(&position) else {
            continue;
        };
        if !is_incomplete(item, nested) {
            continue;
        }
        if position.index() == boundary.index() {
            boundary = tracker.position(position.index() + 1)?;
        } else if let Some(item) = tracker.remove_at(&position) {
            debug!("moving item {} before {}", position.index(), boundary.index());
            tracker.insert_before(&boundary, item)?;
        }
    }

    if options.prioritized_task_items {
        let mut incomplete = tracker.remove_range(0, boundary.index())?;
        incomplete.sort_by_key(|item| Reverse(item_priority(item, options)));
        tracker.insert_all(0, incomplete)?;
    }
    Ok(tracker.into_items())
}

/// The task marker text to render, or `None` for no marker.
pub(crate) fn task_marker(item: &ListItem, options: &FormatOptions) -> Option<String> {
    let task = item.task.as_ref()?;
    if task.done && options.task_list_item_placement.drops_complete_marker() {
        return None;
    }
    let text = task.view.as_str();
    Some(match options.task_list_item_case {
        TaskItemCase::AsIs => text.to_string(),
        TaskItemCase::Lowercase => text.to_lowercase(),
        TaskItemCase::Uppercase => text.to_uppercase(),
    })
}

fn is_incomplete(item: &ListItem, nested: bool) -> bool {
    item.is_incomplete_task() || (nested && has_incomplete_descendants(&item.children))
}

fn has_incomplete_descendants(blocks: &[Block]) -> bool {
    blocks.iter().any(|block| match block {
        Block::List(list) => list
            .items
            .iter()
            .any(|item| item.is_incomplete_task() || has_incomplete_descendants(&item.children)),
        _ => false,
    })
}

/// Highest priority among the incomplete tasks in the item's subtree.
pub(crate) fn item_priority(item: &ListItem, options: &FormatOptions) -> i32 {
    let own = if item.is_incomplete_task() {
        task_priority(item, options)
    } else {
        i32::MIN
    };
    item.children
        .iter()
        .filter_map(|block| match block {
            Block::List(list) => Some(list),
            _ => None,
        })
        .flat_map(|list| &list.items)
        .map(|child| item_priority(child, options))
        .fold(own, i32::max)
}

fn task_priority(item: &ListItem, options: &FormatOptions) -> i32 {
    if item.is_ordered() {
        return options.ordered_task_item_priority;
    }
    item.marker
        .as_str()
        .chars()
        .next()
        .and_then(|marker| options.task_item_priorities.get(&marker).copied())
        .unwrap_or(options.default_task_item_priority)
}
