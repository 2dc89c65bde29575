//! Caret tracking through view derivation.
//!
//! A view may carry one tracked absolute offset (typically an editor caret)
//! plus a bias. Every view derived from it inherits the anchor, and can report
//! where the anchor falls relative to its own range.

use crate::error::{Result, SequenceError};

use super::SourceView;

/// Which side a tracked offset sticks to when it sits exactly on a view boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerDirection {
    /// Inclusive at both boundaries.
    #[default]
    None,
    /// Belongs to the text before the offset.
    Left,
    /// Belongs to the text after the offset.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrackedOffset {
    pub(crate) offset: usize,
    pub(crate) direction: TrackerDirection,
}

impl SourceView {
    /// A copy of this view tracking relative `index` with the given bias.
    pub fn track_index(&self, index: usize, direction: TrackerDirection) -> Result<Self> {
        let offset = self.index_offset(index)?;
        if !self.base_str().is_char_boundary(offset) {
            return Err(SequenceError::NotCharBoundary { offset });
        }
        let mut tracked = self.clone();
        tracked.tracked = Some(TrackedOffset { offset, direction });
        Ok(tracked)
    }

    /// A copy of this view that tracks nothing.
    pub fn without_tracking(&self) -> Self {
        let mut view = self.clone();
        view.tracked = None;
        view
    }

    pub fn is_tracking(&self) -> bool {
        self.tracked.is_some()
    }

    /// Position of the tracked anchor relative to this view, or `None` when
    /// nothing is tracked or the anchor lies outside.
    ///
    /// An anchor on a boundary counts as inside unless its bias points away
    /// from the view: a `Left` anchor at the start belongs to the text before,
    /// a `Right` anchor at the end belongs to the text after. When there is no
    /// text on that side (start of base, end of base) the anchor stays inside.
    pub fn tracked_index(&self) -> Option<usize> {
        let TrackedOffset { offset, direction } = self.tracked?;
        let (start, end) = (self.start_offset(), self.end_offset());
        if offset < start || offset > end {
            return None;
        }
        if start == end {
            return Some(0);
        }
        if offset == start && direction == TrackerDirection::Left && start > 0 {
            return None;
        }
        if offset == end
            && direction == TrackerDirection::Right
            && end < self.base_str().len()
        {
            return None;
        }
        Some(offset - start)
    }

    /// `start_offset + tracked_index`, clamped to `max_offset`.
    ///
    /// Maps the anchor into another coordinate space, such as the output
    /// buffer a formatter is writing this view into.
    pub fn tracked_offset(&self, start_offset: usize, max_offset: usize) -> Option<usize> {
        self.tracked_index()
            .map(|index| (start_offset + index).min(max_offset))
    }
}
