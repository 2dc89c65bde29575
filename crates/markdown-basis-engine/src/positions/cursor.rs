use super::{Position, PositionTracker};

/// Walks a [`PositionTracker`] while the caller mutates it between steps.
///
/// The cursor holds a position on the slot it will visit next. Each step
/// yields a position for the current slot and re-registers the next one just
/// after it, so elements inserted at or immediately after the current slot
/// are not visited by this walk. Removing the current element is fine: the
/// walk continues with whatever followed it.
///
/// ```
/// use markdown_basis_engine::PositionTracker;
///
/// let mut tracker: PositionTracker<u32> = vec![1, 2, 3].into();
/// let mut cursor = tracker.cursor();
/// let mut seen = Vec::new();
/// while let Some(position) = cursor.next(&tracker) {
///     let value = *tracker.element(&position).unwrap();
///     seen.push(value);
///     // values inserted right after the current one are not revisited
///     tracker.insert(position.index() + 1, value * 10).unwrap();
/// }
/// assert_eq!(seen, vec![1, 2, 3]);
/// assert_eq!(tracker.items(), &[1, 10, 2, 20, 3, 30]);
/// ```
#[derive(Debug)]
pub struct PositionCursor {
    next: Position,
}

impl PositionCursor {
    pub(super) fn new(next: Position) -> Self {
        Self { next }
    }

    /// Position of the next unvisited element, or `None` at the end.
    ///
    /// # Panics
    /// If `tracker` is not the tracker this cursor was created from.
    pub fn next<T>(&mut self, tracker: &PositionTracker<T>) -> Option<Position> {
        tracker.assert_owns(&self.next);
        let index = self.next.index();
        if index >= tracker.len() {
            return None;
        }
        self.next = tracker.register(index + 1);
        Some(tracker.register(index))
    }
}
