use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{trace, warn};

use crate::error::{Result, SequenceError};

use super::arena::{PositionArena, SlotKey, SlotState};
use super::cursor::PositionCursor;

/// A live handle to a slot of a [`PositionTracker`].
///
/// The index follows its element through insertions and removals elsewhere in
/// the collection. When the element itself is removed the position becomes
/// invalid and stays pinned to where the element used to be.
///
/// Holding a position does not keep the tracker alive: once the tracker is
/// dropped every position reports invalid at index 0.
pub struct Position {
    arena: Weak<RefCell<PositionArena>>,
    key: SlotKey,
}

impl Position {
    fn state(&self) -> SlotState {
        self.arena
            .upgrade()
            .and_then(|arena| arena.borrow().get(self.key))
            .unwrap_or(SlotState {
                index: 0,
                valid: false,
            })
    }

    pub fn index(&self) -> usize {
        self.state().index
    }

    pub fn is_valid(&self) -> bool {
        self.state().valid
    }

    /// The index while the element is still present.
    pub fn valid_index(&self) -> Option<usize> {
        let state = self.state();
        state.valid.then_some(state.index)
    }

    fn belongs_to(&self, arena: &Rc<RefCell<PositionArena>>) -> bool {
        std::ptr::eq(self.arena.as_ptr(), Rc::as_ptr(arena))
    }
}

impl Clone for Position {
    fn clone(&self) -> Self {
        let arena = self.arena.upgrade();
        let state = arena.as_ref().and_then(|arena| arena.borrow().get(self.key));
        match (arena, state) {
            (Some(arena), Some(state)) => Position {
                key: arena.borrow_mut().register(state),
                arena: Rc::downgrade(&arena),
            },
            _ => Position {
                arena: Weak::new(),
                key: self.key,
            },
        }
    }
}

impl Drop for Position {
    fn drop(&mut self) {
        let Some(arena) = self.arena.upgrade() else {
            return;
        };
        match arena.try_borrow_mut() {
            Ok(mut arena) => arena.release(self.key),
            Err(_) => {
                debug_assert!(false, "position dropped while its tracker is borrowed");
                warn!("position slot leaked: tracker borrowed during drop");
            }
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Position")
            .field("index", &state.index)
            .field("valid", &state.valid)
            .finish()
    }
}

/// An ordered collection whose outstanding [`Position`]s stay in step with it.
pub struct PositionTracker<T> {
    items: Vec<T>,
    arena: Rc<RefCell<PositionArena>>,
}

impl<T> Default for PositionTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for PositionTracker<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            arena: Rc::default(),
        }
    }
}

impl<T> FromIterator<T> for PositionTracker<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> PositionTracker<T> {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Registers a position at `index`, which may equal `len()`.
    pub fn position(&self, index: usize) -> Result<Position> {
        if index > self.items.len() {
            return Err(SequenceError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.register(index))
    }

    pub(super) fn register(&self, index: usize) -> Position {
        let key = self
            .arena
            .borrow_mut()
            .register(SlotState { index, valid: true });
        Position {
            arena: Rc::downgrade(&self.arena),
            key,
        }
    }

    /// Position of the first slot (the end position when empty).
    pub fn first(&self) -> Position {
        self.register(0)
    }

    pub fn last(&self) -> Result<Position> {
        match self.items.len() {
            0 => Err(SequenceError::IndexOutOfRange { index: 0, len: 0 }),
            len => Ok(self.register(len - 1)),
        }
    }

    /// Position one past the last element; follows appends.
    pub fn end(&self) -> Position {
        self.register(self.items.len())
    }

    /// Number of registered positions still held somewhere.
    pub fn live_positions(&self) -> usize {
        self.arena.borrow().live()
    }

    /// Cursor over the live collection; see [`PositionCursor`].
    pub fn cursor(&self) -> PositionCursor {
        PositionCursor::new(self.first())
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.items.get(index).ok_or(SequenceError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(SequenceError::IndexOutOfRange { index, len })
    }

    pub fn get_or_none(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Element at `index` viewed as a particular kind; `None` when out of
    /// range or when `kind` rejects the element.
    ///
    /// ```
    /// use markdown_basis_engine::PositionTracker;
    ///
    /// enum Node { Text(String), Break }
    /// fn text(node: &Node) -> Option<&str> {
    ///     match node {
    ///         Node::Text(text) => Some(text.as_str()),
    ///         Node::Break => None,
    ///     }
    /// }
    ///
    /// let tracker: PositionTracker<Node> = vec![Node::Break, Node::Text("a".into())].into();
    /// assert_eq!(tracker.get_or_none_as(1, text), Some("a"));
    /// assert!(tracker.get_or_none_as(0, text).is_none());
    /// ```
    pub fn get_or_none_as<'a, U: ?Sized>(
        &'a self,
        index: usize,
        kind: impl FnOnce(&'a T) -> Option<&'a U>,
    ) -> Option<&'a U> {
        self.items.get(index).and_then(kind)
    }

    pub fn add(&mut self, value: T) {
        let at = self.items.len();
        self.items.push(value);
        self.inserted(at, 1);
    }

    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.check_insert(index)?;
        self.items.insert(index, value);
        self.inserted(index, 1);
        Ok(())
    }

    pub fn add_all(&mut self, values: impl IntoIterator<Item = T>) {
        let at = self.items.len();
        self.items.extend(values);
        self.inserted(at, self.items.len() - at);
    }

    pub fn insert_all(&mut self, index: usize, values: impl IntoIterator<Item = T>) -> Result<()> {
        self.check_insert(index)?;
        let before = self.items.len();
        self.items.splice(index..index, values);
        self.inserted(index, self.items.len() - before);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<T> {
        let len = self.items.len();
        if index >= len {
            return Err(SequenceError::IndexOutOfRange { index, len });
        }
        let value = self.items.remove(index);
        self.removed(index, 1);
        Ok(value)
    }

    /// Removes `[start, end)`, returning the removed elements in order.
    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<Vec<T>> {
        let len = self.items.len();
        if start > end || end > len {
            return Err(SequenceError::OutOfRange { start, end, len });
        }
        let values: Vec<T> = self.items.drain(start..end).collect();
        self.removed(start, end - start);
        Ok(values)
    }

    /// Replaces the element at `index` without renumbering and returns the
    /// old one. `index == len()` appends instead, and returns `None`.
    pub fn set(&mut self, index: usize, value: T) -> Result<Option<T>> {
        let len = self.items.len();
        match index {
            i if i < len => Ok(Some(std::mem::replace(&mut self.items[i], value))),
            i if i == len => {
                self.add(value);
                Ok(None)
            }
            _ => Err(SequenceError::IndexOutOfRange { index, len }),
        }
    }

    /// Empties the collection; every position becomes invalid at index 0.
    pub fn clear(&mut self) {
        self.items.clear();
        let detached = self.arena.borrow_mut().detach_all();
        trace!("clear detached {detached} positions");
    }

    /// The element a position refers to, if it is still present.
    ///
    /// # Panics
    /// If `position` was registered with a different tracker.
    pub fn element(&self, position: &Position) -> Option<&T> {
        self.assert_owns(position);
        position
            .valid_index()
            .and_then(|index| self.items.get(index))
    }

    /// Inserts before the slot `position` refers to (or used to refer to).
    ///
    /// # Panics
    /// If `position` was registered with a different tracker.
    pub fn insert_before(&mut self, position: &Position, value: T) -> Result<()> {
        self.assert_owns(position);
        self.insert(position.index(), value)
    }

    /// Removes the element `position` refers to; `None` if it is already gone.
    ///
    /// # Panics
    /// If `position` was registered with a different tracker.
    pub fn remove_at(&mut self, position: &Position) -> Option<T> {
        self.assert_owns(position);
        let index = position.valid_index()?;
        self.remove(index).ok()
    }

    pub(super) fn assert_owns(&self, position: &Position) {
        assert!(
            position.belongs_to(&self.arena),
            "position was registered with a different tracker"
        );
    }

    fn check_insert(&self, index: usize) -> Result<()> {
        if index > self.items.len() {
            return Err(SequenceError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn inserted(&mut self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        let shifted = self.arena.borrow_mut().inserted(at, count);
        trace!("inserted {count} at {at}, renumbered {shifted} positions");
    }

    fn removed(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        let touched = self.arena.borrow_mut().removed(start, count);
        trace!("removed {count} at {start}, renumbered {touched} positions");
    }
}

impl<T: fmt::Debug> fmt::Debug for PositionTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionTracker")
            .field("items", &self.items)
            .field("live_positions", &self.live_positions())
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a PositionTracker<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
