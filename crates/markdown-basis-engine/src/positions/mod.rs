//! Stable handles into a collection that is being rewritten.
//!
//! A [`PositionTracker`] owns an ordered `Vec<T>` and an arena of the
//! [`Position`]s handed out for it. Insertions and removals renumber every
//! live position so that it keeps pointing at the same element, or reports
//! that its element is gone.

mod arena;
mod cursor;
mod tracker;

pub use cursor::PositionCursor;
pub use tracker::{Position, PositionTracker};
