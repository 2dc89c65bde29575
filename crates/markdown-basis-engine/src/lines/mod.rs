//! Line-oriented output classification.
//!
//! A formatter writes fragments into a [`LineWriter`], which finalizes each
//! line into a [`LineBuffer`] of [`LineInfo`] records: prefix and text
//! lengths, running offset sums, blank flags and preformatted-run state.

mod buffer;
mod info;
mod writer;

pub use buffer::LineBuffer;
pub use info::{LineInfo, Preformatted};
pub use writer::LineWriter;
