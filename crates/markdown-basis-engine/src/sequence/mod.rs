//! Zero-copy views over a shared source buffer.
//!
//! A [`SourceView`] is the unit every parser and formatter stage passes
//! around: a byte range over an `Arc<str>` that remembers where it came from.
//! Derived text (unescaped, normalized) is produced on demand, and a
//! [`RangeMapper`] records how synthesized offsets map back to the source.

mod coords;
mod escape;
mod extend;
mod mapper;
mod tracking;
mod view;

pub use coords::LineColumn;
pub use mapper::{MappedSegment, RangeMapper};
pub use tracking::TrackerDirection;
pub use view::{Lines, SourceView};

/// Line terminator used by the single-convention line helpers.
pub const EOL: char = '\n';

/// Either line terminator, for the `_any_eol` helpers.
pub const ANY_EOL: &str = "\r\n";

/// Blank characters within a line.
pub const SPACE_TAB: &str = " \t";

/// Everything `trim` removes.
pub const WHITESPACE: &str = " \t\r\n";

/// Column width of a tab stop.
pub const TAB_WIDTH: usize = 4;
