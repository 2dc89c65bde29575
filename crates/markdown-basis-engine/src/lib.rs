pub mod error;
pub mod format;
pub mod lines;
pub mod positions;
pub mod sequence;

// Re-export key types for easier usage
pub use error::{Result, SequenceError};
pub use format::{
    FormatOptions, FormattedDocument, TaskItemCase, TaskListItemPlacement, format_document,
};
pub use lines::{LineBuffer, LineInfo, LineWriter, Preformatted};
pub use positions::{Position, PositionCursor, PositionTracker};
pub use sequence::{LineColumn, MappedSegment, RangeMapper, SourceView, TrackerDirection};
