/// Errors raised by the checked operations of the engine.
///
/// Precondition failures (mixing views over different base buffers,
/// splicing non-adjacent views) are not represented here: they panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("range [{start}, {end}) out of bounds for length {len}")]
    OutOfRange {
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("offset {offset} is not on a char boundary")]
    NotCharBoundary { offset: usize },
    #[error(
        "line length {length} shorter than prefix {prefix_length} plus text {text_length}"
    )]
    InvalidLine {
        prefix_length: usize,
        text_length: usize,
        length: usize,
    },
    #[error("invalid preformatted state: {0}")]
    InvalidPreformatted(String),
    #[error("view starting at {start} does not continue a view ending at {end}")]
    NotContinuation { end: usize, start: usize },
}

pub type Result<T> = std::result::Result<T, SequenceError>;
