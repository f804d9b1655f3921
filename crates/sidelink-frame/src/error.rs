/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer ended in the middle of a length-prefixed string.
    #[error("frame truncated at byte {offset}")]
    Truncated { offset: usize },

    /// A string exceeds the 2-byte length prefix range.
    #[error("field too long ({len} bytes, max {max})")]
    FieldTooLong { len: usize, max: usize },

    /// A field is not valid UTF-8.
    #[error("field is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A recognized tag carried the wrong number of fields.
    #[error("tag {tag:?} expects {expected} fields, got {actual}")]
    Arity {
        tag: String,
        expected: usize,
        actual: usize,
    },

    /// A player name contains the packed-list separator and cannot be
    /// represented in a roster response.
    #[error("player name {name:?} contains the reserved separator")]
    ReservedSeparator { name: String },

    /// The frame contains no strings at all (not even a tag).
    #[error("empty frame")]
    EmptyFrame,
}

pub type Result<T> = std::result::Result<T, FrameError>;
