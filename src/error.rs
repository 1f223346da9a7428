//! Error taxonomy for encode and archive operations.
//!
//! Every encode error is fatal for the operation in progress: the consuming
//! games crash on malformed (type, flag) pairs, so the encoder aborts rather
//! than emit a file the game would reject. The scanner never returns these;
//! it skips unparsable candidates instead.

/// Error type for mesh encoding and archive editing.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Malformed palette or export configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A vertex color has no exact match in the palette. No nearest-neighbor
    /// fallback exists; approximated indices would render wrong in-game.
    #[error("color ({0}, {1}, {2}) has no exact match in the palette")]
    ColorNotFound(u8, u8, u8),

    /// A scaled coordinate or count does not fit its output field.
    #[error("out of range: {0}")]
    Range(String),

    /// A face does not meet the requirements of its category
    /// (e.g. a textured face without UV coordinates).
    #[error("unsupported face: {0}")]
    UnsupportedFace(String),

    /// An archive record extends past the end of the buffer.
    #[error("truncated record at offset {0}")]
    Truncated(usize),

    /// No OBJX record exists at the requested index.
    #[error("no OBJX record at index {0}")]
    NoSuchObject(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
