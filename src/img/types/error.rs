//! Custom error types for the img-reader crate.

use thiserror::Error;

use super::filetypes::SubFileType;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum ImgError {
    /// An error originating from I/O operations, including short reads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The disk-image signature or the vendor identifier did not match.
    #[error("Not a Garmin IMG file: bad {field} {found:?}")]
    InvalidSignature {
        field: &'static str,
        found: String,
    },

    /// The header or directory is structurally invalid or uses an unsupported layout.
    #[error("Unsupported or invalid IMG file: {0}")]
    InvalidFormat(String),

    /// The directory was read but none of its tiles passed validation.
    #[error("No usable map tile found")]
    NoUsableTile,

    /// A tile lacks a sub-file it cannot work without.
    #[error("Missing {0} sub-file")]
    MissingSubFile(SubFileType),

    /// A sub-file payload could not be interpreted by its decoder.
    #[error("Invalid {kind} sub-file: {reason}")]
    InvalidSubFile {
        kind: SubFileType,
        reason: String,
    },

    /// An offset points outside of a sub-file's block chain.
    #[error("Offset {offset:#x} out of bounds for {context} of {len} bytes")]
    OutOfBounds {
        context: &'static str,
        offset: u64,
        len: u64,
    },

    /// A lookup by tile name found nothing.
    #[error("No tile named '{0}'")]
    UnknownTile(String),
}

/// A convenience `Result` type alias using the crate's `ImgError` type.
pub type Result<T> = std::result::Result<T, ImgError>;
