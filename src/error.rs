use std::io;

//===========================================================================//

/// Errors produced while reading or writing an ICO container.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A header field holds a value the format forbids, or the directory
    /// describes payloads that overlap each other.
    #[error("Malformed ICO container: {0}")]
    Format(String),

    /// The source ended before the header and directory were complete.
    #[error(
        "Truncated ICO container (needed {needed} bytes for the header and \
         directory, but only {available} are available)"
    )]
    Truncated {
        /// Bytes required by the declared entry count.
        needed: u64,
        /// Bytes actually present.
        available: u64,
    },

    /// An entry index was outside `0..count`.
    #[error("Entry index {index} is out of range (container has {count})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of entries in the directory.
        count: usize,
    },

    /// A directory record points past the end of the source.
    #[error(
        "Payload of entry {index} is out of range (offset {offset} + size \
         {size} exceeds source length {source_len})"
    )]
    PayloadOutOfRange {
        /// Index of the offending directory record.
        index: usize,
        /// Declared payload offset.
        offset: u32,
        /// Declared payload size.
        size: u32,
        /// Total length of the source, in bytes.
        source_len: u64,
    },

    /// A width can't be stored in the single-byte directory field.
    #[error("Width of entry {index} is {width}, but must be in 1..=255")]
    WidthOverflow {
        /// Index of the offending entry.
        index: usize,
        /// The requested width.
        width: u32,
    },

    /// A height can't be stored in the single-byte directory field.
    #[error("Height of entry {index} is {height}, but must be in 1..=255")]
    HeightOverflow {
        /// Index of the offending entry.
        index: usize,
        /// The requested height.
        height: u32,
    },

    /// There was nothing to write.
    #[error("Refusing to write an ICO container with no entries")]
    EmptyInput,

    /// More entries than the 16-bit count field can describe.
    #[error("Too many entries (was {count}, but max is {})", u16::MAX)]
    TooManyEntries {
        /// The number of entries requested.
        count: usize,
    },

    /// A payload (or the offset it would land at) doesn't fit in 32 bits.
    #[error("Payload of entry {index} ({size} bytes) doesn't fit in the file")]
    PayloadTooLarge {
        /// Index of the offending entry.
        index: usize,
        /// Length of its payload.
        size: usize,
    },

    /// Decoding or encoding an embedded picture failed.
    #[error("Image error: {0}")]
    Image(String),

    /// The underlying source or sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::Format(_) => ErrorKind::Format,
            Error::Truncated { .. } => ErrorKind::Truncated,
            Error::IndexOutOfRange { .. }
            | Error::PayloadOutOfRange { .. } => ErrorKind::OutOfRange,
            Error::WidthOverflow { .. } => ErrorKind::WidthOverflow,
            Error::HeightOverflow { .. } => ErrorKind::HeightOverflow,
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::TooManyEntries { .. } | Error::PayloadTooLarge { .. } => {
                ErrorKind::TooLarge
            }
            Error::Image(_) => ErrorKind::Image,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<png::DecodingError> for Error {
    fn from(error: png::DecodingError) -> Error {
        match error {
            png::DecodingError::IoError(error) => Error::Io(error),
            other => Error::Image(format!("Malformed PNG data: {}", other)),
        }
    }
}

impl From<png::EncodingError> for Error {
    fn from(error: png::EncodingError) -> Error {
        match error {
            png::EncodingError::IoError(error) => Error::Io(error),
            other => Error::Image(format!("PNG encoding failed: {}", other)),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(error: image::ImageError) -> Error {
        match error {
            image::ImageError::IoError(error) => Error::Io(error),
            other => Error::Image(other.to_string()),
        }
    }
}

//===========================================================================//

/// The category of an [`Error`], for callers that only care which check
/// failed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// See [`Error::Format`].
    Format,
    /// See [`Error::Truncated`].
    Truncated,
    /// See [`Error::IndexOutOfRange`] and [`Error::PayloadOutOfRange`].
    OutOfRange,
    /// See [`Error::WidthOverflow`].
    WidthOverflow,
    /// See [`Error::HeightOverflow`].
    HeightOverflow,
    /// See [`Error::EmptyInput`].
    EmptyInput,
    /// See [`Error::TooManyEntries`] and [`Error::PayloadTooLarge`].
    TooLarge,
    /// See [`Error::Image`].
    Image,
    /// See [`Error::Io`].
    Io,
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

//===========================================================================//


//===========================================================================//
