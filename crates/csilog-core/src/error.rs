//! Error types for the csilog-core library.
//!
//! Every variant carries the stream offset of the frame that failed, so a
//! caller can point at the exact spot in a capture where decoding stopped.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for csilog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all decode operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to open or read the input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The byte source failed mid-read
    #[error("read error at offset {offset}: {source}")]
    Io {
        /// Stream offset of the frame being read
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stream ended after one byte of a two-byte length prefix
    #[error("truncated frame at offset {offset}: length prefix is torn")]
    TruncatedFrame {
        /// Offset of the torn prefix
        offset: u64,
    },

    /// A frame declared a length of zero
    #[error("got entry size=0 at offset {offset}")]
    InvalidLength {
        /// Offset of the length prefix
        offset: u64,
    },

    /// A frame declared a length above the configured maximum
    #[error("got entry size {length} > max entry size {max} at offset {offset}")]
    OversizedLength {
        /// Offset of the length prefix
        offset: u64,
        /// Declared length
        length: u16,
        /// Maximum accepted length
        max: usize,
    },

    /// Stream ended before the declared payload was fully read
    #[error("truncated payload at offset {offset}: expected {expected} bytes, got {actual}")]
    TruncatedPayload {
        /// Offset of the frame's length prefix
        offset: u64,
        /// Declared payload length
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// A beamforming notification is shorter than its fixed header
    #[error("short beamforming notification: need {needed} bytes, got {actual}")]
    ShortNotification {
        /// Minimum number of bytes required
        needed: usize,
        /// Bytes available
        actual: usize,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new mid-stream I/O error
    pub fn io(offset: u64, source: std::io::Error) -> Self {
        Self::Io { offset, source }
    }

    /// Creates a new torn length prefix error
    pub fn truncated_frame(offset: u64) -> Self {
        Self::TruncatedFrame { offset }
    }

    /// Creates a new zero length error
    pub fn invalid_length(offset: u64) -> Self {
        Self::InvalidLength { offset }
    }

    /// Creates a new oversized length error
    pub fn oversized_length(offset: u64, length: u16, max: usize) -> Self {
        Self::OversizedLength {
            offset,
            length,
            max,
        }
    }

    /// Creates a new truncated payload error
    pub fn truncated_payload(offset: u64, expected: usize, actual: usize) -> Self {
        Self::TruncatedPayload {
            offset,
            expected,
            actual,
        }
    }

    /// Creates a new short notification error
    pub fn short_notification(needed: usize, actual: usize) -> Self {
        Self::ShortNotification { needed, actual }
    }

    /// Stream offset the error refers to, if it is tied to a frame
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Io { offset, .. }
            | Self::TruncatedFrame { offset }
            | Self::InvalidLength { offset }
            | Self::OversizedLength { offset, .. }
            | Self::TruncatedPayload { offset, .. } => Some(*offset),
            Self::FileRead { .. } | Self::ShortNotification { .. } => None,
        }
    }

    /// Returns true if the input simply ran out mid-frame
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::TruncatedFrame { .. } | Self::TruncatedPayload { .. }
        )
    }
}
