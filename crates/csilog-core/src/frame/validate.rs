//! Size checks applied to every frame before its payload is interpreted.

use super::FramedRecord;
use crate::error::{Error, Result};

/// Largest entry the capture driver ever writes (its netlink buffer size)
pub const MAX_ENTRY_SIZE: usize = 4096;

/// Enforces the length bounds of a frame.
///
/// Only sizes are checked here. Content checks depend on the record type and
/// happen during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordValidator {
    max_entry_size: usize,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(MAX_ENTRY_SIZE)
    }
}

impl RecordValidator {
    /// Creates a validator with the given upper bound, capped at [`MAX_ENTRY_SIZE`]
    pub fn new(max_entry_size: usize) -> Self {
        Self {
            max_entry_size: max_entry_size.min(MAX_ENTRY_SIZE),
        }
    }

    /// Upper bound on accepted frame lengths
    pub fn max_entry_size(&self) -> usize {
        self.max_entry_size
    }

    /// Checks a declared length prefix found at `offset`
    pub fn validate_length(&self, offset: u64, length: u16) -> Result<()> {
        if length == 0 {
            return Err(Error::invalid_length(offset));
        }
        if usize::from(length) > self.max_entry_size {
            return Err(Error::oversized_length(offset, length, self.max_entry_size));
        }
        Ok(())
    }

    /// Checks a fully read record
    pub fn validate(&self, record: &FramedRecord) -> Result<()> {
        self.validate_length(record.offset(), record.length())?;

        let actual = record.payload().len();
        let expected = usize::from(record.length());
        if actual != expected {
            return Err(Error::truncated_payload(record.offset(), expected, actual));
        }
        Ok(())
    }
}
