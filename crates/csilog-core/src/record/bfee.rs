//! Beamforming feedback notifications (record code `0xBB`).
//!
//! The notification body follows the type code and is little-endian, the
//! native order of the capturing NIC. Only the first two fields have a known
//! position; everything after them is kept as an opaque trailer.
//!
//! ```text
//! offset  size  field
//! 0       2     rate_n_flags (u16 LE)
//! 2       2     len          (u16 LE)
//! 4       ..    trailer
//! ```

use crate::error::{Error, Result};
use bytes::{Buf, Bytes};
use std::fmt;

/// Record type code of a beamforming feedback notification
pub const BFEE_NOTIF_CODE: u8 = 0xBB;

/// Size of the fixed notification header
pub const HEADER_SIZE: usize = 4;

/// Decoded view of a beamforming feedback notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamformingNotification {
    rate_n_flags: u16,
    len: u16,
    trailer: Bytes,
}

impl BeamformingNotification {
    /// Decodes a notification body (the payload without its type code).
    ///
    /// The trailer shares storage with `body`.
    pub fn decode(body: Bytes) -> Result<Self> {
        if body.len() < HEADER_SIZE {
            return Err(Error::short_notification(HEADER_SIZE, body.len()));
        }

        let mut header = &body[..HEADER_SIZE];
        let rate_n_flags = header.get_u16_le();
        let len = header.get_u16_le();

        Ok(Self {
            rate_n_flags,
            len,
            trailer: body.slice(HEADER_SIZE..),
        })
    }

    /// Decodes a notification body from a borrowed slice
    pub fn decode_slice(body: &[u8]) -> Result<Self> {
        Self::decode(Bytes::copy_from_slice(body))
    }

    /// Rate and flags the frame was received with
    pub fn rate_n_flags(&self) -> u16 {
        self.rate_n_flags
    }

    /// Length field reported by the driver
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u16 {
        self.len
    }

    /// Bytes following the fixed header, undecoded
    pub fn trailer(&self) -> &Bytes {
        &self.trailer
    }

    /// Size of the fixed header preceding the trailer
    pub fn header_size(&self) -> usize {
        HEADER_SIZE
    }
}

impl fmt::Display for BeamformingNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rate=0x{:x}, len={}", self.rate_n_flags, self.len)
    }
}
