//! Classification of framed records by their type code.
//!
//! The first payload byte of every frame identifies the notification kind.
//! Codes this crate understands are decoded into their own [`Record`]
//! variant; everything else comes back as [`Record::Unrecognized`] with the
//! raw payload untouched. Unrecognized codes are a normal outcome, the driver
//! logs many kinds of notification.
//!
//! ## Extensibility
//!
//! The [`RecordDispatch`] trait lets callers substitute their own
//! classification without touching the framing layer:
//!
//! ```no_run
//! use csilog_core::record::{Record, RecordDispatch};
//! use csilog_core::{FramedRecord, Result};
//!
//! struct PassThrough;
//!
//! impl RecordDispatch for PassThrough {
//!     fn dispatch(&self, record: &FramedRecord) -> Result<Record> {
//!         Ok(Record::Unrecognized {
//!             code: record.code().unwrap_or_default(),
//!             payload: record.payload().clone(),
//!         })
//!     }
//! }
//! ```

pub mod bfee;

use crate::error::{Error, Result};
use crate::frame::FramedRecord;
use bytes::Bytes;
use tracing::trace;

pub use bfee::{BeamformingNotification, BFEE_NOTIF_CODE};

/// A classified record
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Record {
    /// Beamforming feedback notification (code `0xBB`)
    Beamforming(BeamformingNotification),
    /// Any other code; the payload still includes the code byte
    Unrecognized {
        /// Record type code
        code: u8,
        /// Raw payload
        payload: Bytes,
    },
}

impl Record {
    /// Record type code this record was classified from
    pub fn code(&self) -> u8 {
        match self {
            Self::Beamforming(_) => BFEE_NOTIF_CODE,
            Self::Unrecognized { code, .. } => *code,
        }
    }

    /// Returns the beamforming notification, if this is one
    pub fn as_beamforming(&self) -> Option<&BeamformingNotification> {
        match self {
            Self::Beamforming(bfee) => Some(bfee),
            _ => None,
        }
    }

    /// Returns true if the code was not understood
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized { .. })
    }
}

/// Strategy for turning a framed record into a [`Record`]
pub trait RecordDispatch {
    /// Classify and decode one record
    fn dispatch(&self, record: &FramedRecord) -> Result<Record>;
}

/// Default dispatcher that knows the beamforming notification
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Creates a new dispatcher
    pub fn new() -> Self {
        Self
    }
}

impl RecordDispatch for Dispatcher {
    fn dispatch(&self, record: &FramedRecord) -> Result<Record> {
        let payload = record.payload();
        let Some(&code) = payload.first() else {
            return Err(Error::invalid_length(record.offset()));
        };

        match code {
            BFEE_NOTIF_CODE => {
                let bfee = BeamformingNotification::decode(payload.slice(1..))?;
                trace!("Beamforming notification at offset {}: {}", record.offset(), bfee);
                Ok(Record::Beamforming(bfee))
            }
            _ => Ok(Record::Unrecognized {
                code,
                payload: payload.clone(),
            }),
        }
    }
}
