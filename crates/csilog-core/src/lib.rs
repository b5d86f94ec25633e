//! # csilog-core
//!
//! A decoder for the binary notification logs written by the 802.11n CSI
//! capture tool.
//!
//! A log is a sequence of frames, each a big-endian `u16` length followed by
//! that many payload bytes. The first payload byte is a record type code.
//! Code `0xBB` marks a beamforming feedback notification, whose little-endian
//! header is decoded into typed fields; all other codes are passed through.
//!
//! ## Architecture
//!
//! - [`frame`]: reading length-prefixed frames and enforcing size limits
//! - [`record`]: classifying frames by type code and decoding known kinds
//! - [`stream`]: the decode loop over a whole log
//! - [`error`]: error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use csilog_core::{open_file, DecoderConfig, Record};
//!
//! for decoded in open_file("log.all_csi.6.7.6", DecoderConfig::new())? {
//!     if let Record::Beamforming(bfee) = decoded?.record {
//!         println!("{}", bfee);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod frame;
pub mod record;
pub mod stream;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use frame::{FrameReader, FramedRecord, RecordValidator, MAX_ENTRY_SIZE};
pub use record::{BeamformingNotification, Dispatcher, Record, RecordDispatch, BFEE_NOTIF_CODE};
pub use stream::{
    decode_bytes, decode_file, open_file, DecodeStats, DecodedRecord, DecoderConfig, LogDecoder,
};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
