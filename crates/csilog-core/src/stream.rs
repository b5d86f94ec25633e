//! The single-pass decode loop over a whole log.
//!
//! [`LogDecoder`] chains framing, validation and dispatch: each call reads one
//! frame and hands back the classified record. The first error ends the pass;
//! no attempt is made to resynchronize on a corrupt stream.

use crate::error::{Error, Result};
use crate::frame::{FrameReader, RecordValidator, MAX_ENTRY_SIZE};
use crate::record::{Dispatcher, Record, RecordDispatch};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace};

/// Configuration for a decode pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum number of records to decode (0 = unlimited)
    pub max_records: usize,
    /// Largest accepted frame; values above [`MAX_ENTRY_SIZE`] are capped
    pub max_entry_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_records: 0,
            max_entry_size: MAX_ENTRY_SIZE,
        }
    }
}

impl DecoderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of records to decode
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Sets the largest accepted frame length
    pub fn max_entry_size(mut self, size: usize) -> Self {
        self.max_entry_size = size;
        self
    }

    fn validator(&self) -> RecordValidator {
        RecordValidator::new(self.max_entry_size)
    }
}

/// A classified record together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// Stream offset of the frame's length prefix
    pub offset: u64,
    /// Declared frame length
    pub length: u16,
    /// The classified payload
    pub record: Record,
}

/// Counters for one decode pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Records decoded successfully
    pub records: usize,
    /// Beamforming notifications among them
    pub beamforming: usize,
    /// Records with an unrecognized code
    pub unrecognized: usize,
    /// Bytes consumed by successfully decoded frames
    pub bytes_consumed: u64,
}

/// Decodes every record of a log in order
#[derive(Debug)]
pub struct LogDecoder<R, D = Dispatcher> {
    frames: FrameReader<R>,
    validator: RecordValidator,
    dispatcher: D,
    config: DecoderConfig,
    stats: DecodeStats,
    done: bool,
}

impl<R: Read> LogDecoder<R> {
    /// Creates a decoder using the default dispatcher
    pub fn new(source: R, config: DecoderConfig) -> Self {
        Self::with_dispatcher(source, config, Dispatcher::new())
    }
}

impl<R: Read, D: RecordDispatch> LogDecoder<R, D> {
    /// Creates a decoder with a custom dispatcher
    pub fn with_dispatcher(source: R, config: DecoderConfig, dispatcher: D) -> Self {
        Self {
            frames: FrameReader::with_validator(source, config.validator()),
            validator: config.validator(),
            dispatcher,
            config,
            stats: DecodeStats::default(),
            done: false,
        }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Bytes consumed from the source so far, including any failed frame
    pub fn position(&self) -> u64 {
        self.frames.position()
    }

    /// Decodes the next record.
    ///
    /// Returns `Ok(None)` at end of stream or once `max_records` is reached.
    pub fn next_record(&mut self) -> Result<Option<DecodedRecord>> {
        if self.done {
            return Ok(None);
        }
        if self.config.max_records > 0 && self.stats.records >= self.config.max_records {
            debug!("Stopping after {} records", self.stats.records);
            self.done = true;
            return Ok(None);
        }

        let result = self.decode_one();
        match &result {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.done = true;
                debug!(
                    "Decode complete: {} records ({} beamforming, {} unrecognized), {} bytes",
                    self.stats.records,
                    self.stats.beamforming,
                    self.stats.unrecognized,
                    self.stats.bytes_consumed
                );
            }
            Err(e) => {
                self.done = true;
                debug!("Decode failed after {} records: {}", self.stats.records, e);
            }
        }
        result
    }

    fn decode_one(&mut self) -> Result<Option<DecodedRecord>> {
        let Some(frame) = self.frames.next_record()? else {
            return Ok(None);
        };

        self.validator.validate(&frame)?;
        let record = self.dispatcher.dispatch(&frame)?;
        match &record {
            Record::Beamforming(_) => self.stats.beamforming += 1,
            Record::Unrecognized { code, .. } => {
                debug!("Unrecognized code 0x{:X} at offset {}", code, frame.offset());
                self.stats.unrecognized += 1;
            }
        }
        self.stats.records += 1;
        self.stats.bytes_consumed += frame.encoded_len() as u64;

        trace!(
            "Record {} at offset {}: code=0x{:X}, {} bytes",
            self.stats.records,
            frame.offset(),
            record.code(),
            frame.length()
        );

        Ok(Some(DecodedRecord {
            offset: frame.offset(),
            length: frame.length(),
            record,
        }))
    }
}

impl<R: Read, D: RecordDispatch> Iterator for LogDecoder<R, D> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Decode an in-memory log
pub fn decode_bytes(data: &[u8], config: DecoderConfig) -> Result<Vec<DecodedRecord>> {
    LogDecoder::new(data, config).collect()
}

/// Open a log file for decoding
pub fn open_file(
    path: impl AsRef<Path>,
    config: DecoderConfig,
) -> Result<LogDecoder<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
    debug!("Opened {}", path.display());
    Ok(LogDecoder::new(BufReader::new(file), config))
}

/// Decode a whole log file
///
/// This is a convenience function that opens the file and collects every record.
pub fn decode_file(path: impl AsRef<Path>, config: DecoderConfig) -> Result<Vec<DecodedRecord>> {
    open_file(path, config)?.collect()
}
