//! Length-prefixed framing of the capture log.
//!
//! A log is a plain concatenation of frames with no global header:
//!
//! ```text
//! +----------------+------------------------+
//! | length (u16 BE)| payload (length bytes) |
//! +----------------+------------------------+
//! ```
//!
//! The length prefix is in network byte order regardless of the host. The
//! payload is opaque at this layer; see [`crate::record`] for what is inside.

mod validate;

use crate::error::{Error, Result};
use bytes::{Buf, Bytes, BytesMut};
use std::io::Read;
use tracing::trace;

pub use validate::{RecordValidator, MAX_ENTRY_SIZE};

/// Size of the big-endian length prefix in front of every frame
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// One length-prefixed record as read from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedRecord {
    offset: u64,
    length: u16,
    payload: Bytes,
}

impl FramedRecord {
    /// Creates a record whose declared length is the payload length
    pub fn new(offset: u64, payload: Bytes) -> Self {
        let length = u16::try_from(payload.len()).unwrap_or(u16::MAX);
        Self {
            offset,
            length,
            payload,
        }
    }

    /// Stream offset of this record's length prefix
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Declared payload length
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Raw payload bytes, type code included
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Record type code (first payload byte)
    pub fn code(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Total bytes this record occupies in the stream
    pub fn encoded_len(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.payload.len()
    }
}

/// Pulls [`FramedRecord`]s out of a sequential byte source.
///
/// The reader never seeks. End of input exactly at a frame boundary is the
/// normal terminator and is reported as `Ok(None)`; end of input anywhere else
/// is an error. After the first error or end of stream the reader is fused.
#[derive(Debug)]
pub struct FrameReader<R> {
    source: R,
    validator: RecordValidator,
    position: u64,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    /// Creates a reader with the default size limits
    pub fn new(source: R) -> Self {
        Self::with_validator(source, RecordValidator::default())
    }

    /// Creates a reader enforcing the given validator's limits
    pub fn with_validator(source: R, validator: RecordValidator) -> Self {
        Self {
            source,
            validator,
            position: 0,
            done: false,
        }
    }

    /// Number of bytes consumed from the source so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` once the source is exhausted on a frame boundary.
    pub fn next_record(&mut self) -> Result<Option<FramedRecord>> {
        if self.done {
            return Ok(None);
        }
        let result = self.read_frame();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn read_frame(&mut self) -> Result<Option<FramedRecord>> {
        let offset = self.position;

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let got = self.fill(&mut prefix, offset)?;
        match got {
            0 => {
                trace!("End of stream at offset {}", offset);
                return Ok(None);
            }
            LENGTH_PREFIX_SIZE => {}
            _ => return Err(Error::truncated_frame(offset)),
        }

        let mut cursor = &prefix[..];
        let length = cursor.get_u16();
        self.validator.validate_length(offset, length)?;

        let expected = usize::from(length);
        let mut payload = BytesMut::zeroed(expected);
        let actual = self.fill(&mut payload, offset)?;
        if actual < expected {
            return Err(Error::truncated_payload(offset, expected, actual));
        }

        trace!("Read frame at offset {} ({} bytes)", offset, expected);
        Ok(Some(FramedRecord {
            offset,
            length,
            payload: payload.freeze(),
        }))
    }

    /// Reads until `buf` is full or the source is exhausted.
    fn fill(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    self.position += n as u64;
                }
                Err(e) => return Err(Error::io(offset, e)),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<FramedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, ErrorKind};

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut out = BytesMut::new();
        out.put_u16(payload.len() as u16);
        out.put_slice(payload);
        out.to_vec()
    }

    /// Yields one byte per read call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    /// Fails with `Interrupted` on the first read, then reports end of input
    struct Interrupted {
        fired: bool,
    }

    impl Read for Interrupted {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            if self.fired {
                return Ok(0);
            }
            self.fired = true;
            Err(std::io::Error::from(ErrorKind::Interrupted))
        }
    }

    #[test]
    fn test_empty_source() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()));
        assert!(reader.next_record().unwrap().is_none());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_round_trip() {
        let payload = b"\x01\x02\x03hello";
        let mut reader = FrameReader::new(Cursor::new(frame(payload)));

        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.offset(), 0);
        assert_eq!(usize::from(record.length()), payload.len());
        assert_eq!(record.payload().as_ref(), payload);
        assert_eq!(record.code(), Some(0x01));
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_length_is_big_endian() {
        // 0x0102 = 258 bytes
        let mut data = vec![0x01, 0x02];
        data.extend(std::iter::repeat(0xAA).take(258));
        let mut reader = FrameReader::new(Cursor::new(data));

        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.length(), 258);
    }

    #[test]
    fn test_bytes_consumed() {
        let mut data = frame(b"one");
        data.extend(frame(b"second"));
        data.extend(frame(&[0xBB; 40]));
        let total = data.len() as u64;

        let mut reader = FrameReader::new(Cursor::new(data));
        let mut consumed = 0u64;
        while let Some(record) = reader.next_record().unwrap() {
            consumed += record.encoded_len() as u64;
        }
        assert_eq!(consumed, total);
        assert_eq!(reader.position(), total);
    }

    #[test]
    fn test_bytes_consumed_with_trailing_garbage() {
        let mut data = frame(b"abc");
        data.extend(frame(b"defg"));
        let good = data.len() as u64;
        data.extend([0x00, 0x09, b'x', b'y']);

        let mut reader = FrameReader::new(Cursor::new(data));
        let mut consumed = 0u64;
        let err = loop {
            match reader.next_record() {
                Ok(Some(record)) => consumed += record.encoded_len() as u64,
                Ok(None) => panic!("expected truncation"),
                Err(e) => break e,
            }
        };
        assert_eq!(consumed, good);
        assert!(matches!(
            err,
            Error::TruncatedPayload {
                offset,
                expected: 9,
                actual: 2
            } if offset == good
        ));
    }

    #[test]
    fn test_zero_length() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x00, 0x00, 0x41]));
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, Error::InvalidLength { offset: 0 }));
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_oversized_length_reads_no_payload() {
        let mut data = vec![0x10, 0x01];
        data.extend(std::iter::repeat(0u8).take(4097));
        let mut reader = FrameReader::new(Cursor::new(data));

        let err = reader.next_record().unwrap_err();
        assert!(matches!(
            err,
            Error::OversizedLength {
                length: 4097,
                max: 4096,
                ..
            }
        ));
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_max_size_accepted() {
        let payload = vec![0x55u8; MAX_ENTRY_SIZE];
        let mut reader = FrameReader::new(Cursor::new(frame(&payload)));
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(usize::from(record.length()), MAX_ENTRY_SIZE);
    }

    #[test]
    fn test_torn_prefix() {
        let mut data = frame(b"ok");
        data.push(0x00);
        let mut reader = FrameReader::new(Cursor::new(data));

        assert!(reader.next_record().unwrap().is_some());
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, Error::TruncatedFrame { offset: 4 }));
    }

    #[test]
    fn test_fused_after_error() {
        let mut data = vec![0x00, 0x00];
        data.extend(frame(b"never read"));
        let mut reader = FrameReader::new(Cursor::new(data));

        assert!(reader.next_record().is_err());
        assert!(reader.next_record().unwrap().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_short_reads_are_filled() {
        let mut data = frame(b"slow");
        data.extend(frame(b"source"));
        let source = Trickle { data, pos: 0 };

        let payloads: Vec<Bytes> = FrameReader::new(source)
            .map(|r| r.unwrap().payload().clone())
            .collect();
        assert_eq!(
            payloads,
            vec![Bytes::from_static(b"slow"), Bytes::from_static(b"source")]
        );
    }

    #[test]
    fn test_interrupted_read_is_an_error() {
        let source = Interrupted { fired: false };
        let mut reader = FrameReader::new(source);

        let err = reader.next_record().unwrap_err();
        match err {
            Error::Io { offset, source } => {
                assert_eq!(offset, 0);
                assert_eq!(source.kind(), ErrorKind::Interrupted);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_interrupted_payload_read_is_an_error() {
        let source = Read::chain(Cursor::new(vec![0x00, 0x04, b'a']), Interrupted { fired: false });
        let mut reader = FrameReader::new(source);

        assert!(matches!(
            reader.next_record(),
            Err(Error::Io { offset: 0, .. })
        ));
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_custom_limit() {
        let reader_data = frame(&[0u8; 32]);
        let mut reader =
            FrameReader::with_validator(Cursor::new(reader_data), RecordValidator::new(16));
        assert!(matches!(
            reader.next_record(),
            Err(Error::OversizedLength {
                length: 32,
                max: 16,
                ..
            })
        ));
    }
}
