//! Newline-delimited JSON framing for the quote stream.
//!
//! Every frame is one JSON document followed by `\n`. The subscriber writes a single
//! `StreamRequest` frame, the generator answers with an unbounded sequence of `Quote`
//! frames.
//!
//! `FrameReader` keeps partially received bytes across calls, so a socket read timeout
//! in the middle of a frame does not lose data; the caller simply retries.
use std::io::{BufRead, BufReader, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::QuoteError;
use crate::result::Result;

/// Encode `value` as a single frame and write it to `writer`.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    writer.write_all(&bytes)?;
    Ok(())
}

/// Buffered frame decoder over any byte source.
pub struct FrameReader<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: Read> FrameReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Read and decode the next frame.
    ///
    /// Returns `QuoteError::StreamClosed` on end-of-stream. Timeouts surface as
    /// `QuoteError::Io` (see `QuoteError::is_timeout`) with the partial frame retained.
    pub fn read_frame<T: DeserializeOwned>(&mut self) -> Result<T> {
        loop {
            let read = self.reader.read_until(b'\n', &mut self.pending)?;
            let complete = self.pending.last() == Some(&b'\n');
            if read == 0 && self.pending.is_empty() {
                return Err(QuoteError::StreamClosed);
            }
            if !complete && read != 0 {
                continue;
            }
            let frame = std::mem::take(&mut self.pending);
            let text = std::str::from_utf8(&frame)
                .map_err(|e| QuoteError::Format(e.to_string()))?
                .trim();
            if text.is_empty() {
                continue;
            }
            return Ok(serde_json::from_str(text)?);
        }
    }

    /// Access the underlying reader, e.g. to adjust socket timeouts.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Quote, StreamRequest};
    use std::io::{self, Cursor};

    #[test]
    fn reads_consecutive_frames_and_skips_blank_lines() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Quote::new("BTC", 100.0, 1)).unwrap();
        buf.extend_from_slice(b"\n");
        write_frame(&mut buf, &Quote::new("ETH", 50.0, 2)).unwrap();

        let mut reader = FrameReader::new(Cursor::new(buf));
        assert_eq!(reader.read_frame::<Quote>().unwrap(), Quote::new("BTC", 100.0, 1));
        assert_eq!(reader.read_frame::<Quote>().unwrap(), Quote::new("ETH", 50.0, 2));
        assert!(matches!(
            reader.read_frame::<Quote>(),
            Err(QuoteError::StreamClosed)
        ));
    }

    #[test]
    fn last_frame_without_newline_is_still_decoded() {
        let mut reader = FrameReader::new(Cursor::new(b"{\"symbols\":[\"BTC\"]}".to_vec()));
        let req: StreamRequest = reader.read_frame().unwrap();
        assert_eq!(req.symbols, vec!["BTC".to_string()]);
    }

    #[test]
    fn garbage_frame_is_a_json_error() {
        let mut reader = FrameReader::new(Cursor::new(b"not json\n".to_vec()));
        assert!(matches!(
            reader.read_frame::<Quote>(),
            Err(QuoteError::SerdeJson(_))
        ));
    }

    /// Yields its chunks one by one, then a timeout error, then the rest.
    struct Choppy {
        chunks: Vec<Result<Vec<u8>, io::ErrorKind>>,
    }

    impl Read for Choppy {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            match self.chunks.remove(0) {
                Ok(bytes) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Err(kind) => Err(io::Error::from(kind)),
            }
        }
    }

    #[test]
    fn partial_frame_survives_a_timeout() {
        let choppy = Choppy {
            chunks: vec![
                Ok(b"{\"symbol\":\"BTC\",".to_vec()),
                Err(io::ErrorKind::WouldBlock),
                Ok(b"\"price\":1.5,\"timestamp\":7}\n".to_vec()),
            ],
        };
        let mut reader = FrameReader::new(choppy);
        let err = reader.read_frame::<Quote>().unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(reader.read_frame::<Quote>().unwrap(), Quote::new("BTC", 1.5, 7));
    }
}
