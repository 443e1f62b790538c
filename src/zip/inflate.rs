//! Payload decompression for DEFLATE entries.
//!
//! ZIP method 8 stores a raw DEFLATE bitstream, so that is tried first.
//! A zlib-framed stream is accepted as a fallback for writers that wrap
//! the payload anyway. The first strategy that decodes cleanly wins.

use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::{self, Read};

use crate::error::DecompressionError;

/// Framing of a DEFLATE payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Bare DEFLATE bitstream, as used by ZIP entries.
    Raw,
    /// DEFLATE wrapped in a zlib header and Adler-32 trailer.
    Zlib,
}

/// Strategies in the order they are attempted.
pub const STRATEGIES: [Framing; 2] = [Framing::Raw, Framing::Zlib];

impl Framing {
    /// Decode `data` with this framing only.
    pub fn decode(self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len().saturating_mul(3));
        match self {
            Framing::Raw => DeflateDecoder::new(data).read_to_end(&mut out)?,
            Framing::Zlib => ZlibDecoder::new(data).read_to_end(&mut out)?,
        };
        Ok(out)
    }
}

/// Inflate a DEFLATE payload, trying each of [`STRATEGIES`] in turn.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, DecompressionError> {
    let mut failures = Vec::with_capacity(STRATEGIES.len());

    for framing in STRATEGIES {
        match framing.decode(data) {
            Ok(out) => return Ok(out),
            Err(e) => {
                tracing::trace!(?framing, error = %e, "inflate strategy failed");
                failures.push(e);
            }
        }
    }

    let mut failures = failures.into_iter();
    let missing = || io::Error::other("strategy not attempted");
    Err(DecompressionError {
        raw: failures.next().unwrap_or_else(missing),
        zlib: failures.next().unwrap_or_else(missing),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use std::io::Write;

    const SAMPLE: &[u8] = "<hp:t>가정통신문 안내</hp:t>".as_bytes();

    fn raw_deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_inflate_raw_deflate() {
        let compressed = raw_deflate(SAMPLE);
        assert_eq!(inflate(&compressed).unwrap(), SAMPLE);
    }

    #[test]
    fn test_inflate_falls_back_to_zlib() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(SAMPLE).unwrap();
        let compressed = encoder.finish().unwrap();

        assert!(Framing::Raw.decode(&compressed).is_err());
        assert_eq!(inflate(&compressed).unwrap(), SAMPLE);
    }

    #[test]
    fn test_inflate_reports_both_failures() {
        // BTYPE=11 is reserved for raw DEFLATE, and 0xFFFF fails the zlib header check.
        let garbage = [0xFFu8; 16];
        let err = inflate(&garbage).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("raw:"));
        assert!(message.contains("zlib:"));
    }
}
