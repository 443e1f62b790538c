//! Error types for HWPX text extraction.

use std::io;
use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures produced by the extraction core.
///
/// A malformed or truncated archive is never reported here: the reader
/// stops at the first header it cannot use and keeps what came before.
#[derive(Error, Debug)]
pub enum Error {
    /// No body-content entry was found, or every one stripped to empty text.
    #[error("no extractable text found in the document package")]
    NoContent,

    /// A content entry could not be inflated and nothing else was usable.
    #[error("failed to decompress entry '{name}'")]
    Decompression {
        name: String,
        #[source]
        source: DecompressionError,
    },
}

/// Every inflate strategy rejected the payload.
#[derive(Error, Debug)]
#[error("deflate payload could not be decoded (raw: {raw}; zlib: {zlib})")]
pub struct DecompressionError {
    /// Failure reported by the raw DEFLATE decoder.
    pub raw: io::Error,
    /// Failure reported by the zlib-framed decoder.
    pub zlib: io::Error,
}
