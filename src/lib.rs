//! # hwpx-text
//!
//! Extract plain text from HWPX documents, the zip-based format of the
//! Korean Hangul word processor.
//!
//! The archive is read with a minimal in-memory ZIP reader that walks local
//! file headers from the start of the buffer. The body parts under
//! `Contents/` are inflated, stripped of markup and joined into one text
//! blob, ready to be forwarded to a language model that drafts school
//! newsletters (가정통신문).
//!
//! ## Features
//!
//! - Sequential local-header ZIP reading, lenient toward truncated uploads
//! - Support for STORED (uncompressed) and DEFLATE compression methods
//! - Flat markup stripping with a fixed entity set
//! - Upload checks: size limit, legacy `.hwp` refusal, character limit
//! - Loading from local files or HTTP/HTTPS URLs
//!
//! ## Example
//!
//! ```no_run
//! use hwpx_text::{LocalSource, Source, extract_hwpx_text};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let upload = LocalSource::new("가정통신문.hwpx").load(15 * 1024 * 1024).await?;
//!     let text = extract_hwpx_text(&upload.bytes)?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod text;
pub mod upload;
pub mod zip;

pub use cli::Cli;
pub use error::{DecompressionError, Error, Result};
pub use io::{HttpSource, LocalSource, Source, Upload};
pub use text::{extract_hwpx_text, extract_text};
pub use upload::{Envelope, Limits, Prepared, UploadError, UploadKind, prepare};
pub use zip::{Archive, ZipParser, read_entries};
