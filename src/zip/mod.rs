//! Minimal ZIP archive reading.
//!
//! This module reads the entries of an in-memory ZIP buffer by walking its
//! Local File Headers from the start. It is just enough ZIP to open HWPX
//! packages, not a general archive library.
//!
//! ## Architecture
//!
//! - [`structures`]: Local File Header layout and compression methods
//! - [`parser`]: Sequential walk over local headers, producing an [`Archive`]
//! - [`inflate`]: DEFLATE decoding with a raw-then-zlib fallback
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Only the first part is read here. The walk ends at the first signature
//! that is not a local header, which is normally the central directory.
//!
//! ## Supported Features
//!
//! - STORED (no compression) method
//! - DEFLATE compression method
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No ZIP64 extensions
//! - No data descriptors (sizes must be present in the local header)
//! - No BZIP2, LZMA, or other compression methods (such entries are skipped)

pub mod inflate;
mod parser;
mod structures;

pub use inflate::inflate;
pub use parser::{Archive, LocalEntries, SkipReason, SkippedEntry, ZipParser, read_entries};
pub use structures::*;

#[cfg(test)]
pub(crate) use parser::tests::{deflate as deflate_for_test, push_entry};
