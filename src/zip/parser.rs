//! Sequential local-header ZIP reader.
//!
//! This module walks an in-memory archive from offset 0, reading each
//! Local File Header in physical order and slicing out its payload.
//!
//! ## Parsing Strategy
//!
//! Unlike a central-directory reader, nothing is read from the end of the
//! buffer:
//! 1. Read the 30-byte Local File Header at the cursor
//! 2. Skip the file name and extra field to find the payload
//! 3. Slice `compressed_size` bytes and advance past them
//!
//! The walk stops quietly at the first position that is not a usable
//! local header. In a well-formed archive that is the central directory;
//! in a truncated upload it is wherever the damage starts. Everything
//! read before that point is kept.
//!
//! Entries that declare a data descriptor (sizes written after the
//! payload) are not supported: their header size is usually zero, so the
//! walk lands inside the payload and stops there.

use std::borrow::Cow;
use std::collections::HashMap;

use super::inflate::inflate;
use super::structures::{CompressionMethod, LocalEntry, LocalFileHeader};
use crate::error::DecompressionError;

/// Low-level ZIP reader over a borrowed buffer.
///
/// ## Example
///
/// ```
/// use hwpx_text::zip::ZipParser;
///
/// let parser = ZipParser::new(&[]);
/// assert_eq!(parser.entries().count(), 0);
/// ```
pub struct ZipParser<'a> {
    /// The whole archive
    data: &'a [u8],
}

impl<'a> ZipParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Iterate over local entries in physical order.
    ///
    /// Payloads are returned raw; use [`ZipParser::read_entries`] to get
    /// decompressed contents.
    pub fn entries(&self) -> LocalEntries<'a> {
        LocalEntries {
            data: self.data,
            offset: 0,
        }
    }

    /// Read and decompress every supported entry.
    ///
    /// Stored payloads are borrowed from the buffer, deflated ones are
    /// inflated into owned buffers. Entries with other compression methods,
    /// or whose payload cannot be inflated, are left out and recorded in
    /// [`Archive::skipped`].
    pub fn read_entries(&self) -> Archive<'a> {
        let mut archive = Archive::default();

        for entry in self.entries() {
            let payload = match entry.header.compression_method {
                CompressionMethod::Stored => Cow::Borrowed(entry.data),
                CompressionMethod::Deflate => match inflate(entry.data) {
                    Ok(bytes) => Cow::Owned(bytes),
                    Err(e) => {
                        tracing::warn!(name = %entry.file_name, error = %e, "skipping entry");
                        archive.skipped.push(SkippedEntry {
                            name: entry.file_name,
                            reason: SkipReason::Decompression(e),
                        });
                        continue;
                    }
                },
                CompressionMethod::Unknown(method) => {
                    tracing::debug!(name = %entry.file_name, method, "unsupported compression method");
                    archive.skipped.push(SkippedEntry {
                        name: entry.file_name,
                        reason: SkipReason::UnsupportedMethod(method),
                    });
                    continue;
                }
            };

            archive.insert(entry.file_name, payload);
        }

        archive
    }
}

/// Read and decompress every supported entry of `data`.
pub fn read_entries(data: &[u8]) -> Archive<'_> {
    ZipParser::new(data).read_entries()
}

/// Iterator over the local headers of an archive buffer.
pub struct LocalEntries<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for LocalEntries<'a> {
    type Item = LocalEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.offset..)?;
        let Some(header) = LocalFileHeader::from_bytes(rest) else {
            tracing::trace!(offset = self.offset, "no local header at cursor");
            return self.finish();
        };

        let name_start = self.offset + LocalFileHeader::SIZE;
        let name_end = name_start + header.file_name_length as usize;
        let data_start = name_start + header.variable_size();
        if data_start > self.data.len() {
            tracing::debug!(offset = self.offset, "truncated local header");
            return self.finish();
        }

        // Use lossy conversion to handle non-UTF8 filenames gracefully
        let file_name = String::from_utf8_lossy(&self.data[name_start..name_end]).into_owned();

        let data_end = data_start + header.compressed_size as usize;
        if data_end > self.data.len() {
            tracing::debug!(name = %file_name, "truncated entry payload");
            return self.finish();
        }

        let entry = LocalEntry {
            file_name,
            header,
            data: &self.data[data_start..data_end],
        };
        tracing::debug!(
            name = %entry.file_name,
            method = entry.header.compression_method.as_u16(),
            size = entry.data.len(),
            "local entry"
        );

        self.offset = data_end;
        Some(entry)
    }
}

impl LocalEntries<'_> {
    fn finish<T>(&mut self) -> Option<T> {
        self.offset = self.data.len();
        None
    }
}

/// Decoded entries of one archive, in physical order.
///
/// Behaves like an insertion-ordered map: a repeated name replaces the
/// earlier value but keeps the earlier position.
#[derive(Debug, Default)]
pub struct Archive<'a> {
    entries: Vec<(String, Cow<'a, [u8]>)>,
    /// Position of each name in `entries`
    index: HashMap<String, usize>,
    skipped: Vec<SkippedEntry>,
}

impl<'a> Archive<'a> {
    fn insert(&mut self, name: String, payload: Cow<'a, [u8]>) {
        match self.index.get(&name) {
            Some(&pos) => {
                tracing::debug!(%name, "duplicate entry name, keeping the later payload");
                self.entries[pos].1 = payload;
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, payload));
            }
        }
    }

    /// Look up an entry's decompressed bytes by exact name.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.index
            .get(name)
            .map(|&pos| self.entries[pos].1.as_ref())
    }

    /// Iterate over `(name, bytes)` pairs in physical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, payload)| (name.as_str(), payload.as_ref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that were found but left out.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedEntry> {
        self.skipped
    }
}

/// An entry that was located but not decoded.
#[derive(Debug)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub enum SkipReason {
    UnsupportedMethod(u16),
    Decompression(DecompressionError),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::{Cursor, Write};

    /// Append one local header plus payload to `buf`.
    pub(crate) fn push_entry(buf: &mut Vec<u8>, name: &str, method: u16, payload: &[u8]) {
        buf.extend_from_slice(b"PK\x03\x04");
        buf.extend_from_slice(&20u16.to_le_bytes()); // version needed
        buf.extend_from_slice(&0u16.to_le_bytes()); // flags
        buf.extend_from_slice(&method.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // time
        buf.extend_from_slice(&0u16.to_le_bytes()); // date
        buf.extend_from_slice(&0u32.to_le_bytes()); // crc32, unchecked
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // extra
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(payload);
    }

    pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_reads_stored_and_deflated_entries() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "mimetype", 0, b"application/hwp+zip");
        push_entry(&mut buf, "Contents/section0.xml", 8, &deflate(b"<p>body</p>"));

        let archive = read_entries(&buf);
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.get("mimetype"), Some(&b"application/hwp+zip"[..]));
        assert_eq!(archive.get("Contents/section0.xml"), Some(&b"<p>body</p>"[..]));
        assert!(archive.skipped().is_empty());
    }

    #[test]
    fn test_stored_payload_is_borrowed() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "a.txt", 0, b"abc");

        let archive = ZipParser::new(&buf).read_entries();
        assert!(matches!(archive.entries[0].1, Cow::Borrowed(_)));
    }

    #[test]
    fn test_honors_extra_field_length() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "a.txt", 0, b"XXXXdata");
        // Reinterpret the first four payload bytes as an extra field.
        buf[28..30].copy_from_slice(&4u16.to_le_bytes());
        buf[18..22].copy_from_slice(&4u32.to_le_bytes());

        let archive = read_entries(&buf);
        assert_eq!(archive.get("a.txt"), Some(&b"data"[..]));
    }

    #[test]
    fn test_stops_at_central_directory() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "a.txt", 0, b"one");
        buf.extend_from_slice(b"PK\x01\x02");
        buf.extend_from_slice(&[0u8; 60]);

        let archive = read_entries(&buf);
        assert_eq!(archive.names().collect::<Vec<_>>(), vec!["a.txt"]);
    }

    #[test]
    fn test_truncated_header_keeps_parsed_entries() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "a.txt", 0, b"one");
        let complete = buf.len();
        push_entry(&mut buf, "b.txt", 0, b"two");
        buf.truncate(complete + 20);

        let archive = read_entries(&buf);
        assert_eq!(archive.names().collect::<Vec<_>>(), vec!["a.txt"]);
    }

    #[test]
    fn test_truncated_payload_is_dropped() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "a.txt", 0, b"one");
        push_entry(&mut buf, "b.txt", 0, b"a longer payload");
        buf.truncate(buf.len() - 3);

        let archive = read_entries(&buf);
        assert_eq!(archive.len(), 1);
        assert!(archive.get("b.txt").is_none());
    }

    #[test]
    fn test_name_running_past_buffer_stops() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "a.txt", 0, b"");
        buf[26..28].copy_from_slice(&500u16.to_le_bytes());

        assert!(read_entries(&buf).is_empty());
    }

    #[test]
    fn test_unsupported_method_is_skipped() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "a.bin", 12, b"bzip2?");
        push_entry(&mut buf, "b.txt", 0, b"kept");

        let archive = read_entries(&buf);
        assert_eq!(archive.names().collect::<Vec<_>>(), vec!["b.txt"]);
        assert_eq!(archive.skipped().len(), 1);
        assert!(matches!(archive.skipped()[0].reason, SkipReason::UnsupportedMethod(12)));
    }

    #[test]
    fn test_corrupt_deflate_is_skipped() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "bad.xml", 8, &[0xFF; 8]);
        push_entry(&mut buf, "good.xml", 0, b"<ok/>");

        let archive = read_entries(&buf);
        assert_eq!(archive.names().collect::<Vec<_>>(), vec!["good.xml"]);
        assert_eq!(archive.skipped()[0].name, "bad.xml");
        assert!(matches!(archive.skipped()[0].reason, SkipReason::Decompression(_)));
    }

    #[test]
    fn test_duplicate_name_last_wins_in_first_position() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "dup.xml", 0, b"first");
        push_entry(&mut buf, "other.xml", 0, b"middle");
        push_entry(&mut buf, "dup.xml", 0, b"second");

        let archive = read_entries(&buf);
        let items: Vec<_> = archive.iter().collect();
        assert_eq!(
            items,
            vec![("dup.xml", &b"second"[..]), ("other.xml", &b"middle"[..])]
        );
    }

    #[test]
    fn test_many_entries_with_duplicate() {
        const COUNT: usize = 100_000;

        let mut buf = Vec::with_capacity(COUNT * 48);
        for i in 0..COUNT {
            push_entry(&mut buf, &format!("e{:06}", i), 0, b"x");
        }
        push_entry(&mut buf, "e000001", 0, b"last");

        let archive = read_entries(&buf);
        assert_eq!(archive.len(), COUNT);
        assert_eq!(archive.get("e000001"), Some(&b"last"[..]));
        assert_eq!(archive.names().nth(1), Some("e000001"));
        assert_eq!(archive.names().last(), Some("e099999"));
    }

    #[test]
    fn test_invalid_utf8_name_is_replaced() {
        let mut buf = Vec::new();
        push_entry(&mut buf, "ab", 0, b"x");
        buf[30] = 0xFF;

        let archive = read_entries(&buf);
        assert_eq!(archive.names().collect::<Vec<_>>(), vec!["\u{FFFD}b"]);
    }

    #[test]
    fn test_round_trip_with_zip_writer() {
        use zip::write::SimpleFileOptions;

        let files: [(&str, &[u8], zip::CompressionMethod); 3] = [
            ("mimetype", b"application/hwp+zip", zip::CompressionMethod::Stored),
            (
                "Contents/section0.xml",
                "<hs:sec><hp:t>안녕하세요 학부모님</hp:t></hs:sec>".as_bytes(),
                zip::CompressionMethod::Deflated,
            ),
            ("BinData/image1.bin", &[0u8, 1, 2, 3, 255, 254], zip::CompressionMethod::Deflated),
        ];

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data, method) in &files {
            let options = SimpleFileOptions::default().compression_method(*method);
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        let buf = writer.finish().unwrap().into_inner();

        let archive = read_entries(&buf);
        assert_eq!(archive.len(), files.len());
        for (name, data, _) in &files {
            assert_eq!(archive.get(name), Some(*data), "entry {name}");
        }
    }
}
