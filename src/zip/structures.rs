use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    /// Short label used by the listing output.
    pub fn label(&self) -> String {
        match self {
            CompressionMethod::Stored => "Stored".to_string(),
            CompressionMethod::Deflate => "Defl:N".to_string(),
            CompressionMethod::Unknown(v) => format!("Unk:{:03}", v),
        }
    }
}

/// Local File Header (LFH) - 30 bytes, followed by name and extra field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// `PK\x03\x04` read as a little-endian u32.
    pub const SIGNATURE: u32 = 0x04034b50;
    pub const SIZE: usize = 30;

    /// Parse the fixed part of a local header.
    ///
    /// Returns `None` when fewer than [`Self::SIZE`] bytes are available or
    /// the signature does not match, which the reader treats as the end of
    /// the local entries (the central directory follows them).
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE {
            return None;
        }

        let mut cursor = Cursor::new(&data[..Self::SIZE]);
        if cursor.read_u32::<LittleEndian>().ok()? != Self::SIGNATURE {
            return None;
        }

        Some(Self {
            version_needed: cursor.read_u16::<LittleEndian>().ok()?,
            flags: cursor.read_u16::<LittleEndian>().ok()?,
            compression_method: CompressionMethod::from_u16(
                cursor.read_u16::<LittleEndian>().ok()?,
            ),
            last_mod_time: cursor.read_u16::<LittleEndian>().ok()?,
            last_mod_date: cursor.read_u16::<LittleEndian>().ok()?,
            crc32: cursor.read_u32::<LittleEndian>().ok()?,
            compressed_size: cursor.read_u32::<LittleEndian>().ok()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>().ok()?,
            file_name_length: cursor.read_u16::<LittleEndian>().ok()?,
            extra_field_length: cursor.read_u16::<LittleEndian>().ok()?,
        })
    }

    /// Bytes between the fixed header and the payload.
    pub fn variable_size(&self) -> usize {
        self.file_name_length as usize + self.extra_field_length as usize
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

/// A local entry located in the archive buffer.
///
/// `data` is a view of the raw (possibly compressed) payload.
#[derive(Debug, Clone)]
pub struct LocalEntry<'a> {
    pub file_name: String,
    pub header: LocalFileHeader,
    pub data: &'a [u8],
}

impl LocalEntry<'_> {
    pub fn is_directory(&self) -> bool {
        self.file_name.ends_with('/')
    }
}
