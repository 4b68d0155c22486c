//! Directory entry record.
//!
//! Layout of one 72-byte record as produced by `readdir`:
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 64   | name, NUL-terminated or NUL-padded     |
//! | 64     | 4    | size, little-endian `u32`              |
//! | 68     | 1    | type (0 regular, 1 directory, 2 device)|
//! | 69     | 3    | reserved, ignored                      |

use alloc::string::String;

use crate::FileType;

/// Size of one encoded record in bytes.
pub const DIRENT_SIZE: usize = 72;

/// Size of the name field, terminator included.
pub const NAME_FIELD_LEN: usize = 64;

/// Longest name a record can carry.
pub const MAX_NAME_LEN: usize = NAME_FIELD_LEN - 1;

const SIZE_OFFSET: usize = 64;
const TYPE_OFFSET: usize = 68;

/// Decoded directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name, at most [`MAX_NAME_LEN`] bytes.
    pub name: String,
    /// File size in bytes. Only meaningful for regular files.
    pub size: u32,
    /// Entry type.
    pub file_type: FileType,
}

impl DirEntry {
    /// Build an entry, truncating the name to [`MAX_NAME_LEN`] bytes.
    pub fn new(name: &str, size: u32, file_type: FileType) -> Self {
        DirEntry {
            name: String::from(truncate_name(name)),
            size,
            file_type,
        }
    }

    /// Decode a raw record.
    ///
    /// The name stops at the first NUL or after 63 bytes; the 64th byte is
    /// the terminator slot and is never read. Names that are not valid
    /// UTF-8 are decoded lossily. Reserved bytes are ignored.
    pub fn decode(raw: &[u8; DIRENT_SIZE]) -> Self {
        let field = &raw[..MAX_NAME_LEN];
        let len = field.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_LEN);
        let name = String::from_utf8_lossy(&field[..len]).into_owned();

        let size = u32::from_le_bytes([
            raw[SIZE_OFFSET],
            raw[SIZE_OFFSET + 1],
            raw[SIZE_OFFSET + 2],
            raw[SIZE_OFFSET + 3],
        ]);

        DirEntry {
            name,
            size,
            file_type: FileType::from_byte(raw[TYPE_OFFSET]),
        }
    }

    /// Encode into a raw record. Reserved bytes are written as zero.
    pub fn encode(&self) -> [u8; DIRENT_SIZE] {
        let mut raw = [0u8; DIRENT_SIZE];
        let name = truncate_name(&self.name).as_bytes();
        raw[..name.len()].copy_from_slice(name);
        raw[SIZE_OFFSET..SIZE_OFFSET + 4].copy_from_slice(&self.size.to_le_bytes());
        raw[TYPE_OFFSET] = self.file_type.as_byte();
        raw
    }

    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Cut a name to [`MAX_NAME_LEN`] bytes on a character boundary.
fn truncate_name(name: &str) -> &str {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
