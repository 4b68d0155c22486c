//! Stat record.
//!
//! Eight bytes: a little-endian `u32` size, the type byte at index 4
//! (1 means directory), and three reserved bytes.

use crate::FileType;

/// Size of one encoded stat record.
pub const STAT_SIZE: usize = 8;

const TYPE_INDEX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRecord {
    pub size: u32,
    pub file_type: FileType,
}

impl StatRecord {
    pub fn decode(raw: &[u8; STAT_SIZE]) -> Self {
        StatRecord {
            size: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            file_type: FileType::from_byte(raw[TYPE_INDEX]),
        }
    }

    pub fn encode(&self) -> [u8; STAT_SIZE] {
        let mut raw = [0u8; STAT_SIZE];
        raw[..4].copy_from_slice(&self.size.to_le_bytes());
        raw[TYPE_INDEX] = self.file_type.as_byte();
        raw
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}
