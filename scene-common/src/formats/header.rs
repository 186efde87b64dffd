//! Fixed-size headers of the binary scene formats
//!
//! # Layout
//! ```text
//! SceneFileHeader (16 bytes)
//! 0x00: magic u32
//! 0x04: version u32
//! 0x08: total_length u32   (whole file, headers included)
//! 0x0C: chunk_count u32
//!
//! ChunkHeader (16 bytes)
//! 0x00: chunk_type u32
//! 0x04: size u32           (payload only, padding excluded)
//! 0x08: flags u32          (reserved, 0)
//! 0x0C: checksum u32       (xxh32 of the payload, seed 0)
//! ```

use xxhash_rust::xxh32::xxh32;

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// File header (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneFileHeader {
    pub magic: u32,
    pub version: u32,
    pub total_length: u32,
    pub chunk_count: u32,
}

impl SceneFileHeader {
    pub const SIZE: usize = 16;

    /// Byte offsets of the fields backpatched once all chunks are written
    pub const TOTAL_LENGTH_OFFSET: usize = 8;
    pub const CHUNK_COUNT_OFFSET: usize = 12;

    /// Header with zeroed placeholders for length and chunk count
    pub fn placeholder(magic: u32, version: u32) -> Self {
        Self {
            magic,
            version,
            total_length: 0,
            chunk_count: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.total_length.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.chunk_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: read_u32(bytes, 0),
            version: read_u32(bytes, 4),
            total_length: read_u32(bytes, 8),
            chunk_count: read_u32(bytes, 12),
        })
    }
}

/// Chunk header (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub chunk_type: u32,
    pub size: u32,
    pub flags: u32,
    pub checksum: u32,
}

impl ChunkHeader {
    pub const SIZE: usize = 16;

    /// Header describing `payload`, checksum included
    pub fn for_payload(chunk_type: u32, payload: &[u8]) -> Self {
        Self {
            chunk_type,
            size: payload.len() as u32,
            flags: 0,
            checksum: checksum(payload),
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.chunk_type.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.size.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.flags.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            chunk_type: read_u32(bytes, 0),
            size: read_u32(bytes, 4),
            flags: read_u32(bytes, 8),
            checksum: read_u32(bytes, 12),
        })
    }
}

/// Header of the deprecated JSON-wrapped encoding (16 bytes)
///
/// ```text
/// 0x00: magic u32
/// 0x04: version u32
/// 0x08: json_length u32   (unpadded)
/// 0x0C: blob_length u32
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonSceneHeader {
    pub magic: u32,
    pub version: u32,
    pub json_length: u32,
    pub blob_length: u32,
}

impl JsonSceneHeader {
    pub const SIZE: usize = 16;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.json_length.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.blob_length.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: read_u32(bytes, 0),
            version: read_u32(bytes, 4),
            json_length: read_u32(bytes, 8),
            blob_length: read_u32(bytes, 12),
        })
    }
}

/// Chunk payload checksum
pub fn checksum(payload: &[u8]) -> u32 {
    xxh32(payload, 0)
}
