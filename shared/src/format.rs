//! Scene file format specifications.
//!
//! This module defines the `SceneFormat` struct which serves as the single source of truth
//! for scene-file constants (file extensions, magic bytes, versions).
//!
//! # Example
//!
//! ```
//! use scenepack_shared::CHUNKED_SCENE_FORMAT;
//!
//! assert_eq!(CHUNKED_SCENE_FORMAT.extension, "scnb");
//! assert_eq!(CHUNKED_SCENE_FORMAT.magic, b"SCNB");
//! ```

/// Binary scene format specification.
///
/// Two binary encodings exist. [`CHUNKED_SCENE_FORMAT`] is canonical;
/// [`JSON_SCENE_FORMAT`] wraps the text serializer's JSON body and is kept
/// for reading older files only.
#[derive(Debug, Clone, Copy)]
pub struct SceneFormat {
    /// File extension without dot (e.g., "scnb")
    pub extension: &'static str,

    /// Magic bytes at start of file (4 bytes)
    pub magic: &'static [u8; 4],

    /// Format version written by this build; readers reject anything else
    pub version: u32,

    /// Fixed header size in bytes
    pub header_size: usize,
}

impl SceneFormat {
    pub const fn new(
        extension: &'static str,
        magic: &'static [u8; 4],
        version: u32,
        header_size: usize,
    ) -> Self {
        Self {
            extension,
            magic,
            version,
            header_size,
        }
    }

    /// Magic bytes as the little-endian u32 stored in the header
    pub const fn magic_u32(&self) -> u32 {
        u32::from_le_bytes(*self.magic)
    }
}

/// Canonical chunked binary scene format (`.scnb`)
pub const CHUNKED_SCENE_FORMAT: SceneFormat = SceneFormat::new("scnb", b"SCNB", 1, 16);

/// Deprecated header-wrapped JSON scene format (`.scnj`)
pub const JSON_SCENE_FORMAT: SceneFormat = SceneFormat::new("scnj", b"SCNJ", 1, 16);

/// Text scene document version written into `version`
pub const TEXT_SCENE_VERSION: &str = "1.0";

/// glTF binary container constants
pub mod glb {
    /// "glTF" as little-endian u32
    pub const MAGIC: u32 = 0x4654_6C67;
    pub const VERSION: u32 = 2;
    pub const HEADER_SIZE: usize = 12;
    pub const CHUNK_HEADER_SIZE: usize = 8;
    /// "JSON" as little-endian u32
    pub const CHUNK_JSON: u32 = 0x4E4F_534A;
    /// "BIN\0" as little-endian u32
    pub const CHUNK_BIN: u32 = 0x004E_4942;
}
