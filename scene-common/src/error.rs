//! Error type shared by every scene serializer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("bad magic: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("unsupported format version {found} (this build reads version {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("checksum mismatch in chunk type {chunk_type}: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        chunk_type: u32,
        stored: u32,
        computed: u32,
    },

    #[error("string index {0} not present in string table")]
    BadStringIndex(u32),

    #[error("string table holds {0} entries, more than a 2-byte index can address")]
    StringTableOverflow(usize),

    #[error("{count} {what} exceed the 2-byte count limit")]
    CountOverflow { what: &'static str, count: usize },

    #[error("invalid {what} tag {value}")]
    InvalidTag { what: &'static str, value: u32 },

    #[error("invalid node hierarchy: {0}")]
    BadHierarchy(String),

    #[error("alignment {0} is not a power of two")]
    BadAlignment(usize),

    #[error("invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid UTF-8 string: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;
