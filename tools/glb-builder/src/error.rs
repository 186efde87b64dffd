use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlbError {
    #[error("GLB too short: {len} bytes")]
    TooShort { len: usize },

    #[error("invalid GLB magic: expected 0x{expected:08X}, found 0x{found:08X}")]
    BadMagic { expected: u32, found: u32 },

    #[error("unsupported GLB version {0}")]
    UnsupportedVersion(u32),

    #[error("declared GLB length {declared} does not match actual length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("chunk at offset {offset} overruns the container")]
    ChunkOverrun { offset: usize },

    #[error("expected {expected} chunk at offset {offset}, found 0x{found:08X}")]
    UnexpectedChunk {
        expected: &'static str,
        offset: usize,
        found: u32,
    },

    #[error("GLB exceeds the 4 GiB container limit")]
    TooLarge,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
