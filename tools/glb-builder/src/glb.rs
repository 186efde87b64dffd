//! GLB container assembly and parsing
//!
//! # Layout
//! ```text
//! 0x00: magic "glTF", version 2, total length        (12 bytes)
//! 0x0C: JSON chunk length, "JSON", JSON text          (space-padded to 4)
//! var:  BIN chunk length, "BIN\0", buffer bytes       (zero-padded to 4, optional)
//! ```

use gltf_json as json;
use scenepack_shared::format::glb::{
    CHUNK_BIN, CHUNK_HEADER_SIZE, CHUNK_JSON, HEADER_SIZE, MAGIC, VERSION,
};
use tracing::debug;

use crate::error::GlbError;
use crate::utils::pad_to_four;

/// Contents of a parsed GLB container
#[derive(Debug)]
pub struct ParsedGlb {
    pub document: json::Root,
    /// Raw JSON chunk (padding included)
    pub json: Vec<u8>,
    /// Binary chunk payload, if present
    pub bin: Option<Vec<u8>>,
}

/// Assemble GLB binary from JSON and buffer data
///
/// The binary chunk is omitted when `buffer_data` is empty.
pub fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Result<Vec<u8>, GlbError> {
    let mut json_bytes = serde_json::to_vec(root)?;
    pad_to_four(&mut json_bytes, b' ');

    let mut bin_bytes = buffer_data.to_vec();
    pad_to_four(&mut bin_bytes, 0);

    let bin_chunk_length = if bin_bytes.is_empty() {
        0
    } else {
        CHUNK_HEADER_SIZE + bin_bytes.len()
    };
    let total_length = HEADER_SIZE + CHUNK_HEADER_SIZE + json_bytes.len() + bin_chunk_length;
    let total_u32 = u32::try_from(total_length).map_err(|_| GlbError::TooLarge)?;

    let mut glb = Vec::with_capacity(total_length);

    // GLB header
    glb.extend_from_slice(&MAGIC.to_le_bytes());
    glb.extend_from_slice(&VERSION.to_le_bytes());
    glb.extend_from_slice(&total_u32.to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    // Binary chunk
    if !bin_bytes.is_empty() {
        glb.extend_from_slice(&(bin_bytes.len() as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(&bin_bytes);
    }

    debug!(
        "Assembled GLB: {} bytes (JSON {}, BIN {})",
        glb.len(),
        json_bytes.len(),
        bin_bytes.len()
    );
    Ok(glb)
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Split a GLB container and deserialize its JSON chunk
pub fn parse_glb(bytes: &[u8]) -> Result<ParsedGlb, GlbError> {
    if bytes.len() < HEADER_SIZE + CHUNK_HEADER_SIZE {
        return Err(GlbError::TooShort { len: bytes.len() });
    }
    let too_short = || GlbError::TooShort { len: bytes.len() };

    let magic = read_u32(bytes, 0).ok_or_else(too_short)?;
    if magic != MAGIC {
        return Err(GlbError::BadMagic {
            expected: MAGIC,
            found: magic,
        });
    }
    let version = read_u32(bytes, 4).ok_or_else(too_short)?;
    if version != VERSION {
        return Err(GlbError::UnsupportedVersion(version));
    }
    let declared = read_u32(bytes, 8).ok_or_else(too_short)? as usize;
    if declared != bytes.len() {
        return Err(GlbError::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let (json_type, json) = read_chunk(bytes, HEADER_SIZE)?;
    if json_type != CHUNK_JSON {
        return Err(GlbError::UnexpectedChunk {
            expected: "JSON",
            offset: HEADER_SIZE,
            found: json_type,
        });
    }
    let document: json::Root = serde_json::from_slice(json)?;

    let bin_offset = HEADER_SIZE + CHUNK_HEADER_SIZE + json.len();
    let bin = if bin_offset < bytes.len() {
        let (bin_type, bin) = read_chunk(bytes, bin_offset)?;
        if bin_type != CHUNK_BIN {
            return Err(GlbError::UnexpectedChunk {
                expected: "BIN",
                offset: bin_offset,
                found: bin_type,
            });
        }
        Some(bin.to_vec())
    } else {
        None
    };

    Ok(ParsedGlb {
        document,
        json: json.to_vec(),
        bin,
    })
}

fn read_chunk(bytes: &[u8], offset: usize) -> Result<(u32, &[u8]), GlbError> {
    let overrun = || GlbError::ChunkOverrun { offset };
    let length = read_u32(bytes, offset).ok_or_else(overrun)? as usize;
    let chunk_type = read_u32(bytes, offset + 4).ok_or_else(overrun)?;
    let start = offset + CHUNK_HEADER_SIZE;
    let payload = bytes.get(start..start + length).ok_or_else(overrun)?;
    Ok((chunk_type, payload))
}
