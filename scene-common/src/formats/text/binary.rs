//! JSON-wrapped binary scene format (.scnj)
//!
//! Superseded by the chunked encoding; kept so older files still load.
//!
//! # Layout
//! ```text
//! 0x00: JsonSceneHeader (16 bytes)
//! 0x10: JSON document (json_length bytes, space-padded to 4)
//! var:  blob (blob_length bytes), each buffer 4-byte aligned
//! ```

use scenepack_shared::{JSON_SCENE_FORMAT, SceneGraph};

use super::{SceneDocument, blob_slice, from_document, serialize_document, to_document};
use crate::bytes::{ByteReader, ByteWriter, padding_for};
use crate::error::{FormatError, Result};
use crate::formats::header::JsonSceneHeader;

#[deprecated(note = "use the chunked encoding in `formats::chunked`")]
pub fn to_binary(graph: &SceneGraph) -> Result<Vec<u8>> {
    let mut doc = to_document(graph, false);

    let mut blob = ByteWriter::new();
    for (entry, buffer) in doc.buffers.iter_mut().zip(&graph.buffers) {
        if let Some(data) = &buffer.data {
            entry.blob_offset = Some(blob.offset() as u32);
            entry.blob_length = Some(data.len() as u32);
            blob.write_raw(data);
            blob.align(4);
        }
    }

    let json = serialize_document(&doc, false)?;
    let header = JsonSceneHeader {
        magic: JSON_SCENE_FORMAT.magic_u32(),
        version: JSON_SCENE_FORMAT.version,
        json_length: json.len() as u32,
        blob_length: blob.len() as u32,
    };

    let json_padding = padding_for(json.len(), 4);
    let mut out = ByteWriter::with_capacity(
        JsonSceneHeader::SIZE + json.len() + json_padding + blob.len(),
    );
    out.write_raw(&header.to_bytes());
    out.write_raw(json.as_bytes());
    out.write_raw(&b"   "[..json_padding]);
    out.write_raw(blob.as_slice());
    Ok(out.into_bytes())
}

#[deprecated(note = "use the chunked encoding in `formats::chunked`")]
pub fn from_binary(bytes: &[u8]) -> Result<SceneGraph> {
    let header = JsonSceneHeader::from_bytes(bytes).ok_or(FormatError::Truncated {
        offset: 0,
        needed: JsonSceneHeader::SIZE,
        available: bytes.len(),
    })?;
    let expected = JSON_SCENE_FORMAT.magic_u32();
    if header.magic != expected {
        return Err(FormatError::BadMagic {
            expected,
            found: header.magic,
        });
    }
    if header.version != JSON_SCENE_FORMAT.version {
        return Err(FormatError::UnsupportedVersion {
            expected: JSON_SCENE_FORMAT.version,
            found: header.version,
        });
    }

    let mut reader = ByteReader::new(bytes);
    reader.skip(JsonSceneHeader::SIZE)?;
    let json_len = header.json_length as usize;
    let json = reader.read_raw(json_len)?;
    reader.skip(padding_for(json_len, 4).min(reader.remaining()))?;
    let blob = reader.read_raw(header.blob_length as usize)?;

    let mut doc: SceneDocument = serde_json::from_slice(json)?;
    let mut payloads = Vec::with_capacity(doc.buffers.len());
    for buffer in &mut doc.buffers {
        payloads.push(match buffer.blob_offset.take() {
            Some(offset) => {
                let length = buffer.blob_length.take().unwrap_or(buffer.byte_length);
                Some(blob_slice(blob, offset, length)?)
            }
            None => None,
        });
    }

    let mut graph = from_document(doc)?;
    for (buffer, payload) in graph.buffers.iter_mut().zip(payloads) {
        if payload.is_some() {
            buffer.data = payload;
        }
    }
    Ok(graph)
}
