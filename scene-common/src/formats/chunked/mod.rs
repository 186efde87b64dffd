//! Chunked binary scene format (.scnb)
//!
//! The canonical binary encoding of a [`SceneGraph`].
//!
//! # Layout
//! ```text
//! SceneFileHeader (16 bytes)
//! repeat chunk_count times:
//!     ChunkHeader (16 bytes)
//!     payload (size bytes)
//!     zero padding to the configured alignment
//! ```
//!
//! The strings chunk always comes first so that every later chunk can
//! refer to interned text by 2-byte index. Unknown chunk types are skipped
//! by their declared size, which is how newer writers can add chunks
//! without breaking older readers.

mod nodes;
mod resources;
mod tags;

use scenepack_shared::{CHUNKED_SCENE_FORMAT, SceneGraph};
use tracing::debug;

use super::header::{ChunkHeader, SceneFileHeader, checksum};
use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{FormatError, Result};
use crate::string_table::StringTable;

/// Chunk type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChunkType {
    Strings = 1,
    Metadata = 2,
    Nodes = 3,
    Materials = 4,
    Textures = 5,
    Meshes = 6,
    Animations = 7,
    /// Buffers, buffer views and accessors
    Buffers = 8,
    Skins = 9,
}

impl ChunkType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Strings),
            2 => Some(Self::Metadata),
            3 => Some(Self::Nodes),
            4 => Some(Self::Materials),
            5 => Some(Self::Textures),
            6 => Some(Self::Meshes),
            7 => Some(Self::Animations),
            8 => Some(Self::Buffers),
            9 => Some(Self::Skins),
            _ => None,
        }
    }
}

/// Encoding parameters; encoder and decoder must agree on them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkedOptions {
    /// Chunk padding boundary in bytes (power of two)
    pub alignment: usize,
}

impl Default for ChunkedOptions {
    fn default() -> Self {
        Self { alignment: 4 }
    }
}

impl ChunkedOptions {
    fn validate(&self) -> Result<()> {
        if self.alignment == 0 || !self.alignment.is_power_of_two() {
            return Err(FormatError::BadAlignment(self.alignment));
        }
        Ok(())
    }
}

/// Scene graph → chunked bytes
///
/// Holds the string table between chunks; it is reset at the start of
/// every [`encode`](Self::encode) call.
#[derive(Debug, Default)]
pub struct ChunkedEncoder {
    options: ChunkedOptions,
    strings: StringTable,
}

impl ChunkedEncoder {
    pub fn new(options: ChunkedOptions) -> Self {
        Self {
            options,
            strings: StringTable::new(),
        }
    }

    pub fn encode(&mut self, graph: &SceneGraph) -> Result<Vec<u8>> {
        self.options.validate()?;
        self.strings.clear();

        // Payloads first: the strings chunk is only complete once every
        // other chunk has interned its text.
        let mut chunks = Vec::with_capacity(9);
        chunks.push((
            ChunkType::Metadata,
            self.payload(|w, s| nodes::write_metadata(w, s, graph))?,
        ));
        chunks.push((
            ChunkType::Nodes,
            self.payload(|w, s| nodes::write_nodes(w, s, graph))?,
        ));
        chunks.push((
            ChunkType::Materials,
            self.payload(|w, s| resources::write_materials(w, s, &graph.materials))?,
        ));
        chunks.push((
            ChunkType::Textures,
            self.payload(|w, s| resources::write_textures(w, s, &graph.textures))?,
        ));
        chunks.push((
            ChunkType::Meshes,
            self.payload(|w, s| resources::write_meshes(w, s, &graph.meshes))?,
        ));
        chunks.push((
            ChunkType::Animations,
            self.payload(|w, s| resources::write_animations(w, s, &graph.animations))?,
        ));
        chunks.push((
            ChunkType::Buffers,
            self.payload(|w, s| resources::write_buffers(w, s, graph))?,
        ));
        chunks.push((
            ChunkType::Skins,
            self.payload(|w, s| resources::write_skins(w, s, &graph.skins))?,
        ));

        let mut strings_payload = ByteWriter::new();
        strings_payload.write_u32(self.strings.len() as u32);
        for s in self.strings.strings() {
            strings_payload.write_string(s);
        }
        chunks.insert(0, (ChunkType::Strings, strings_payload.into_bytes()));

        let estimated = SceneFileHeader::SIZE
            + chunks
                .iter()
                .map(|(_, p)| ChunkHeader::SIZE + p.len() + self.options.alignment)
                .sum::<usize>();
        let mut out = ByteWriter::with_capacity(estimated);
        out.write_raw(
            &SceneFileHeader::placeholder(
                CHUNKED_SCENE_FORMAT.magic_u32(),
                CHUNKED_SCENE_FORMAT.version,
            )
            .to_bytes(),
        );

        for (chunk_type, payload) in &chunks {
            out.write_raw(&ChunkHeader::for_payload(*chunk_type as u32, payload).to_bytes());
            out.write_raw(payload);
            out.align(self.options.alignment);
        }

        let total = out.len() as u32;
        out.patch_u32_at(SceneFileHeader::TOTAL_LENGTH_OFFSET, total);
        out.patch_u32_at(SceneFileHeader::CHUNK_COUNT_OFFSET, chunks.len() as u32);

        debug!(
            "Encoded scene '{}': {} chunks, {} strings, {} bytes",
            graph.metadata.name,
            chunks.len(),
            self.strings.len(),
            total
        );
        Ok(out.into_bytes())
    }

    fn payload(
        &mut self,
        write: impl FnOnce(&mut ByteWriter, &mut StringTable) -> Result<()>,
    ) -> Result<Vec<u8>> {
        let mut w = ByteWriter::new();
        write(&mut w, &mut self.strings)?;
        Ok(w.into_bytes())
    }
}

/// Chunked bytes → scene graph
#[derive(Debug, Default)]
pub struct ChunkedDecoder {
    options: ChunkedOptions,
    strings: StringTable,
}

impl ChunkedDecoder {
    pub fn new(options: ChunkedOptions) -> Self {
        Self {
            options,
            strings: StringTable::new(),
        }
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Result<SceneGraph> {
        self.options.validate()?;
        self.strings.clear();

        let header = SceneFileHeader::from_bytes(bytes).ok_or(FormatError::Truncated {
            offset: 0,
            needed: SceneFileHeader::SIZE,
            available: bytes.len(),
        })?;
        let expected_magic = CHUNKED_SCENE_FORMAT.magic_u32();
        if header.magic != expected_magic {
            return Err(FormatError::BadMagic {
                expected: expected_magic,
                found: header.magic,
            });
        }
        if header.version != CHUNKED_SCENE_FORMAT.version {
            return Err(FormatError::UnsupportedVersion {
                expected: CHUNKED_SCENE_FORMAT.version,
                found: header.version,
            });
        }

        let total = header.total_length as usize;
        if total < SceneFileHeader::SIZE || total > bytes.len() {
            return Err(FormatError::Truncated {
                offset: 0,
                needed: total,
                available: bytes.len(),
            });
        }

        let mut reader = ByteReader::new(&bytes[..total]);
        reader.skip(SceneFileHeader::SIZE)?;
        let mut graph = SceneGraph {
            version: String::new(),
            ..Default::default()
        };

        for _ in 0..header.chunk_count {
            let chunk = ChunkHeader::from_bytes(reader.read_raw(ChunkHeader::SIZE)?).ok_or(
                FormatError::Truncated {
                    offset: reader.offset(),
                    needed: ChunkHeader::SIZE,
                    available: reader.remaining(),
                },
            )?;
            let payload = reader.read_raw(chunk.size as usize)?;

            let computed = checksum(payload);
            if computed != chunk.checksum {
                return Err(FormatError::ChecksumMismatch {
                    chunk_type: chunk.chunk_type,
                    stored: chunk.checksum,
                    computed,
                });
            }

            match ChunkType::from_u32(chunk.chunk_type) {
                Some(chunk_type) => self.decode_chunk(chunk_type, payload, &mut graph)?,
                None => debug!(
                    "Skipping unknown chunk type {} ({} bytes)",
                    chunk.chunk_type, chunk.size
                ),
            }
            reader.align(self.options.alignment);
        }

        debug!(
            "Decoded scene '{}': {} nodes, {} meshes, {} materials",
            graph.metadata.name,
            graph.node_count(),
            graph.meshes.len(),
            graph.materials.len()
        );
        Ok(graph)
    }

    fn decode_chunk(
        &mut self,
        chunk_type: ChunkType,
        payload: &[u8],
        graph: &mut SceneGraph,
    ) -> Result<()> {
        let mut r = ByteReader::new(payload);
        if chunk_type == ChunkType::Strings {
            let count = r.read_u32()? as usize;
            let mut list = Vec::with_capacity(count.min(r.remaining() / 4));
            for _ in 0..count {
                list.push(r.read_string()?);
            }
            self.strings.load(list);
            return Ok(());
        }

        let strings = &self.strings;
        match chunk_type {
            ChunkType::Strings => {}
            ChunkType::Metadata => nodes::read_metadata(&mut r, strings, graph)?,
            ChunkType::Nodes => nodes::read_nodes(&mut r, strings, graph)?,
            ChunkType::Materials => graph.materials = resources::read_materials(&mut r, strings)?,
            ChunkType::Textures => graph.textures = resources::read_textures(&mut r, strings)?,
            ChunkType::Meshes => graph.meshes = resources::read_meshes(&mut r, strings)?,
            ChunkType::Animations => {
                graph.animations = resources::read_animations(&mut r, strings)?
            }
            ChunkType::Buffers => resources::read_buffers(&mut r, strings, graph)?,
            ChunkType::Skins => graph.skins = resources::read_skins(&mut r, strings)?,
        }
        Ok(())
    }
}

/// Encode with a fresh encoder
pub fn encode_scene(graph: &SceneGraph, options: &ChunkedOptions) -> Result<Vec<u8>> {
    ChunkedEncoder::new(*options).encode(graph)
}

/// Decode with a fresh decoder
pub fn decode_scene(bytes: &[u8], options: &ChunkedOptions) -> Result<SceneGraph> {
    ChunkedDecoder::new(*options).decode(bytes)
}

fn write_opt_u32(w: &mut ByteWriter, value: Option<u32>) {
    w.write_bool(value.is_some());
    if let Some(v) = value {
        w.write_u32(v);
    }
}

fn read_opt_u32(r: &mut ByteReader<'_>) -> Result<Option<u32>> {
    if r.read_bool()? {
        Ok(Some(r.read_u32()?))
    } else {
        Ok(None)
    }
}

fn write_opt_f32(w: &mut ByteWriter, value: Option<f32>) {
    w.write_bool(value.is_some());
    if let Some(v) = value {
        w.write_f32(v);
    }
}

fn read_opt_f32(r: &mut ByteReader<'_>) -> Result<Option<f32>> {
    if r.read_bool()? {
        Ok(Some(r.read_f32()?))
    } else {
        Ok(None)
    }
}
