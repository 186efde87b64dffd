//! Binary serialization trait for format headers.
//!
//! Every fixed-size header implements `BinarySerializable` so generic code
//! (header probes, encoding sniffing) can handle them uniformly, while each
//! header keeps its own `to_bytes()` returning a fixed-size array.

use scenepack_shared::{CHUNKED_SCENE_FORMAT, JSON_SCENE_FORMAT};

use super::{ChunkHeader, JsonSceneHeader, SceneFileHeader};

/// Trait for binary-serializable format headers.
///
/// Uses `Vec<u8>` for the return type because `[u8; Self::SIZE]` in a trait
/// signature is not expressible on stable Rust.
///
/// # Example
///
/// ```
/// use scene_common::formats::{BinarySerializable, ChunkHeader};
///
/// let header = ChunkHeader::for_payload(3, b"payload");
/// let bytes = header.serialize();
/// let parsed = ChunkHeader::deserialize(&bytes).unwrap();
/// assert_eq!(parsed, header);
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized header in bytes.
    const SIZE: usize;

    fn serialize(&self) -> Vec<u8>;

    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_binary_serializable {
    ($($header:ty),+ $(,)?) => {
        $(
            impl BinarySerializable for $header {
                const SIZE: usize = <$header>::SIZE;

                fn serialize(&self) -> Vec<u8> {
                    self.to_bytes().to_vec()
                }

                fn deserialize(bytes: &[u8]) -> Option<Self> {
                    Self::from_bytes(bytes)
                }
            }
        )+
    };
}

impl_binary_serializable!(SceneFileHeader, ChunkHeader, JsonSceneHeader);

/// Read a header from the front of a file, if it is long enough
pub fn probe_header<T: BinarySerializable>(bytes: &[u8]) -> Option<T> {
    T::deserialize(bytes.get(..T::SIZE)?)
}

/// Scene encoding recognised from the leading bytes of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEncoding {
    /// `SCNB` chunked binary
    Chunked,
    /// Deprecated `SCNJ` JSON-wrapped binary
    JsonWrapped,
    /// Anything else is parsed as a JSON text scene
    Text,
}

/// Pick a decoder by magic bytes, independent of the file extension
pub fn sniff_encoding(bytes: &[u8]) -> SceneEncoding {
    if let Some(header) = probe_header::<SceneFileHeader>(bytes) {
        if header.magic == CHUNKED_SCENE_FORMAT.magic_u32() {
            return SceneEncoding::Chunked;
        }
    }
    match probe_header::<JsonSceneHeader>(bytes) {
        Some(header) if header.magic == JSON_SCENE_FORMAT.magic_u32() => SceneEncoding::JsonWrapped,
        _ => SceneEncoding::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_header_trait() {
        let header = SceneFileHeader {
            magic: 0x424E_4353,
            version: 1,
            total_length: 128,
            chunk_count: 9,
        };
        let bytes = header.serialize();
        assert_eq!(bytes.len(), 16);
        assert_eq!(SceneFileHeader::deserialize(&bytes), Some(header));
    }

    #[test]
    fn test_chunk_header_checksum() {
        let a = ChunkHeader::for_payload(1, b"abc");
        let b = ChunkHeader::for_payload(1, b"abd");
        assert_eq!(a.size, 3);
        assert_eq!(a.flags, 0);
        assert_ne!(a.checksum, b.checksum);
    }

    #[test]
    fn test_deserialize_insufficient_bytes() {
        assert!(SceneFileHeader::deserialize(&[0; 15]).is_none());
        assert!(ChunkHeader::deserialize(&[0; 15]).is_none());
        assert!(JsonSceneHeader::deserialize(&[0; 3]).is_none());
    }

    fn header_size<T: BinarySerializable>() -> usize {
        T::SIZE
    }

    #[test]
    fn test_generic_usage() {
        assert_eq!(header_size::<SceneFileHeader>(), 16);
        assert_eq!(header_size::<ChunkHeader>(), 16);
        assert_eq!(header_size::<JsonSceneHeader>(), 16);
        assert!(probe_header::<SceneFileHeader>(&[0; 4]).is_none());
    }

    #[test]
    fn test_sniff_encoding() {
        let chunked = SceneFileHeader::placeholder(CHUNKED_SCENE_FORMAT.magic_u32(), 1);
        assert_eq!(sniff_encoding(&chunked.to_bytes()), SceneEncoding::Chunked);

        let wrapped = JsonSceneHeader {
            magic: JSON_SCENE_FORMAT.magic_u32(),
            version: 1,
            json_length: 2,
            blob_length: 0,
        };
        assert_eq!(sniff_encoding(&wrapped.to_bytes()), SceneEncoding::JsonWrapped);

        assert_eq!(sniff_encoding(b"{}"), SceneEncoding::Text);
        // Magic alone is not a header
        assert_eq!(sniff_encoding(b"SCNB"), SceneEncoding::Text);
    }
}
