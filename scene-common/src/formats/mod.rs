//! Scene graph encodings
//!
//! - [`chunked`]: canonical binary format (`.scnb`), see `CHUNKED_SCENE_FORMAT`
//! - [`text`]: human-readable JSON, plus the deprecated JSON-wrapped binary
//!   (`.scnj`)
//!
//! Fixed-size headers implement [`BinarySerializable`]; [`sniff_encoding`]
//! uses them to tell the encodings apart.

pub mod chunked;
mod header;
mod serialization;
pub mod text;

pub use header::*;
pub use serialization::{BinarySerializable, SceneEncoding, probe_header, sniff_encoding};

// Re-export format constants from shared for convenience
pub use scenepack_shared::{CHUNKED_SCENE_FORMAT, JSON_SCENE_FORMAT, SceneFormat};
