//! Scene serialization for scenepack
//!
//! This crate provides the encoders shared by the exporter CLI and library
//! users:
//!
//! - [`string_table`] - String interning for compact binary output
//! - [`bytes`] - Little-endian writer/reader primitives
//! - [`formats`] - Chunked binary and JSON scene encodings, validation, merge

pub mod bytes;
mod error;
pub mod formats;
pub mod string_table;

#[cfg(test)]
mod fixtures;

pub use bytes::{ByteReader, ByteWriter};
pub use error::{FormatError, Result};
pub use string_table::StringTable;

pub use formats::chunked::{
    ChunkType, ChunkedDecoder, ChunkedEncoder, ChunkedOptions, decode_scene, encode_scene,
};
pub use formats::text::{
    Severity, TextOptions, ValidationIssue, ValidationReport, clone_graph, from_json, merge,
    to_json, validate,
};
