//! glTF 2.0 document helpers for the scenepack exporters
//!
//! The document model itself is [`gltf_json::Root`]. This crate adds:
//! - BufferBuilder: Pack binary data with automatic alignment and accessor creation
//! - MeshBuilder: Pack vertex streams into a primitive
//! - Document helpers: `new_document`, `validate_document`, `cleanup`
//! - GLB containers: `assemble_glb` / `parse_glb`
//!
//! # Example
//!
//! ```
//! use glb_builder::*;
//!
//! let mut buffer = BufferBuilder::new();
//! let mesh = MeshBuilder::new()
//!     .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
//!     .normals(&[[0.0, 0.0, 1.0]; 3])
//!     .indices(&[0, 1, 2])
//!     .build(&mut buffer);
//!
//! let mut root = new_document("glb-builder");
//! root.meshes.push(mesh.to_mesh("Triangle", None));
//! let data = buffer.finish(&mut root);
//!
//! assert!(validate_document(&root).is_empty());
//! let glb = assemble_glb(&root, &data).unwrap();
//! assert_eq!(&glb[0..4], b"glTF");
//! ```

pub mod buffer;
pub mod document;
mod error;
pub mod glb;
pub mod mesh;
pub mod utils;

pub use buffer::{AccessorIndex, BufferBuilder, ViewIndex};
pub use document::{cleanup, new_document, node, validate_document};
pub use error::GlbError;
pub use glb::{ParsedGlb, assemble_glb, parse_glb};
pub use mesh::{MeshAccessors, MeshBuilder};
pub use utils::{align_buffer, compute_bounds};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;
