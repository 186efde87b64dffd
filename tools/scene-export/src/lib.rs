//! scene-export library
//!
//! Turns scenes into glTF 2.0 documents. Two paths are available:
//!
//! - [`exporter`] converts an existing [`scenepack_shared::SceneGraph`],
//!   copying its buffer payloads into a single output buffer
//! - [`compile`] builds geometry and materials straight from a
//!   [`scenepack_shared::Composition`], skipping the scene graph
//!
//! Both return a [`GltfExport`] carrying the typed document, the serialized
//! JSON, the binary buffer, an optional GLB container, statistics and any
//! non-fatal warnings.

pub mod compile;
pub mod config;
mod error;
pub mod exporter;
pub mod stats;

pub use compile::{DirectCompileOptions, DirectCompiler, compile_composition};
pub use error::{ExportError, ExportWarning};
pub use exporter::{GltfExport, GltfExportOptions, GltfExporter, export_gltf};
pub use stats::ExportStats;
