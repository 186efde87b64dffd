//! Scene graph to glTF 2.0 exporter
//!
//! Stages run in dependency order so each one only refers to indices that
//! earlier stages assigned:
//!
//! ```text
//! textures -> materials -> meshes -> nodes -> animations -> skins
//! ```
//!
//! Source buffer views and accessors are copied into one output buffer the
//! first time something references them; later references reuse the copy.
//! Anything that cannot be resolved is dropped and reported as an
//! [`ExportWarning`] instead of failing the export.

pub(crate) mod convert;
mod nodes;
mod resources;

#[cfg(test)]
mod tests;

use std::time::Instant;

use base64::{Engine, engine::general_purpose::STANDARD};
use glb_builder::{
    AccessorIndex, BufferBuilder, ViewIndex, assemble_glb, cleanup, json, new_document,
    validate_document,
};
use hashbrown::HashMap;
use scenepack_shared::SceneGraph;
use tracing::{debug, info};

use crate::error::{ExportError, ExportWarning, Warnings};
use crate::stats::ExportStats;

pub use convert::ORTHOGRAPHIC_FAR;

/// Generator string written into `asset.generator`
pub const DEFAULT_GENERATOR: &str = concat!("scene-export ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GltfExportOptions {
    pub generator: String,
    /// GLB container when `true`, JSON plus a separate buffer otherwise
    pub binary: bool,
    /// Indent the JSON text
    pub pretty: bool,
    /// JSON mode only: URI of the external buffer file. `None` embeds the
    /// buffer as a base64 data URI.
    pub buffer_uri: Option<String>,
}

impl Default for GltfExportOptions {
    fn default() -> Self {
        Self {
            generator: DEFAULT_GENERATOR.to_string(),
            binary: true,
            pretty: false,
            buffer_uri: None,
        }
    }
}

/// Result of one export
#[derive(Debug, Clone)]
pub struct GltfExport {
    pub document: json::Root,
    /// Serialized document
    pub json: Vec<u8>,
    /// Output buffer contents (the GLB BIN chunk or the external `.bin`)
    pub buffer: Vec<u8>,
    pub glb: Option<Vec<u8>>,
    pub stats: ExportStats,
    pub warnings: Vec<ExportWarning>,
}

impl GltfExport {
    /// Bytes of the primary output file: the GLB, or the JSON text
    pub fn output_bytes(&self) -> &[u8] {
        self.glb.as_deref().unwrap_or(&self.json)
    }
}

/// Scene graph exporter
///
/// Holds per-export index maps; they are reset at the start of every
/// [`GltfExporter::export`] call. Use one instance per concurrent export.
#[derive(Debug, Default)]
pub struct GltfExporter {
    root: json::Root,
    buffer: BufferBuilder,
    /// Source view index -> copied view (`None` once it failed to resolve)
    views: HashMap<u32, Option<ViewIndex>>,
    accessors: HashMap<u32, Option<AccessorIndex>>,
    /// (mag, min, wrapS, wrapT) GL codes -> sampler index
    samplers: HashMap<[u32; 4], u32>,
    textures: HashMap<String, u32>,
    materials: HashMap<String, u32>,
    meshes: HashMap<String, u32>,
    /// (mesh id, material id) -> mesh copy with the material overridden
    mesh_variants: HashMap<(String, String), u32>,
    /// Scene node id -> glTF node index
    node_ids: HashMap<String, u32>,
    warnings: Warnings,
}

impl GltfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export(
        &mut self,
        graph: &SceneGraph,
        options: &GltfExportOptions,
    ) -> Result<GltfExport, ExportError> {
        let started = Instant::now();
        *self = Self {
            root: new_document(&options.generator),
            ..Self::default()
        };

        self.export_textures(graph)?;
        self.export_materials(graph);
        self.export_meshes(graph)?;
        self.export_nodes(graph);
        self.export_animations(graph)?;
        self.export_skins(graph);

        debug!(
            "exported '{}': {} nodes, {} meshes, {} materials, {} textures",
            graph.metadata.name,
            self.root.nodes.len(),
            self.root.meshes.len(),
            self.root.materials.len(),
            self.root.textures.len()
        );

        let root = std::mem::take(&mut self.root);
        let buffer = std::mem::take(&mut self.buffer);
        let warnings = std::mem::take(&mut self.warnings);
        finish(root, buffer, warnings, options, started)
    }
}

/// Export with a fresh exporter
pub fn export_gltf(
    graph: &SceneGraph,
    options: &GltfExportOptions,
) -> Result<GltfExport, ExportError> {
    GltfExporter::new().export(graph, options)
}

/// Attach the buffer, clean up and serialize a finished document
pub(crate) fn finish(
    mut root: json::Root,
    buffer: BufferBuilder,
    mut warnings: Warnings,
    options: &GltfExportOptions,
    started: Instant,
) -> Result<GltfExport, ExportError> {
    if u32::try_from(buffer.len()).is_err() {
        return Err(ExportError::TooLarge);
    }
    let data = buffer.finish(&mut root);

    if !options.binary {
        if let Some(entry) = root.buffers.first_mut() {
            entry.uri = Some(match &options.buffer_uri {
                Some(uri) => uri.clone(),
                None => format!(
                    "data:application/octet-stream;base64,{}",
                    STANDARD.encode(&data)
                ),
            });
        }
    }

    cleanup(&mut root);
    for problem in validate_document(&root) {
        warnings.push("document", problem);
    }

    let json = if options.pretty {
        serde_json::to_vec_pretty(&root)?
    } else {
        serde_json::to_vec(&root)?
    };
    let glb = if options.binary {
        Some(assemble_glb(&root, &data)?)
    } else {
        None
    };

    let mut stats = ExportStats::from_document(&root);
    stats.buffer_bytes = data.len();
    stats.json_bytes = json.len();
    stats.glb_bytes = glb.as_ref().map_or(0, Vec::len);
    stats.duration = started.elapsed();

    let warnings = warnings.into_vec();
    info!(
        "glTF export: {} nodes, {} meshes, {} bytes of buffer data, {} warnings in {:.2?}",
        stats.node_count,
        stats.mesh_count,
        stats.buffer_bytes,
        warnings.len(),
        stats.duration
    );

    Ok(GltfExport {
        document: root,
        json,
        buffer: data,
        glb,
        stats,
        warnings,
    })
}
