//! Human-readable JSON scene encoding
//!
//! The document nests nodes as a tree under `root` and keeps every
//! resource table flat, all in camelCase. Buffer payloads are embedded as
//! base64 when requested, otherwise only their declared length is kept.

mod binary;
mod merge;
mod validate;

#[allow(deprecated)]
pub use binary::{from_binary, to_binary};
pub use merge::{clone_graph, merge};
pub use validate::{Severity, ValidationIssue, ValidationReport, validate};

use std::collections::BTreeMap;

use scenepack_shared::{
    Accessor, Animation, Buffer, BufferView, Component, Material, Mesh, NodeId, SceneGraph,
    SceneMetadata, SceneNode, Skin, Texture, Transform,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// Text encoding switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Indented output
    pub pretty: bool,
    /// Write buffer payloads as base64 `data`
    pub embed_buffers: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            embed_buffers: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneDocument {
    #[serde(default)]
    version: String,
    #[serde(default)]
    metadata: SceneMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<NodeDocument>,
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default)]
    textures: Vec<Texture>,
    #[serde(default)]
    meshes: Vec<Mesh>,
    #[serde(default)]
    animations: Vec<Animation>,
    #[serde(default)]
    skins: Vec<Skin>,
    #[serde(default)]
    buffers: Vec<BufferDocument>,
    #[serde(default)]
    buffer_views: Vec<BufferView>,
    #[serde(default)]
    accessors: Vec<Accessor>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDocument {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    transform: Transform,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default = "default_layer")]
    layer: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<Component>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefab: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeDocument>,
}

fn default_kind() -> String {
    "object".to_string()
}

fn default_true() -> bool {
    true
}

fn default_layer() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferDocument {
    id: String,
    byte_length: u32,
    /// Base64 payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    /// Offset into the blob of the binary JSON variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blob_offset: Option<u32>,
    /// Payload length in the blob; `byteLength` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blob_length: Option<u32>,
}

impl NodeDocument {
    fn from_graph(graph: &SceneGraph, id: NodeId, depth: usize) -> Option<Self> {
        let node = graph.node(id)?;
        // A corrupted arena could loop; a real hierarchy never nests this deep
        let children = if depth < graph.node_count() {
            node.children
                .iter()
                .filter_map(|&c| Self::from_graph(graph, c, depth + 1))
                .collect()
        } else {
            Vec::new()
        };
        Some(Self {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind.clone(),
            transform: node.transform,
            active: node.active,
            layer: node.layer,
            tags: node.tags.clone(),
            components: node.components.clone(),
            metadata: node.metadata.clone(),
            prefab: node.prefab.clone(),
            children,
        })
    }

    /// Insert this subtree into `graph` under `parent` (or as root)
    fn insert_into(self, graph: &mut SceneGraph, parent: Option<NodeId>) -> Option<NodeId> {
        let node = SceneNode {
            id: self.id,
            name: self.name,
            kind: self.kind,
            transform: self.transform,
            active: self.active,
            layer: self.layer,
            tags: self.tags,
            children: Vec::new(),
            components: self.components,
            metadata: self.metadata,
            prefab: self.prefab,
        };
        let id = match parent {
            Some(parent) => graph.add_child(parent, node)?,
            None => graph.set_root(node),
        };
        for child in self.children {
            child.insert_into(graph, Some(id));
        }
        Some(id)
    }
}

fn to_document(graph: &SceneGraph, embed_buffers: bool) -> SceneDocument {
    SceneDocument {
        version: graph.version.clone(),
        metadata: graph.metadata.clone(),
        root: graph
            .root
            .and_then(|root| NodeDocument::from_graph(graph, root, 0)),
        materials: graph.materials.clone(),
        textures: graph.textures.clone(),
        meshes: graph.meshes.clone(),
        animations: graph.animations.clone(),
        skins: graph.skins.clone(),
        buffers: graph
            .buffers
            .iter()
            .map(|b| BufferDocument {
                id: b.id.clone(),
                byte_length: b.byte_length,
                data: b
                    .data
                    .as_deref()
                    .filter(|_| embed_buffers)
                    .map(|data| STANDARD.encode(data)),
                blob_offset: None,
                blob_length: None,
            })
            .collect(),
        buffer_views: graph.buffer_views.clone(),
        accessors: graph.accessors.clone(),
    }
}

fn from_document(doc: SceneDocument) -> Result<SceneGraph> {
    let mut graph = SceneGraph {
        version: doc.version,
        metadata: doc.metadata,
        materials: doc.materials,
        textures: doc.textures,
        meshes: doc.meshes,
        animations: doc.animations,
        skins: doc.skins,
        buffer_views: doc.buffer_views,
        accessors: doc.accessors,
        ..Default::default()
    };
    for buffer in doc.buffers {
        let data = buffer
            .data
            .as_deref()
            .map(|text| STANDARD.decode(text))
            .transpose()?;
        graph.buffers.push(Buffer {
            id: buffer.id,
            byte_length: buffer.byte_length,
            data,
        });
    }
    if let Some(root) = doc.root {
        root.insert_into(&mut graph, None);
    }
    Ok(graph)
}

fn serialize_document(doc: &SceneDocument, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(json)
}

/// Serialize a scene graph to JSON text
pub fn to_json(graph: &SceneGraph, options: &TextOptions) -> Result<String> {
    serialize_document(&to_document(graph, options.embed_buffers), options.pretty)
}

/// Parse JSON text into a scene graph
///
/// Structural problems in the JSON itself are errors; semantic problems
/// (missing root, dangling references) are left for [`validate`].
pub fn from_json(text: &str) -> Result<SceneGraph> {
    let doc: SceneDocument = serde_json::from_str(text)?;
    from_document(doc)
}

/// Resolve a buffer's payload from the binary JSON blob
fn blob_slice(blob: &[u8], offset: u32, length: u32) -> Result<Vec<u8>> {
    let start = offset as usize;
    let end = start + length as usize;
    blob.get(start..end)
        .map(<[u8]>::to_vec)
        .ok_or(FormatError::Truncated {
            offset: start,
            needed: length as usize,
            available: blob.len().saturating_sub(start),
        })
}
