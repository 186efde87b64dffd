//! Export statistics

use std::time::Duration;

use glb_builder::json;

/// Counts and sizes reported after an export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportStats {
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    pub animation_count: usize,
    /// Sum of POSITION accessor counts over every primitive
    pub vertex_count: usize,
    /// Indexed triangle count over every triangle-list primitive
    pub triangle_count: usize,
    pub buffer_bytes: usize,
    pub json_bytes: usize,
    /// Zero when no GLB was produced
    pub glb_bytes: usize,
    pub duration: Duration,
}

impl ExportStats {
    /// Counts taken from a finished document
    pub fn from_document(root: &json::Root) -> Self {
        let mut stats = Self {
            node_count: root.nodes.len(),
            mesh_count: root.meshes.len(),
            material_count: root.materials.len(),
            texture_count: root.textures.len(),
            animation_count: root.animations.len(),
            ..Default::default()
        };

        let accessor_count = |index: json::Index<json::Accessor>| {
            root.accessors
                .get(index.value())
                .map(|a| a.count.0 as usize)
                .unwrap_or(0)
        };

        for primitive in root.meshes.iter().flat_map(|m| &m.primitives) {
            if let Some(&position) = primitive
                .attributes
                .get(&json::validation::Checked::Valid(json::mesh::Semantic::Positions))
            {
                stats.vertex_count += accessor_count(position);
            }
            let triangles = matches!(
                primitive.mode,
                json::validation::Checked::Valid(json::mesh::Mode::Triangles)
            );
            if triangles {
                if let Some(indices) = primitive.indices {
                    stats.triangle_count += accessor_count(indices) / 3;
                }
            }
        }
        stats
    }
}
