//! High-level mesh construction

use std::collections::BTreeMap;

use crate::buffer::{AccessorIndex, BufferBuilder};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor indices for a mesh
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
    pub uvs: Option<AccessorIndex>,
    pub indices: Option<AccessorIndex>,
}

impl MeshAccessors {
    /// Triangle primitive referencing these accessors
    pub fn to_primitive(&self, material: Option<u32>) -> json::mesh::Primitive {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            self.positions.as_json_index(),
        );
        if let Some(normals) = self.normals {
            attributes.insert(Valid(json::mesh::Semantic::Normals), normals.as_json_index());
        }
        if let Some(uvs) = self.uvs {
            attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), uvs.as_json_index());
        }

        json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: self.indices.map(|i| i.as_json_index()),
            material: material.map(json::Index::new),
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        }
    }

    /// Single-primitive mesh
    pub fn to_mesh(&self, name: &str, material: Option<u32>) -> json::Mesh {
        json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![self.to_primitive(material)],
            weights: None,
        }
    }
}

/// Builder for mesh data
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    uvs: Option<Vec<[f32; 2]>>,
    indices: Option<Vec<u16>>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set positions (required)
    pub fn positions(mut self, positions: &[[f32; 3]]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    /// Set normals (optional)
    pub fn normals(mut self, normals: &[[f32; 3]]) -> Self {
        self.normals = Some(normals.to_vec());
        self
    }

    /// Set UVs (optional)
    pub fn uvs(mut self, uvs: &[[f32; 2]]) -> Self {
        self.uvs = Some(uvs.to_vec());
        self
    }

    /// Set indices (optional)
    pub fn indices(mut self, indices: &[u16]) -> Self {
        self.indices = Some(indices.to_vec());
        self
    }

    /// Set streams from flat `[x, y, z, ...]` arrays; trailing partial elements are ignored
    pub fn flat(self, positions: &[f32], normals: &[f32], uvs: &[f32], indices: &[u16]) -> Self {
        let builder = self
            .positions(&chunk3(positions))
            .indices(indices);
        let builder = if normals.is_empty() {
            builder
        } else {
            builder.normals(&chunk3(normals))
        };
        if uvs.is_empty() {
            builder
        } else {
            let uvs: Vec<[f32; 2]> = uvs.chunks_exact(2).map(|c| [c[0], c[1]]).collect();
            builder.uvs(&uvs)
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> MeshAccessors {
        let positions = buffer.pack_positions(&self.positions);
        let normals = self.normals.as_ref().map(|n| buffer.pack_vec3(n));
        let uvs = self.uvs.as_ref().map(|uv| buffer.pack_vec2(uv));
        let indices = self.indices.as_ref().map(|i| buffer.pack_indices_u16(i));

        MeshAccessors {
            positions,
            normals,
            uvs,
            indices,
        }
    }
}

fn chunk3(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}
