//! Buffer, texture, material and mesh stages

use std::collections::BTreeMap;

use glb_builder::buffer::{accessor, bounds_value};
use glb_builder::{AccessorIndex, Valid, ViewIndex, json};
use proc_gen::material::MaterialFactors;
use scenepack_shared::{MaterialKind, SceneGraph, Texture, TextureRef, TextureSource};

use super::GltfExporter;
use super::convert;
use crate::error::ExportError;

impl GltfExporter {
    /// Copy a source buffer view into the output buffer (once)
    pub(super) fn export_view(
        &mut self,
        graph: &SceneGraph,
        index: u32,
        path: &str,
    ) -> Result<Option<ViewIndex>, ExportError> {
        if let Some(cached) = self.views.get(&index) {
            return Ok(*cached);
        }
        let exported = self.copy_view(graph, index, path)?;
        self.views.insert(index, exported);
        Ok(exported)
    }

    fn copy_view(
        &mut self,
        graph: &SceneGraph,
        index: u32,
        path: &str,
    ) -> Result<Option<ViewIndex>, ExportError> {
        let Some(view) = graph.buffer_views.get(index as usize) else {
            self.warnings
                .push(path, format!("buffer view {} not found", index));
            return Ok(None);
        };
        let Some(buffer) = graph.buffers.get(view.buffer as usize) else {
            self.warnings.push(
                path,
                format!("buffer view {} refers to missing buffer {}", index, view.buffer),
            );
            return Ok(None);
        };
        let Some(data) = buffer.data.as_deref() else {
            self.warnings.push(
                path,
                format!("buffer '{}' has no payload; external buffers are not copied", buffer.id),
            );
            return Ok(None);
        };

        let offset = view.byte_offset as usize;
        let end = offset + view.byte_length as usize;
        let bytes = data.get(offset..end).ok_or_else(|| ExportError::OutOfBounds {
            path: format!("bufferViews[{}]", index),
            offset,
            end,
            len: data.len(),
        })?;

        Ok(Some(self.buffer.push_view(
            bytes,
            view.byte_stride.map(|s| s as usize),
            view.target.map(convert::buffer_target),
        )))
    }

    /// Copy a source accessor and its view (once)
    ///
    /// Float SCALAR and VEC3 accessors without bounds get min/max computed
    /// from the data.
    pub(super) fn export_accessor(
        &mut self,
        graph: &SceneGraph,
        index: u32,
        path: &str,
    ) -> Result<Option<AccessorIndex>, ExportError> {
        if let Some(cached) = self.accessors.get(&index) {
            return Ok(*cached);
        }

        let exported = match graph.accessors.get(index as usize) {
            None => {
                self.warnings
                    .push(path, format!("accessor {} not found", index));
                None
            }
            Some(source) => match self.export_view(graph, source.buffer_view, path)? {
                None => None,
                Some(view) => {
                    let mut gltf_accessor = accessor(
                        view,
                        source.count as usize,
                        convert::component_type(source.component_type),
                        convert::accessor_type(source.accessor_type),
                    );
                    gltf_accessor.byte_offset = Some((source.byte_offset as u64).into());
                    gltf_accessor.normalized = source.normalized;

                    let bounds = match (&source.min, &source.max) {
                        (Some(min), Some(max)) => Some((min.clone(), max.clone())),
                        _ => convert::float_bounds(graph, source),
                    };
                    if let Some((min, max)) = bounds {
                        gltf_accessor.min = Some(bounds_value(&min));
                        gltf_accessor.max = Some(bounds_value(&max));
                    }
                    Some(self.buffer.push_accessor(gltf_accessor))
                }
            },
        };

        self.accessors.insert(index, exported);
        Ok(exported)
    }

    pub(super) fn export_textures(&mut self, graph: &SceneGraph) -> Result<(), ExportError> {
        for (i, texture) in graph.textures.iter().enumerate() {
            let path = format!("textures[{}]", i);
            if self.textures.contains_key(&texture.id) {
                self.warnings
                    .push(&path, format!("duplicate texture id '{}' skipped", texture.id));
                continue;
            }

            let (uri, buffer_view, mime_type) = match &texture.source {
                TextureSource::Uri { uri } | TextureSource::DataUri { uri } => {
                    (Some(uri.clone()), None, None)
                }
                TextureSource::BufferView {
                    buffer_view,
                    mime_type,
                } => {
                    let Some(view) = self.export_view(graph, *buffer_view, &path)? else {
                        continue;
                    };
                    (
                        None,
                        Some(view.as_json_index()),
                        Some(json::image::MimeType(mime_type.clone())),
                    )
                }
            };

            let image = self.root.images.len() as u32;
            self.root.images.push(json::Image {
                buffer_view,
                mime_type,
                name: Some(texture.name.clone()),
                uri,
                extensions: Default::default(),
                extras: Default::default(),
            });

            let sampler = self.sampler_for(texture);
            let index = self.root.textures.len() as u32;
            self.root.textures.push(json::Texture {
                name: Some(texture.name.clone()),
                sampler: Some(json::Index::new(sampler)),
                source: json::Index::new(image),
                extensions: Default::default(),
                extras: Default::default(),
            });
            self.textures.insert(texture.id.clone(), index);
        }
        Ok(())
    }

    fn sampler_for(&mut self, texture: &Texture) -> u32 {
        let key = [
            texture.mag_filter.gl_code(),
            texture.min_filter.gl_code(),
            texture.wrap_s.gl_code(),
            texture.wrap_t.gl_code(),
        ];
        if let Some(&index) = self.samplers.get(&key) {
            return index;
        }

        let index = self.root.samplers.len() as u32;
        self.root.samplers.push(json::texture::Sampler {
            mag_filter: Some(Valid(convert::mag_filter(texture.mag_filter))),
            min_filter: Some(Valid(convert::min_filter(texture.min_filter))),
            name: None,
            wrap_s: Valid(convert::wrap_mode(texture.wrap_s)),
            wrap_t: Valid(convert::wrap_mode(texture.wrap_t)),
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.samplers.insert(key, index);
        index
    }

    fn texture_slot(
        &mut self,
        path: &str,
        slot: &str,
        reference: Option<&TextureRef>,
    ) -> Option<(json::Index<json::Texture>, u32)> {
        let reference = reference?;
        match self.textures.get(&reference.texture_id) {
            Some(&index) => Some((json::Index::new(index), reference.tex_coord)),
            None => {
                self.warnings.push(
                    format!("{}.{}", path, slot),
                    format!("texture '{}' not found", reference.texture_id),
                );
                None
            }
        }
    }

    pub(super) fn export_materials(&mut self, graph: &SceneGraph) {
        for (i, material) in graph.materials.iter().enumerate() {
            let path = format!("materials[{}]", i);
            if self.materials.contains_key(&material.id) {
                self.warnings
                    .push(&path, format!("duplicate material id '{}' skipped", material.id));
                continue;
            }
            if material.kind != MaterialKind::Pbr {
                self.warnings.push(
                    &path,
                    format!("{:?} material exported as metallic-roughness", material.kind),
                );
            }

            let factors = MaterialFactors {
                base_color: material.base_color,
                metallic: material.metallic,
                roughness: material.roughness,
                emissive: material.emissive,
                alpha_mode: material.alpha_mode,
                alpha_cutoff: material.alpha_cutoff,
                double_sided: material.double_sided,
            };
            let mut gltf_material = convert::material(&material.name, &factors);

            let info = |(index, tex_coord): (json::Index<json::Texture>, u32)| json::texture::Info {
                index,
                tex_coord,
                extensions: Default::default(),
                extras: Default::default(),
            };
            let pbr = &mut gltf_material.pbr_metallic_roughness;
            pbr.base_color_texture = self
                .texture_slot(&path, "baseColorTexture", material.base_color_texture.as_ref())
                .map(info);
            pbr.metallic_roughness_texture = self
                .texture_slot(
                    &path,
                    "metallicRoughnessTexture",
                    material.metallic_roughness_texture.as_ref(),
                )
                .map(info);
            gltf_material.emissive_texture = self
                .texture_slot(&path, "emissiveTexture", material.emissive_texture.as_ref())
                .map(info);
            gltf_material.normal_texture = self
                .texture_slot(&path, "normalTexture", material.normal_texture.as_ref())
                .map(|(index, tex_coord)| json::material::NormalTexture {
                    index,
                    scale: 1.0,
                    tex_coord,
                    extensions: Default::default(),
                    extras: Default::default(),
                });
            gltf_material.occlusion_texture = self
                .texture_slot(&path, "occlusionTexture", material.occlusion_texture.as_ref())
                .map(|(index, tex_coord)| json::material::OcclusionTexture {
                    index,
                    strength: json::material::StrengthFactor(1.0),
                    tex_coord,
                    extensions: Default::default(),
                    extras: Default::default(),
                });

            let index = self.root.materials.len() as u32;
            self.root.materials.push(gltf_material);
            self.materials.insert(material.id.clone(), index);
        }
    }

    pub(super) fn material_index(&mut self, id: &str, path: &str) -> Option<u32> {
        let index = self.materials.get(id).copied();
        if index.is_none() {
            self.warnings
                .push(path, format!("material '{}' not found", id));
        }
        index
    }

    pub(super) fn export_meshes(&mut self, graph: &SceneGraph) -> Result<(), ExportError> {
        for (i, mesh) in graph.meshes.iter().enumerate() {
            let mesh_path = format!("meshes[{}]", i);
            if self.meshes.contains_key(&mesh.id) {
                self.warnings
                    .push(&mesh_path, format!("duplicate mesh id '{}' skipped", mesh.id));
                continue;
            }

            let mut primitives = Vec::with_capacity(mesh.primitives.len());
            for (j, primitive) in mesh.primitives.iter().enumerate() {
                let path = format!("{}.primitives[{}]", mesh_path, j);

                let mut attributes = BTreeMap::new();
                for (name, &source) in &primitive.attributes {
                    let Some(semantic) = convert::semantic(name) else {
                        self.warnings.push(
                            format!("{}.attributes.{}", path, name),
                            "unknown attribute semantic",
                        );
                        continue;
                    };
                    if let Some(index) = self.export_accessor(graph, source, &path)? {
                        attributes.insert(Valid(semantic), index.as_json_index());
                    }
                }

                let indices = match primitive.indices {
                    Some(source) => self.export_accessor(graph, source, &path)?,
                    None => None,
                };
                let material = match primitive.material_id.as_deref() {
                    Some(id) => self.material_index(id, &format!("{}.material", path)),
                    None => None,
                };

                primitives.push(json::mesh::Primitive {
                    attributes,
                    extensions: Default::default(),
                    extras: Default::default(),
                    indices: indices.map(|i| i.as_json_index()),
                    material: material.map(json::Index::new),
                    mode: Valid(convert::primitive_mode(primitive.mode)),
                    targets: None,
                });
            }

            if primitives.is_empty() {
                self.warnings
                    .push(&mesh_path, "mesh has no primitives, dropped");
                continue;
            }

            let index = self.root.meshes.len() as u32;
            self.root.meshes.push(json::Mesh {
                name: Some(mesh.name.clone()),
                primitives,
                weights: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
            self.meshes.insert(mesh.id.clone(), index);
        }
        Ok(())
    }

    /// glTF mesh for a mesh component, copying the mesh when the component
    /// overrides its material
    pub(super) fn mesh_index(
        &mut self,
        mesh_id: &str,
        material_override: Option<&str>,
        path: &str,
    ) -> Option<u32> {
        let Some(&base) = self.meshes.get(mesh_id) else {
            self.warnings
                .push(path, format!("mesh '{}' not found", mesh_id));
            return None;
        };
        let Some(material_id) = material_override else {
            return Some(base);
        };

        let key = (mesh_id.to_string(), material_id.to_string());
        if let Some(&variant) = self.mesh_variants.get(&key) {
            return Some(variant);
        }
        let Some(material) = self.material_index(material_id, path) else {
            return Some(base);
        };
        let already_bound = self.root.meshes[base as usize]
            .primitives
            .iter()
            .all(|p| p.material.map(|m| m.value()) == Some(material as usize));
        if already_bound {
            return Some(base);
        }

        let mut variant = self.root.meshes[base as usize].clone();
        for primitive in &mut variant.primitives {
            primitive.material = Some(json::Index::new(material));
        }
        let index = self.root.meshes.len() as u32;
        self.root.meshes.push(variant);
        self.mesh_variants.insert(key, index);
        Some(index)
    }
}
