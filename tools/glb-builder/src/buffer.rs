//! Low-level buffer packing with automatic alignment and accessor creation
//!
//! Everything lands in a single binary buffer (index 0). Each packed range
//! starts on a 4-byte boundary, which satisfies the glTF alignment rule for
//! every component type.

use crate::utils::{align_buffer, compute_bounds};
use bytemuck::Pod;
use gltf_json as json;
use gltf_json::accessor::{ComponentType, GenericComponentType, Type};
use gltf_json::buffer::Target;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Buffer view index returned by [`BufferBuilder::push_view`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewIndex(pub u32);

impl ViewIndex {
    pub fn as_json_index(&self) -> json::Index<json::buffer::View> {
        json::Index::new(self.0)
    }
}

/// Accessor over `count` elements of a view, starting at its first byte
pub fn accessor(view: ViewIndex, count: usize, component: ComponentType, type_: Type) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(view.as_json_index()),
        byte_offset: Some(0u64.into()),
        count: count.into(),
        component_type: Valid(GenericComponentType(component)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: None,
        max: None,
        name: None,
        normalized: false,
        sparse: None,
    }
}

/// Float bounds as the JSON arrays glTF expects
pub fn bounds_value(values: &[f32]) -> json::Value {
    json::Value::Array(values.iter().map(|&v| json::Value::from(v as f64)).collect())
}

/// Builder for binary buffer with automatic alignment
#[derive(Debug, Default)]
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Copy a raw byte range into the buffer as a new view
    pub fn push_view(
        &mut self,
        bytes: &[u8],
        byte_stride: Option<usize>,
        target: Option<Target>,
    ) -> ViewIndex {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        align_buffer(&mut self.buffer);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: byte_stride.map(json::buffer::Stride),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(Valid),
        });
        ViewIndex(self.views.len() as u32 - 1)
    }

    /// Register an accessor built by the caller
    pub fn push_accessor(&mut self, accessor: json::Accessor) -> AccessorIndex {
        self.accessors.push(accessor);
        AccessorIndex(self.accessors.len() as u32 - 1)
    }

    fn pack<T: Pod>(
        &mut self,
        data: &[T],
        component: ComponentType,
        type_: Type,
        target: Option<Target>,
    ) -> AccessorIndex {
        let view = self.push_view(bytemuck::cast_slice(data), None, target);
        self.push_accessor(accessor(view, data.len(), component, type_))
    }

    fn set_bounds(&mut self, index: AccessorIndex, min: &[f32], max: &[f32]) {
        if let Some(accessor) = self.accessors.get_mut(index.0 as usize) {
            accessor.min = Some(bounds_value(min));
            accessor.max = Some(bounds_value(max));
        }
    }

    /// Pack Vec3 positions with bounds calculation
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let index = self.pack(positions, ComponentType::F32, Type::Vec3, Some(Target::ArrayBuffer));
        let (min, max) = compute_bounds(positions);
        self.set_bounds(index, &min, &max);
        index
    }

    /// Pack Vec3 data (normals, translations, scales, etc.)
    pub fn pack_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        self.pack(data, ComponentType::F32, Type::Vec3, Some(Target::ArrayBuffer))
    }

    /// Pack Vec2 data (UVs, etc.)
    pub fn pack_vec2(&mut self, data: &[[f32; 2]]) -> AccessorIndex {
        self.pack(data, ComponentType::F32, Type::Vec2, Some(Target::ArrayBuffer))
    }

    /// Pack u16 indices
    pub fn pack_indices_u16(&mut self, indices: &[u16]) -> AccessorIndex {
        self.pack(
            indices,
            ComponentType::U16,
            Type::Scalar,
            Some(Target::ElementArrayBuffer),
        )
    }

    /// Pack Mat4 data (inverse bind matrices, etc.)
    pub fn pack_mat4(&mut self, matrices: &[[f32; 16]]) -> AccessorIndex {
        self.pack(matrices, ComponentType::F32, Type::Mat4, None)
    }

    /// Pack animation output Vec3 data (no vertex target)
    pub fn pack_keyframes_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        self.pack(data, ComponentType::F32, Type::Vec3, None)
    }

    /// Pack animation output Vec4 data (no vertex target)
    pub fn pack_keyframes_vec4(&mut self, data: &[[f32; 4]]) -> AccessorIndex {
        self.pack(data, ComponentType::F32, Type::Vec4, None)
    }

    /// Pack scalar f32 data with min/max (animation times, etc.)
    pub fn pack_scalars_with_bounds(&mut self, scalars: &[f32]) -> AccessorIndex {
        let index = self.pack(scalars, ComponentType::F32, Type::Scalar, None);
        let min = scalars.iter().copied().fold(f32::INFINITY, f32::min);
        let max = scalars.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if min <= max {
            self.set_bounds(index, &[min], &[max]);
        }
        index
    }

    /// Move views, accessors and the buffer entry into `root`
    ///
    /// Returns the packed bytes for the GLB binary chunk (or a loose .bin
    /// file). No buffer entry is added when nothing was packed.
    pub fn finish(self, root: &mut json::Root) -> Vec<u8> {
        if !self.buffer.is_empty() || !self.views.is_empty() {
            root.buffers.push(json::Buffer {
                byte_length: self.buffer.len().into(),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: None,
            });
        }
        root.buffer_views = self.views;
        root.accessors = self.accessors;
        self.buffer
    }
}
