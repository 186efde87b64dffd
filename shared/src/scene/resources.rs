//! Resource tables referenced by scene nodes
//!
//! Cross-references are plain ids (materials, textures, meshes) or integer
//! indices (buffers, buffer views, accessors), never live pointers. Enum
//! values that glTF fixes numerically expose their GL codes so exporters
//! don't need their own lookup tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Buffer indirection
// ============================================================================

/// Scalar component type of accessor elements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    /// glTF `componentType` code
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::Byte => 5120,
            Self::UnsignedByte => 5121,
            Self::Short => 5122,
            Self::UnsignedShort => 5123,
            Self::UnsignedInt => 5125,
            Self::Float => 5126,
        }
    }

    pub fn from_gl_code(code: u32) -> Option<Self> {
        match code {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            _ => None,
        }
    }

    /// Size of one component in bytes
    pub const fn size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }
}

/// Element shape of an accessor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub const ALL: [Self; 7] = [
        Self::Scalar,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::Mat2,
        Self::Mat3,
        Self::Mat4,
    ];

    pub const fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// glTF `type` string
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }
}

/// Intended GPU binding of a buffer view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BufferTarget {
    ArrayBuffer,
    ElementArrayBuffer,
}

impl BufferTarget {
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::ArrayBuffer => 34962,
            Self::ElementArrayBuffer => 34963,
        }
    }

    pub fn from_gl_code(code: u32) -> Option<Self> {
        match code {
            34962 => Some(Self::ArrayBuffer),
            34963 => Some(Self::ElementArrayBuffer),
            _ => None,
        }
    }
}

/// Raw byte storage
///
/// `data` is absent when the payload lives outside the graph (e.g. a text
/// scene written without embedded buffers).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub id: String,
    pub byte_length: u32,
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
}

impl Buffer {
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            byte_length: data.len() as u32,
            data: Some(data),
        }
    }
}

/// Byte range inside a [`Buffer`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: u32,
    pub byte_offset: u32,
    pub byte_length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BufferTarget>,
}

/// Typed interpretation of a [`BufferView`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: u32,
    #[serde(default)]
    pub byte_offset: u32,
    pub component_type: ComponentType,
    pub count: u32,
    #[serde(rename = "type")]
    pub accessor_type: AccessorType,
    #[serde(default)]
    pub normalized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f32>>,
}

impl Accessor {
    /// Tightly packed size of one element in bytes
    pub const fn element_size(&self) -> usize {
        self.component_type.size() * self.accessor_type.component_count()
    }

    /// Bytes spanned by the accessor given an optional interleave stride
    pub fn byte_length(&self, stride: Option<u32>) -> usize {
        if self.count == 0 {
            return 0;
        }
        let element = self.element_size();
        let stride = stride.map(|s| s as usize).unwrap_or(element).max(element);
        stride * (self.count as usize - 1) + element
    }
}

// ============================================================================
// Materials and textures
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialKind {
    #[default]
    Pbr,
    Unlit,
    Custom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Texture slot binding on a material
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureRef {
    pub texture_id: String,
    #[serde(default)]
    pub tex_coord: u32,
}

impl TextureRef {
    pub fn new(texture_id: impl Into<String>) -> Self {
        Self {
            texture_id: texture_id.into(),
            tex_coord: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: MaterialKind,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<TextureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<TextureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<TextureRef>,
    #[serde(default)]
    pub emissive: [f32; 3],
    #[serde(default)]
    pub alpha_mode: AlphaMode,
    #[serde(default = "default_alpha_cutoff")]
    pub alpha_cutoff: f32,
    #[serde(default)]
    pub double_sided: bool,
}

fn default_alpha_cutoff() -> f32 {
    0.5
}

impl Material {
    /// White, non-metallic, mid-roughness, opaque
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: MaterialKind::Pbr,
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            base_color_texture: None,
            metallic_roughness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: default_alpha_cutoff(),
            double_sided: false,
        }
    }

    /// Bound texture slots as `(slot name, reference)`
    pub fn texture_slots(&self) -> impl Iterator<Item = (&'static str, &TextureRef)> {
        [
            ("baseColorTexture", self.base_color_texture.as_ref()),
            (
                "metallicRoughnessTexture",
                self.metallic_roughness_texture.as_ref(),
            ),
            ("normalTexture", self.normal_texture.as_ref()),
            ("occlusionTexture", self.occlusion_texture.as_ref()),
            ("emissiveTexture", self.emissive_texture.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, tex)| tex.map(|t| (slot, t)))
    }

    pub fn texture_slots_mut(&mut self) -> impl Iterator<Item = &mut TextureRef> {
        [
            self.base_color_texture.as_mut(),
            self.metallic_roughness_texture.as_mut(),
            self.normal_texture.as_mut(),
            self.occlusion_texture.as_mut(),
            self.emissive_texture.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Where a texture's image bytes come from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TextureSource {
    /// External file or URL
    Uri { uri: String },
    /// `data:` URI carrying the encoded image inline
    DataUri { uri: String },
    /// Encoded image stored in a buffer view
    #[serde(rename_all = "camelCase")]
    BufferView { buffer_view: u32, mime_type: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MagFilter {
    Nearest,
    #[default]
    Linear,
}

impl MagFilter {
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::Nearest => 9728,
            Self::Linear => 9729,
        }
    }

    pub fn from_gl_code(code: u32) -> Option<Self> {
        match code {
            9728 => Some(Self::Nearest),
            9729 => Some(Self::Linear),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    #[default]
    LinearMipmapLinear,
}

impl MinFilter {
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::Nearest => 9728,
            Self::Linear => 9729,
            Self::NearestMipmapNearest => 9984,
            Self::LinearMipmapNearest => 9985,
            Self::NearestMipmapLinear => 9986,
            Self::LinearMipmapLinear => 9987,
        }
    }

    pub fn from_gl_code(code: u32) -> Option<Self> {
        match code {
            9728 => Some(Self::Nearest),
            9729 => Some(Self::Linear),
            9984 => Some(Self::NearestMipmapNearest),
            9985 => Some(Self::LinearMipmapNearest),
            9986 => Some(Self::NearestMipmapLinear),
            9987 => Some(Self::LinearMipmapLinear),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

impl WrapMode {
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::ClampToEdge => 33071,
            Self::MirroredRepeat => 33648,
            Self::Repeat => 10497,
        }
    }

    pub fn from_gl_code(code: u32) -> Option<Self> {
        match code {
            33071 => Some(Self::ClampToEdge),
            33648 => Some(Self::MirroredRepeat),
            10497 => Some(Self::Repeat),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    pub id: String,
    pub name: String,
    pub source: TextureSource,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub min_filter: MinFilter,
    #[serde(default)]
    pub mag_filter: MagFilter,
    #[serde(default)]
    pub wrap_s: WrapMode,
    #[serde(default)]
    pub wrap_t: WrapMode,
}

// ============================================================================
// Meshes
// ============================================================================

/// Primitive topology
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::Points => 0,
            Self::Lines => 1,
            Self::LineLoop => 2,
            Self::LineStrip => 3,
            Self::Triangles => 4,
            Self::TriangleStrip => 5,
            Self::TriangleFan => 6,
        }
    }

    pub fn from_gl_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: [0.0; 3],
            max: [0.0; 3],
        }
    }
}

impl Bounds {
    /// Bounds of a point set, or `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = [f32; 3]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            for i in 0..3 {
                bounds.min[i] = bounds.min[i].min(p[i]);
                bounds.max[i] = bounds.max[i].max(p[i]);
            }
        }
        Some(bounds)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Primitive {
    /// Semantic name (`POSITION`, `NORMAL`, `TEXCOORD_0`, ...) → accessor index
    pub attributes: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    #[serde(default)]
    pub mode: PrimitiveMode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mesh {
    pub id: String,
    pub name: String,
    pub primitives: Vec<Primitive>,
    #[serde(default)]
    pub bounds: Bounds,
}

// ============================================================================
// Animation and skinning
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationChannel {
    /// Target node id (string id, resolved at export time)
    pub target_node: String,
    pub path: AnimationPath,
    /// Index into the owning animation's sampler list
    pub sampler: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSampler {
    /// Keyframe time accessor
    pub input: u32,
    /// Keyframe value accessor
    pub output: u32,
    #[serde(default)]
    pub interpolation: Interpolation,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
    pub samplers: Vec<AnimationSampler>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinJoint {
    pub node_id: String,
    /// Column-major 4×4 inverse bind matrix
    pub inverse_bind_matrix: [f32; 16],
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skin {
    pub id: String,
    pub name: String,
    pub joints: Vec<SkinJoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_codes() {
        assert_eq!(ComponentType::Float.gl_code(), 5126);
        assert_eq!(ComponentType::UnsignedShort.gl_code(), 5123);
        assert_eq!(ComponentType::from_gl_code(5125), Some(ComponentType::UnsignedInt));
        assert_eq!(ComponentType::from_gl_code(5124), None);
    }

    #[test]
    fn test_buffer_target_codes() {
        assert_eq!(BufferTarget::ArrayBuffer.gl_code(), 34962);
        assert_eq!(BufferTarget::ElementArrayBuffer.gl_code(), 34963);
    }

    #[test]
    fn test_accessor_byte_length() {
        let accessor = Accessor {
            buffer_view: 0,
            byte_offset: 0,
            component_type: ComponentType::Float,
            count: 4,
            accessor_type: AccessorType::Vec3,
            normalized: false,
            min: None,
            max: None,
        };
        assert_eq!(accessor.element_size(), 12);
        assert_eq!(accessor.byte_length(None), 48);
        // Interleaved with a 32-byte stride: last element only needs 12 bytes
        assert_eq!(accessor.byte_length(Some(32)), 32 * 3 + 12);
    }

    #[test]
    fn test_texture_slots() {
        let mut material = Material::new("m", "M");
        assert_eq!(material.texture_slots().count(), 0);
        material.normal_texture = Some(TextureRef::new("n"));
        material.base_color_texture = Some(TextureRef::new("c"));
        let slots: Vec<_> = material.texture_slots().map(|(s, _)| s).collect();
        assert_eq!(slots, vec!["baseColorTexture", "normalTexture"]);
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points([[0.0, 1.0, 2.0], [-1.0, 3.0, 0.0]]).unwrap();
        assert_eq!(bounds.min, [-1.0, 1.0, 0.0]);
        assert_eq!(bounds.max, [0.0, 3.0, 2.0]);
        assert!(Bounds::from_points([]).is_none());
    }
}
