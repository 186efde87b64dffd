//! Scene graph enums and values mapped onto their glTF counterparts

use glb_builder::{Valid, json};
use proc_gen::material::MaterialFactors;
use scenepack_shared::{
    Accessor, AccessorType, AlphaMode, AnimationPath, BufferTarget, CameraComponent,
    ComponentType, Interpolation, MagFilter, MinFilter, PrimitiveMode, Projection, SceneGraph,
    Transform, WrapMode,
};

/// Far plane for orthographic cameras without one; glTF requires `zfar` there
pub const ORTHOGRAPHIC_FAR: f32 = 1000.0;

pub(crate) fn component_type(component: ComponentType) -> json::accessor::ComponentType {
    use json::accessor::ComponentType as Gl;
    match component {
        ComponentType::Byte => Gl::I8,
        ComponentType::UnsignedByte => Gl::U8,
        ComponentType::Short => Gl::I16,
        ComponentType::UnsignedShort => Gl::U16,
        ComponentType::UnsignedInt => Gl::U32,
        ComponentType::Float => Gl::F32,
    }
}

pub(crate) fn accessor_type(kind: AccessorType) -> json::accessor::Type {
    use json::accessor::Type;
    match kind {
        AccessorType::Scalar => Type::Scalar,
        AccessorType::Vec2 => Type::Vec2,
        AccessorType::Vec3 => Type::Vec3,
        AccessorType::Vec4 => Type::Vec4,
        AccessorType::Mat2 => Type::Mat2,
        AccessorType::Mat3 => Type::Mat3,
        AccessorType::Mat4 => Type::Mat4,
    }
}

pub(crate) fn buffer_target(target: BufferTarget) -> json::buffer::Target {
    match target {
        BufferTarget::ArrayBuffer => json::buffer::Target::ArrayBuffer,
        BufferTarget::ElementArrayBuffer => json::buffer::Target::ElementArrayBuffer,
    }
}

pub(crate) fn mag_filter(filter: MagFilter) -> json::texture::MagFilter {
    match filter {
        MagFilter::Nearest => json::texture::MagFilter::Nearest,
        MagFilter::Linear => json::texture::MagFilter::Linear,
    }
}

pub(crate) fn min_filter(filter: MinFilter) -> json::texture::MinFilter {
    use json::texture::MinFilter as Gl;
    match filter {
        MinFilter::Nearest => Gl::Nearest,
        MinFilter::Linear => Gl::Linear,
        MinFilter::NearestMipmapNearest => Gl::NearestMipmapNearest,
        MinFilter::LinearMipmapNearest => Gl::LinearMipmapNearest,
        MinFilter::NearestMipmapLinear => Gl::NearestMipmapLinear,
        MinFilter::LinearMipmapLinear => Gl::LinearMipmapLinear,
    }
}

pub(crate) fn wrap_mode(mode: WrapMode) -> json::texture::WrappingMode {
    match mode {
        WrapMode::ClampToEdge => json::texture::WrappingMode::ClampToEdge,
        WrapMode::MirroredRepeat => json::texture::WrappingMode::MirroredRepeat,
        WrapMode::Repeat => json::texture::WrappingMode::Repeat,
    }
}

pub(crate) fn primitive_mode(mode: PrimitiveMode) -> json::mesh::Mode {
    use json::mesh::Mode;
    match mode {
        PrimitiveMode::Points => Mode::Points,
        PrimitiveMode::Lines => Mode::Lines,
        PrimitiveMode::LineLoop => Mode::LineLoop,
        PrimitiveMode::LineStrip => Mode::LineStrip,
        PrimitiveMode::Triangles => Mode::Triangles,
        PrimitiveMode::TriangleStrip => Mode::TriangleStrip,
        PrimitiveMode::TriangleFan => Mode::TriangleFan,
    }
}

pub(crate) fn alpha_mode(mode: AlphaMode) -> json::material::AlphaMode {
    match mode {
        AlphaMode::Opaque => json::material::AlphaMode::Opaque,
        AlphaMode::Mask => json::material::AlphaMode::Mask,
        AlphaMode::Blend => json::material::AlphaMode::Blend,
    }
}

pub(crate) fn interpolation(interpolation: Interpolation) -> json::animation::Interpolation {
    match interpolation {
        Interpolation::Linear => json::animation::Interpolation::Linear,
        Interpolation::Step => json::animation::Interpolation::Step,
        Interpolation::CubicSpline => json::animation::Interpolation::CubicSpline,
    }
}

pub(crate) fn animation_path(path: AnimationPath) -> json::animation::Property {
    use json::animation::Property;
    match path {
        AnimationPath::Translation => Property::Translation,
        AnimationPath::Rotation => Property::Rotation,
        AnimationPath::Scale => Property::Scale,
        AnimationPath::Weights => Property::MorphTargetWeights,
    }
}

/// Attribute name (`POSITION`, `TEXCOORD_0`, ...) to glTF semantic
pub(crate) fn semantic(name: &str) -> Option<json::mesh::Semantic> {
    use json::mesh::Semantic;
    match name {
        "POSITION" => Some(Semantic::Positions),
        "NORMAL" => Some(Semantic::Normals),
        "TANGENT" => Some(Semantic::Tangents),
        _ => {
            let (prefix, set) = name.rsplit_once('_')?;
            let set: u32 = set.parse().ok()?;
            match prefix {
                "TEXCOORD" => Some(Semantic::TexCoords(set)),
                "COLOR" => Some(Semantic::Colors(set)),
                "JOINTS" => Some(Semantic::Joints(set)),
                "WEIGHTS" => Some(Semantic::Weights(set)),
                _ => None,
            }
        }
    }
}

/// Write translation, rotation and scale, skipping identity components
pub(crate) fn apply_transform(node: &mut json::Node, transform: &Transform) {
    if transform.has_translation() {
        node.translation = Some(transform.position);
    }
    if transform.has_rotation() {
        node.rotation = Some(json::scene::UnitQuaternion(transform.rotation));
    }
    if transform.has_scale() {
        node.scale = Some(transform.scale);
    }
}

pub(crate) fn camera(name: &str, camera: &CameraComponent) -> json::Camera {
    let (type_, perspective, orthographic) = match camera.projection {
        Projection::Perspective {
            fov_degrees,
            aspect_ratio,
        } => (
            json::camera::Type::Perspective,
            Some(json::camera::Perspective {
                aspect_ratio,
                yfov: fov_degrees.to_radians(),
                zfar: camera.far,
                znear: camera.near,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            None,
        ),
        Projection::Orthographic { xmag, ymag } => (
            json::camera::Type::Orthographic,
            None,
            Some(json::camera::Orthographic {
                xmag,
                ymag,
                zfar: camera.far.unwrap_or(ORTHOGRAPHIC_FAR),
                znear: camera.near,
                extensions: Default::default(),
                extras: Default::default(),
            }),
        ),
    };

    json::Camera {
        name: Some(name.to_string()),
        orthographic,
        perspective,
        type_: Valid(type_),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Untextured metallic-roughness material
pub(crate) fn material(name: &str, factors: &MaterialFactors) -> json::Material {
    json::Material {
        alpha_cutoff: (factors.alpha_mode == AlphaMode::Mask)
            .then_some(json::material::AlphaCutoff(factors.alpha_cutoff)),
        alpha_mode: Valid(alpha_mode(factors.alpha_mode)),
        double_sided: factors.double_sided,
        name: Some(name.to_string()),
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_factor: json::material::PbrBaseColorFactor(factors.base_color),
            base_color_texture: None,
            metallic_factor: json::material::StrengthFactor(factors.metallic),
            roughness_factor: json::material::StrengthFactor(factors.roughness),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor(factors.emissive),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Min/max of a float SCALAR or VEC3 accessor read from the source buffer
///
/// Covers positions and animation key times, the two places glTF requires
/// bounds.
pub(crate) fn float_bounds(graph: &SceneGraph, accessor: &Accessor) -> Option<(Vec<f32>, Vec<f32>)> {
    let width = match (accessor.component_type, accessor.accessor_type) {
        (ComponentType::Float, AccessorType::Scalar) => 1,
        (ComponentType::Float, AccessorType::Vec3) => 3,
        _ => return None,
    };
    let view = graph.buffer_views.get(accessor.buffer_view as usize)?;
    let data = graph.buffers.get(view.buffer as usize)?.data.as_deref()?;
    let element = width * 4;
    let stride = view.byte_stride.map_or(element, |s| s as usize).max(element);
    let start = view.byte_offset as usize + accessor.byte_offset as usize;
    let end = (view.byte_offset as usize + view.byte_length as usize).min(data.len());

    let mut min = vec![f32::INFINITY; width];
    let mut max = vec![f32::NEG_INFINITY; width];
    for i in 0..accessor.count as usize {
        let at = start + i * stride;
        if at + element > end {
            return None;
        }
        for (k, chunk) in data[at..at + element].chunks_exact(4).enumerate() {
            let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            min[k] = min[k].min(value);
            max[k] = max[k].max(value);
        }
    }
    (accessor.count > 0).then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use json::mesh::Semantic;

    #[test]
    fn test_semantic_names() {
        assert_eq!(semantic("POSITION"), Some(Semantic::Positions));
        assert_eq!(semantic("TEXCOORD_1"), Some(Semantic::TexCoords(1)));
        assert_eq!(semantic("JOINTS_0"), Some(Semantic::Joints(0)));
        assert_eq!(semantic("TEXCOORD_x"), None);
        assert_eq!(semantic("_CUSTOM"), None);
    }

    #[test]
    fn test_identity_transform_writes_nothing() {
        let mut node = glb_builder::node("n");
        apply_transform(&mut node, &Transform::IDENTITY);
        assert!(node.translation.is_none());
        assert!(node.rotation.is_none());
        assert!(node.scale.is_none());

        apply_transform(&mut node, &Transform::from_position([3.0, 4.0, 5.0]));
        assert_eq!(node.translation, Some([3.0, 4.0, 5.0]));
        assert!(node.rotation.is_none());
        assert!(node.scale.is_none());
    }

    #[test]
    fn test_perspective_camera_in_radians() {
        let camera = camera("cam", &CameraComponent::perspective(90.0));
        let perspective = camera.perspective.unwrap();
        assert!((perspective.yfov - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(perspective.znear, 0.1);
        assert_eq!(perspective.zfar, None);
        assert!(camera.orthographic.is_none());
    }

    #[test]
    fn test_orthographic_camera_far_fallback() {
        let camera = camera("ortho", &CameraComponent::orthographic(2.0, 1.5));
        let ortho = camera.orthographic.unwrap();
        assert_eq!(ortho.xmag, 2.0);
        assert_eq!(ortho.ymag, 1.5);
        assert_eq!(ortho.zfar, ORTHOGRAPHIC_FAR);
    }

    #[test]
    fn test_material_cutoff_only_when_masked() {
        let opaque = material("m", &MaterialFactors::default());
        assert!(opaque.alpha_cutoff.is_none());

        let masked = material(
            "m",
            &MaterialFactors {
                alpha_mode: AlphaMode::Mask,
                alpha_cutoff: 0.3,
                ..Default::default()
            },
        );
        assert_eq!(masked.alpha_cutoff.map(|c| c.0), Some(0.3));
    }
}
