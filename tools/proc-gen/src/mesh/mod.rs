//! Mesh generation
//!
//! Generators are written against the [`MeshBuilder`] / [`MeshBuilderUV`]
//! traits so other vertex sinks can reuse them; [`GeneratedMesh`] is the
//! flat-array sink the exporters consume.

mod primitives;

use glam::Vec3;
use tracing::warn;

pub use primitives::{
    generate_box, generate_cone, generate_cylinder, generate_plane, generate_sphere,
};

/// Longitude segments used by [`generate_primitive`] for round shapes
pub const DEFAULT_SEGMENTS: u32 = 24;
/// Latitude rings used by [`generate_primitive`] for spheres
pub const DEFAULT_RINGS: u32 = 16;

/// Smallest extent a generator accepts along any axis
pub const MIN_EXTENT: f32 = 0.001;

/// Trait for mesh construction - enables generic geometry generation
pub trait MeshBuilder: Default {
    /// Add a vertex with position and normal, returning its index
    fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u16;

    /// Add a triangle using three vertex indices
    fn add_triangle(&mut self, i0: u16, i1: u16, i2: u16);
}

/// Trait extension for UV-mapped meshes
pub trait MeshBuilderUV: MeshBuilder {
    /// Add a vertex with position, UV coordinates, and normal, returning its index
    fn add_vertex_uv(&mut self, position: Vec3, uv: (f32, f32), normal: Vec3) -> u16;
}

/// Generated geometry as flat arrays
///
/// `positions` and `normals` hold 3 floats per vertex, `uvs` holds 2.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneratedMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u16>,
}

impl GeneratedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds of the positions, `None` when empty
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut points = self.positions.chunks_exact(3);
        let first = points.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for p in points {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }
}

impl MeshBuilder for GeneratedMesh {
    fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u16 {
        self.add_vertex_uv(position, (0.0, 0.0), normal)
    }

    fn add_triangle(&mut self, i0: u16, i1: u16, i2: u16) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }
}

impl MeshBuilderUV for GeneratedMesh {
    fn add_vertex_uv(&mut self, position: Vec3, uv: (f32, f32), normal: Vec3) -> u16 {
        let index = self.vertex_count() as u16;
        self.positions.extend_from_slice(&position.to_array());
        self.normals.extend_from_slice(&normal.to_array());
        self.uvs.extend_from_slice(&[uv.0, uv.1]);
        index
    }
}

/// Geometry names understood by the direct compiler
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Plane,
}

impl PrimitiveKind {
    /// Parse a geometry name (`cube` is an alias for `box`)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "box" | "cube" => Some(Self::Box),
            "sphere" => Some(Self::Sphere),
            "cylinder" => Some(Self::Cylinder),
            "cone" => Some(Self::Cone),
            "plane" => Some(Self::Plane),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Plane => "plane",
        }
    }
}

/// Generate a unit-sized primitive stretched by `scale`
pub fn generate_primitive(kind: PrimitiveKind, scale: [f32; 3]) -> GeneratedMesh {
    match kind {
        PrimitiveKind::Box => generate_box(scale),
        PrimitiveKind::Sphere => generate_sphere(scale, DEFAULT_SEGMENTS, DEFAULT_RINGS),
        PrimitiveKind::Cylinder => generate_cylinder(scale, 0.5, 0.5, DEFAULT_SEGMENTS),
        PrimitiveKind::Cone => generate_cone(scale, DEFAULT_SEGMENTS),
        PrimitiveKind::Plane => generate_plane(scale),
    }
}

/// Replace non-positive (or NaN) scale components with [`MIN_EXTENT`]
pub(crate) fn clamp_scale(generator: &str, scale: [f32; 3]) -> Vec3 {
    let mut clamped = scale;
    for (axis, value) in ["x", "y", "z"].iter().zip(clamped.iter_mut()) {
        if value.is_nan() || *value <= 0.0 {
            warn!(
                "{}: scale.{} must be > 0.0, clamping to {}",
                generator, axis, MIN_EXTENT
            );
            *value = MIN_EXTENT;
        }
    }
    Vec3::from_array(clamped)
}
