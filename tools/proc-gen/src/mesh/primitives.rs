//! Parametric primitives with normals and UVs
//!
//! Every generator builds a unit-sized shape centred on the origin and
//! stretches it by a 3-axis scale. Normals are corrected for non-uniform
//! scale (divided by the scale, then renormalized).

use glam::Vec3;
use std::f32::consts::PI;
use tracing::warn;

use super::{GeneratedMesh, MeshBuilder, MeshBuilderUV, clamp_scale};

const MAX_SEGMENTS: u32 = 128;
const MAX_RINGS: u32 = 128;

/// Position and normal after a non-uniform stretch
fn stretch(position: Vec3, normal: Vec3, scale: Vec3) -> (Vec3, Vec3) {
    (position * scale, (normal / scale).normalize_or_zero())
}

fn add_vertex<M: MeshBuilderUV>(mesh: &mut M, position: Vec3, uv: (f32, f32), normal: Vec3, scale: Vec3) -> u16 {
    let (position, normal) = stretch(position, normal, scale);
    mesh.add_vertex_uv(position, uv, normal)
}

/// Generate a box of size `scale` (unit cube stretched per axis)
///
/// Always 24 vertices (4 per face, unshared so normals stay flat) and
/// 12 triangles. Each face maps the full `[0, 1]` UV square.
pub fn generate_box(scale: [f32; 3]) -> GeneratedMesh {
    let scale = clamp_scale("generate_box", scale);
    let mut mesh = GeneratedMesh::default();
    box_into(&mut mesh, scale);
    mesh
}

fn box_into<M: MeshBuilderUV>(mesh: &mut M, scale: Vec3) {
    // (normal, u axis, v axis) with u × v == normal so quads wind CCW from outside
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    for (normal, u_axis, v_axis) in faces {
        let mut quad = [0u16; 4];
        for (slot, (su, sv)) in quad.iter_mut().zip(corners) {
            let position = (normal + u_axis * su + v_axis * sv) * 0.5;
            let uv = ((su + 1.0) * 0.5, (1.0 - sv) * 0.5);
            *slot = add_vertex(mesh, position, uv, normal, scale);
        }
        mesh.add_triangle(quad[0], quad[1], quad[2]);
        mesh.add_triangle(quad[0], quad[2], quad[3]);
    }
}

/// Generate a plane on XZ (Y = 0) of size `scale.x` × `scale.z`, facing +Y
///
/// Always 4 vertices and 2 triangles; `scale.y` is ignored.
pub fn generate_plane(scale: [f32; 3]) -> GeneratedMesh {
    let scale = clamp_scale("generate_plane", scale);
    let scale = Vec3::new(scale.x, 1.0, scale.z);
    let mut mesh = GeneratedMesh::default();

    let mut quad = [0u16; 4];
    for (i, slot) in quad.iter_mut().enumerate() {
        let u = (i % 2) as f32;
        let v = (i / 2) as f32;
        let position = Vec3::new(u - 0.5, 0.0, v - 0.5);
        *slot = add_vertex(&mut mesh, position, (u, v), Vec3::Y, scale);
    }
    mesh.add_triangle(quad[0], quad[2], quad[1]);
    mesh.add_triangle(quad[1], quad[2], quad[3]);
    mesh
}

/// Generate a UV sphere of diameter `scale` (an ellipsoid when non-uniform)
///
/// Produces `(segments + 1) × (rings + 1)` vertices; the extra column is
/// the UV seam. `segments` is clamped to 3..=128, `rings` to 2..=128 so the
/// vertex count always fits 16-bit indices.
pub fn generate_sphere(scale: [f32; 3], segments: u32, rings: u32) -> GeneratedMesh {
    let scale = clamp_scale("generate_sphere", scale);
    let segments = segments.clamp(3, MAX_SEGMENTS);
    let rings = rings.clamp(2, MAX_RINGS);

    let mut mesh = GeneratedMesh::default();
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * 2.0 * PI;
            let direction = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            add_vertex(&mut mesh, direction * 0.5, (u, v), direction, scale);
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let i0 = (ring * stride + seg) as u16;
            let i1 = i0 + 1;
            let i2 = ((ring + 1) * stride + seg) as u16;
            let i3 = i2 + 1;
            mesh.add_triangle(i0, i1, i3);
            mesh.add_triangle(i0, i3, i2);
        }
    }
    mesh
}

/// Generate a (possibly tapered) cylinder of height `scale.y`
///
/// Radii are in unit space (0.5 gives a cylinder as wide as `scale.x`
/// and `scale.z`). The body has `2 × (segments + 1)` vertices; each cap
/// with a non-zero radius adds `1 + 2 × segments`.
pub fn generate_cylinder(
    scale: [f32; 3],
    radius_top: f32,
    radius_bottom: f32,
    segments: u32,
) -> GeneratedMesh {
    let scale = clamp_scale("generate_cylinder", scale);
    let radius_top = non_negative("radius_top", radius_top);
    let radius_bottom = non_negative("radius_bottom", radius_bottom);
    let segments = segments.clamp(3, MAX_SEGMENTS);

    let mut mesh = GeneratedMesh::default();
    let half = 0.5;

    // Slant normal: radial part scaled by the height, vertical part by the taper
    let taper = radius_bottom - radius_top;
    let slant = (1.0 + taper * taper).sqrt();
    let (ny, nr) = (taper / slant, 1.0 / slant);

    let ring_point = |radius: f32, y: f32, theta: f32| {
        Vec3::new(radius * theta.cos(), y, radius * theta.sin())
    };

    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let theta = u * 2.0 * PI;
        let normal = Vec3::new(nr * theta.cos(), ny, nr * theta.sin());
        add_vertex(&mut mesh, ring_point(radius_bottom, -half, theta), (u, 0.0), normal, scale);
        add_vertex(&mut mesh, ring_point(radius_top, half, theta), (u, 1.0), normal, scale);
    }
    for i in 0..segments {
        let i0 = (i * 2) as u16;
        let i1 = i0 + 1;
        let i2 = i0 + 2;
        let i3 = i0 + 3;
        mesh.add_triangle(i0, i1, i3);
        mesh.add_triangle(i0, i3, i2);
    }

    for (radius, y, normal) in [(radius_bottom, -half, Vec3::NEG_Y), (radius_top, half, Vec3::Y)] {
        if radius <= 0.0 {
            continue;
        }
        let center = add_vertex(&mut mesh, Vec3::new(0.0, y, 0.0), (0.5, 0.5), normal, scale);
        for i in 0..segments {
            let a = i as f32 / segments as f32 * 2.0 * PI;
            let b = (i + 1) as f32 / segments as f32 * 2.0 * PI;
            let cap_uv = |t: f32| (0.5 + 0.5 * t.cos(), 0.5 + 0.5 * t.sin());
            let i0 = add_vertex(&mut mesh, ring_point(radius, y, a), cap_uv(a), normal, scale);
            let i1 = add_vertex(&mut mesh, ring_point(radius, y, b), cap_uv(b), normal, scale);
            // Bottom cap faces -Y, top cap +Y
            if y < 0.0 {
                mesh.add_triangle(center, i0, i1);
            } else {
                mesh.add_triangle(center, i1, i0);
            }
        }
    }
    mesh
}

/// Generate a cone: a cylinder whose top radius is collapsed to a point
pub fn generate_cone(scale: [f32; 3], segments: u32) -> GeneratedMesh {
    generate_cylinder(scale, 0.0, 0.5, segments)
}

fn non_negative(name: &str, value: f32) -> f32 {
    if value.is_nan() || value < 0.0 {
        warn!("generate_cylinder: {} must be >= 0.0, clamping to 0.0", name);
        0.0
    } else {
        value
    }
}
