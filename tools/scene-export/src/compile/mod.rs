//! Direct compiler: composition to glTF without an intermediate scene graph
//!
//! Objects become nodes with procedurally generated meshes. A leaf object's
//! scale is baked into its geometry, so meshes are shared only between
//! objects with the same geometry, scale and material. Objects with children
//! or a scale track keep their scale on the node so it is inherited and
//! animated correctly. Materials are shared between every object whose
//! composed factors are identical.

mod animation;

#[cfg(test)]
mod tests;

use std::time::Instant;

use glam::{Mat4, Quat, Vec3};
use glb_builder::{BufferBuilder, MeshBuilder, json, new_document, node};
use hashbrown::{HashMap, HashSet};
use proc_gen::material::{MaterialFactors, TraitCompositor, compose_material_with};
use proc_gen::mesh::{PrimitiveKind, generate_primitive};
use scenepack_shared::{
    CameraComponent, CameraDecl, Composition, CompositionObject, DEFAULT_CAMERA_NEAR, LightDecl,
    Projection, PropertyAccess, PropertyValue, SpatialGroup, Transform, euler_degrees_to_quat,
};
use tracing::debug;

use crate::error::{ExportError, Warnings};
use crate::exporter::{GltfExport, GltfExportOptions, convert, finish};

/// Vertical field of view for cameras without a `fov` property
pub const DEFAULT_FOV_DEGREES: f32 = 60.0;

#[derive(Debug, Clone)]
pub struct DirectCompileOptions {
    pub output: GltfExportOptions,
    /// Visual trait presets used when composing materials
    pub traits: TraitCompositor,
    pub default_fov: f32,
}

impl Default for DirectCompileOptions {
    fn default() -> Self {
        Self {
            output: GltfExportOptions::default(),
            traits: TraitCompositor::default(),
            default_fov: DEFAULT_FOV_DEGREES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MeshKey {
    kind: PrimitiveKind,
    scale: [u32; 3],
    material: u32,
}

/// Composition compiler
///
/// Index maps are reset at the start of every [`DirectCompiler::compile`]
/// call. Use one instance per concurrent compile.
#[derive(Debug, Default)]
pub struct DirectCompiler {
    root: json::Root,
    buffer: BufferBuilder,
    meshes: HashMap<MeshKey, u32>,
    /// Material cache key -> material index
    materials: HashMap<String, u32>,
    /// Object, group and light name -> node index (timeline targets)
    named_nodes: HashMap<String, u32>,
    /// Names driven by a timeline scale track
    scale_targets: HashSet<String>,
    warnings: Warnings,
}

impl DirectCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(
        &mut self,
        composition: &Composition,
        options: &DirectCompileOptions,
    ) -> Result<GltfExport, ExportError> {
        let started = Instant::now();
        *self = Self {
            root: new_document(&options.output.generator),
            scale_targets: scale_targets(composition),
            ..Self::default()
        };

        let mut scene_nodes = Vec::new();
        for (i, object) in composition.objects.iter().enumerate() {
            scene_nodes.push(self.compile_object(object, &format!("objects[{}]", i), options));
        }
        for (i, group) in composition.groups.iter().enumerate() {
            scene_nodes.push(self.compile_group(group, &format!("groups[{}]", i), options));
        }
        for (i, light) in composition.lights.iter().enumerate() {
            scene_nodes.push(self.compile_light(light, &format!("lights[{}]", i)));
        }
        if let Some(camera) = &composition.camera {
            scene_nodes.push(self.compile_camera(camera, options));
        }
        for (i, timeline) in composition.timelines.iter().enumerate() {
            self.compile_timeline(timeline, &format!("timelines[{}]", i));
        }
        if !composition.environment.is_empty() {
            debug!(
                "environment settings ({} keys) have no glTF equivalent",
                composition.environment.len()
            );
        }

        if !scene_nodes.is_empty() {
            self.root.scenes.push(json::Scene {
                extensions: Default::default(),
                extras: Default::default(),
                name: Some(composition.name.clone()),
                nodes: scene_nodes.into_iter().map(json::Index::new).collect(),
            });
            self.root.scene = Some(json::Index::new(0));
        }

        debug!(
            "compiled '{}': {} nodes, {} meshes, {} materials",
            composition.name,
            self.root.nodes.len(),
            self.root.meshes.len(),
            self.root.materials.len()
        );

        let root = std::mem::take(&mut self.root);
        let buffer = std::mem::take(&mut self.buffer);
        let warnings = std::mem::take(&mut self.warnings);
        finish(root, buffer, warnings, &options.output, started)
    }

    fn compile_object(
        &mut self,
        object: &CompositionObject,
        path: &str,
        options: &DirectCompileOptions,
    ) -> u32 {
        let children: Vec<u32> = object
            .children
            .iter()
            .enumerate()
            .map(|(k, child)| self.compile_object(child, &format!("{}.children[{}]", path, k), options))
            .collect();

        let scale = object.properties.vec3("scale", [1.0; 3]);
        let geometry = object
            .properties
            .string("geometry")
            .or_else(|| object.properties.string("type"));
        let kind = match geometry {
            Some(name) => {
                let kind = PrimitiveKind::parse(name);
                if kind.is_none() {
                    self.warnings.push(
                        format!("{}.geometry", path),
                        format!("unknown geometry '{}', exported as an empty node", name),
                    );
                }
                kind
            }
            None => None,
        };

        let bake = kind.is_some()
            && children.is_empty()
            && !self.scale_targets.contains(&object.name);
        let transform = Transform {
            position: object.properties.vec3("position", [0.0; 3]),
            rotation: rotation_of(&object.properties),
            scale: if bake { [1.0; 3] } else { scale },
        };
        let mut gltf_node = node(&object.name);
        if let Some(kind) = kind {
            let mesh_scale = if bake { scale } else { [1.0; 3] };
            let mesh = self.mesh_for(kind, mesh_scale, object, options);
            gltf_node.mesh = Some(json::Index::new(mesh));
        }
        convert::apply_transform(&mut gltf_node, &transform);
        if !children.is_empty() {
            gltf_node.children = Some(children.into_iter().map(json::Index::new).collect());
        }
        self.push_named(gltf_node, &object.name, path)
    }

    fn mesh_for(
        &mut self,
        kind: PrimitiveKind,
        scale: [f32; 3],
        object: &CompositionObject,
        options: &DirectCompileOptions,
    ) -> u32 {
        let factors = compose_material_with(&options.traits, &object.properties, &object.traits);
        let material = self.material_for(&factors);

        let key = MeshKey {
            kind,
            scale: scale.map(f32::to_bits),
            material,
        };
        if let Some(&index) = self.meshes.get(&key) {
            return index;
        }

        let generated = generate_primitive(kind, scale);
        let accessors = MeshBuilder::new()
            .flat(
                &generated.positions,
                &generated.normals,
                &generated.uvs,
                &generated.indices,
            )
            .build(&mut self.buffer);

        let index = self.root.meshes.len() as u32;
        self.root
            .meshes
            .push(accessors.to_mesh(kind.as_str(), Some(material)));
        self.meshes.insert(key, index);
        index
    }

    fn material_for(&mut self, factors: &MaterialFactors) -> u32 {
        let key = factors.cache_key();
        if let Some(&index) = self.materials.get(&key) {
            return index;
        }
        let index = self.root.materials.len() as u32;
        self.root
            .materials
            .push(convert::material(&format!("material_{}", index), factors));
        self.materials.insert(key, index);
        index
    }

    fn compile_group(
        &mut self,
        group: &SpatialGroup,
        path: &str,
        options: &DirectCompileOptions,
    ) -> u32 {
        let mut children = Vec::with_capacity(group.objects.len() + group.groups.len());
        for (k, object) in group.objects.iter().enumerate() {
            children.push(self.compile_object(object, &format!("{}.objects[{}]", path, k), options));
        }
        for (k, nested) in group.groups.iter().enumerate() {
            children.push(self.compile_group(nested, &format!("{}.groups[{}]", path, k), options));
        }

        let transform = Transform {
            position: group.properties.vec3("position", [0.0; 3]),
            rotation: rotation_of(&group.properties),
            scale: group.properties.vec3("scale", [1.0; 3]),
        };
        let mut gltf_node = node(&group.name);
        convert::apply_transform(&mut gltf_node, &transform);
        if !children.is_empty() {
            gltf_node.children = Some(children.into_iter().map(json::Index::new).collect());
        }
        self.push_named(gltf_node, &group.name, path)
    }

    fn compile_light(&mut self, light: &LightDecl, path: &str) -> u32 {
        self.warnings.push(
            path,
            format!(
                "{} light '{}' exported as an empty node; punctual light extensions are not emitted",
                light.kind, light.name
            ),
        );
        let transform = Transform {
            position: light.properties.vec3("position", [0.0; 3]),
            rotation: rotation_of(&light.properties),
            scale: [1.0; 3],
        };
        let mut gltf_node = node(&light.name);
        convert::apply_transform(&mut gltf_node, &transform);
        self.push_named(gltf_node, &light.name, path)
    }

    fn compile_camera(&mut self, camera: &CameraDecl, options: &DirectCompileOptions) -> u32 {
        let properties = &camera.properties;
        let near = properties.number("near", DEFAULT_CAMERA_NEAR);
        let far = properties.property("far").and_then(PropertyValue::as_f32);
        let projection = match properties.string("type") {
            Some("orthographic") => {
                let size = properties.number("size", 1.0);
                Projection::Orthographic {
                    xmag: properties.number("xmag", size),
                    ymag: properties.number("ymag", size),
                }
            }
            _ => Projection::Perspective {
                fov_degrees: properties.number("fov", options.default_fov),
                aspect_ratio: properties.property("aspect").and_then(PropertyValue::as_f32),
            },
        };
        let component = CameraComponent {
            projection,
            near,
            far,
        };

        let position = properties.vec3("position", [0.0; 3]);
        let rotation = match properties.property("target").and_then(PropertyValue::as_vec3) {
            Some(target) => look_at(position, target).unwrap_or_else(|| rotation_of(properties)),
            None => rotation_of(properties),
        };

        let camera_index = self.root.cameras.len() as u32;
        self.root.cameras.push(convert::camera("Camera", &component));

        let mut gltf_node = node("Camera");
        gltf_node.camera = Some(json::Index::new(camera_index));
        convert::apply_transform(
            &mut gltf_node,
            &Transform {
                position,
                rotation,
                scale: [1.0; 3],
            },
        );
        let index = self.root.nodes.len() as u32;
        self.root.nodes.push(gltf_node);
        index
    }

    fn push_named(&mut self, gltf_node: json::Node, name: &str, path: &str) -> u32 {
        let index = self.root.nodes.len() as u32;
        self.root.nodes.push(gltf_node);
        if self.named_nodes.contains_key(name) {
            self.warnings.push(
                path,
                format!("duplicate name '{}'; timelines target the first one", name),
            );
        } else {
            self.named_nodes.insert(name.to_string(), index);
        }
        index
    }
}

/// Compile with a fresh compiler
pub fn compile_composition(
    composition: &Composition,
    options: &DirectCompileOptions,
) -> Result<GltfExport, ExportError> {
    DirectCompiler::new().compile(composition, options)
}

/// Names of every node a timeline `scale` track animates
fn scale_targets(composition: &Composition) -> HashSet<String> {
    composition
        .timelines
        .iter()
        .flat_map(|timeline| &timeline.tracks)
        .filter(|track| track.property == "scale")
        .map(|track| track.target.clone())
        .collect()
}

/// `rotation` as Euler degrees (3 values) or a quaternion (4 values)
fn rotation_of(properties: &impl PropertyAccess) -> [f32; 4] {
    let values = properties
        .property("rotation")
        .and_then(PropertyValue::as_floats);
    match values.as_deref() {
        Some(&[x, y, z]) => euler_degrees_to_quat([x, y, z]),
        Some(&[x, y, z, w]) => normalize_quat([x, y, z, w]),
        _ => Transform::IDENTITY.rotation,
    }
}

/// Unit quaternion, or identity for a zero-length input
fn normalize_quat(quat: [f32; 4]) -> [f32; 4] {
    let quat = Quat::from_array(quat);
    if quat.length_squared() > f32::EPSILON {
        quat.normalize().to_array()
    } else {
        Transform::IDENTITY.rotation
    }
}

/// Rotation that points the -Z axis from `eye` at `target`
fn look_at(eye: [f32; 3], target: [f32; 3]) -> Option<[f32; 4]> {
    let eye = Vec3::from_array(eye);
    let target = Vec3::from_array(target);
    let forward = target - eye;
    if forward.length_squared() <= f32::EPSILON {
        return None;
    }
    // Straight up or down: pick another up vector
    let up = if forward.normalize().cross(Vec3::Y).length_squared() <= 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let world = Mat4::look_at_rh(eye, target, up).inverse();
    Some(Quat::from_mat4(&world).normalize().to_array())
}
