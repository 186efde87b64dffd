use std::collections::BTreeMap;

use glb_builder::{json, parse_glb};
use scenepack_shared::*;

use super::*;

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn push_accessor(
    graph: &mut SceneGraph,
    bytes: &[u8],
    component_type: ComponentType,
    accessor_type: AccessorType,
    count: u32,
) -> u32 {
    let data = graph.buffers[0].data.get_or_insert_with(Vec::new);
    while data.len() % 4 != 0 {
        data.push(0);
    }
    let offset = data.len() as u32;
    data.extend_from_slice(bytes);
    let length = data.len() as u32;
    graph.buffers[0].byte_length = length;

    graph.buffer_views.push(BufferView {
        buffer: 0,
        byte_offset: offset,
        byte_length: bytes.len() as u32,
        byte_stride: None,
        target: None,
    });
    graph.accessors.push(Accessor {
        buffer_view: graph.buffer_views.len() as u32 - 1,
        byte_offset: 0,
        component_type,
        count,
        accessor_type,
        normalized: false,
        min: None,
        max: None,
    });
    graph.accessors.len() as u32 - 1
}

/// Root with a textured triangle, a child, a camera, a light, one animation and one skin
fn sample_scene() -> SceneGraph {
    let mut graph = SceneGraph::new("sample");
    graph.buffers.push(Buffer::from_bytes("geometry", Vec::new()));

    let positions = push_accessor(
        &mut graph,
        &f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, -1.0]),
        ComponentType::Float,
        AccessorType::Vec3,
        3,
    );
    let indices: Vec<u8> = [0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()).collect();
    let indices = push_accessor(
        &mut graph,
        &indices,
        ComponentType::UnsignedShort,
        AccessorType::Scalar,
        3,
    );
    let times = push_accessor(
        &mut graph,
        &f32_bytes(&[0.0, 1.0]),
        ComponentType::Float,
        AccessorType::Scalar,
        2,
    );
    let offsets = push_accessor(
        &mut graph,
        &f32_bytes(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
        ComponentType::Float,
        AccessorType::Vec3,
        2,
    );

    graph.textures.push(Texture {
        id: "checker".into(),
        name: "Checker".into(),
        source: TextureSource::Uri {
            uri: "textures/checker.png".into(),
        },
        width: 64,
        height: 64,
        min_filter: MinFilter::Nearest,
        mag_filter: MagFilter::Nearest,
        wrap_s: WrapMode::ClampToEdge,
        wrap_t: WrapMode::Repeat,
    });

    let mut red = Material::new("red", "Red");
    red.base_color = [1.0, 0.0, 0.0, 1.0];
    red.base_color_texture = Some(TextureRef::new("checker"));
    graph.materials.push(red);
    graph.materials.push(Material::new("blue", "Blue"));

    graph.meshes.push(Mesh {
        id: "tri".into(),
        name: "Triangle".into(),
        primitives: vec![Primitive {
            attributes: BTreeMap::from([("POSITION".to_string(), positions)]),
            indices: Some(indices),
            material_id: Some("red".into()),
            mode: PrimitiveMode::Triangles,
        }],
        bounds: Bounds::default(),
    });

    let root = graph.set_root(SceneNode::new("root", "Root"));
    let cube = graph
        .add_child(
            root,
            SceneNode::new("cube", "Cube")
                .with_transform(Transform::from_position([3.0, 4.0, 5.0]))
                .with_component(Component::Mesh {
                    mesh_id: "tri".into(),
                    material_id: None,
                }),
        )
        .unwrap();
    graph
        .add_child(
            cube,
            SceneNode::new("cube_child", "Cube Child").with_transform(Transform::from_euler_degrees(
                [0.0, 1.0, 0.0],
                [0.0, 45.0, 0.0],
                [0.5, 0.5, 0.5],
            )),
        )
        .unwrap();
    graph
        .add_child(
            root,
            SceneNode::new("camera", "Camera")
                .with_component(Component::Camera(CameraComponent::perspective(60.0))),
        )
        .unwrap();
    graph
        .add_child(
            root,
            SceneNode::new("sun", "Sun").with_component(Component::Light(LightComponent {
                kind: LightKind::Directional,
                ..Default::default()
            })),
        )
        .unwrap();

    graph.animations.push(Animation {
        id: "bob".into(),
        name: "Bob".into(),
        duration: 1.0,
        channels: vec![AnimationChannel {
            target_node: "cube".into(),
            path: AnimationPath::Translation,
            sampler: 0,
        }],
        samplers: vec![AnimationSampler {
            input: times,
            output: offsets,
            interpolation: Interpolation::Linear,
        }],
    });

    graph.skins.push(Skin {
        id: "rig".into(),
        name: "Rig".into(),
        joints: vec![SkinJoint {
            node_id: "cube".into(),
            inverse_bind_matrix: Transform::IDENTITY.to_matrix(),
        }],
        skeleton: Some("root".into()),
    });

    graph
}

fn node_named<'a>(document: &'a json::Root, name: &str) -> &'a json::Node {
    document
        .nodes
        .iter()
        .find(|n| n.name.as_deref() == Some(name))
        .unwrap()
}

#[test]
fn test_export_counts_and_glb() {
    let export = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();

    assert_eq!(export.stats.node_count, 5);
    assert_eq!(export.stats.mesh_count, 1);
    assert_eq!(export.stats.material_count, 2);
    assert_eq!(export.stats.texture_count, 1);
    assert_eq!(export.stats.animation_count, 1);
    assert_eq!(export.stats.vertex_count, 3);
    assert_eq!(export.stats.triangle_count, 1);
    assert_eq!(export.document.skins.len(), 1);
    assert_eq!(export.document.cameras.len(), 1);

    let glb = export.glb.as_ref().unwrap();
    assert_eq!(&glb[0..4], b"glTF");
    assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
    assert_eq!(export.stats.glb_bytes, glb.len());
    assert_eq!(export.output_bytes(), glb.as_slice());

    let parsed = parse_glb(glb).unwrap();
    assert_eq!(parsed.document.nodes.len(), 5);
    assert!(parsed.bin.is_some());
}

#[test]
fn test_glb_reopens_with_gltf_crate() {
    let export = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();
    let gltf = gltf::Gltf::from_slice(export.glb.as_ref().unwrap()).unwrap();

    assert_eq!(gltf.meshes().count(), 1);
    assert_eq!(gltf.animations().count(), 1);
    assert!(gltf.blob.is_some());
    let scene = gltf.default_scene().unwrap();
    assert_eq!(scene.nodes().next().unwrap().name(), Some("Root"));
}

#[test]
fn test_post_order_and_hierarchy() {
    let export = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();
    let document = &export.document;

    // Root is exported last and is the only scene node
    assert_eq!(document.nodes.last().unwrap().name.as_deref(), Some("Root"));
    assert_eq!(document.scenes.len(), 1);
    assert_eq!(document.scenes[0].nodes[0].value(), document.nodes.len() - 1);

    let cube = node_named(document, "Cube");
    let children = cube.children.as_ref().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(
        document.nodes[children[0].value()].name.as_deref(),
        Some("Cube Child")
    );
}

#[test]
fn test_identity_components_are_omitted() {
    let export = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();
    let document = &export.document;

    let cube = node_named(document, "Cube");
    assert_eq!(cube.translation, Some([3.0, 4.0, 5.0]));
    assert!(cube.rotation.is_none());
    assert!(cube.scale.is_none());

    let child = node_named(document, "Cube Child");
    assert!(child.rotation.is_some());
    assert_eq!(child.scale, Some([0.5, 0.5, 0.5]));

    let root = node_named(document, "Root");
    assert!(root.translation.is_none() && root.rotation.is_none() && root.scale.is_none());
}

#[test]
fn test_camera_fov_in_radians() {
    let export = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();
    let camera = &export.document.cameras[0];
    let perspective = camera.perspective.as_ref().unwrap();
    assert!((perspective.yfov - 60f32.to_radians()).abs() < 1e-6);
    assert_eq!(perspective.znear, 0.1);
    assert!(perspective.zfar.is_none());
    assert!(node_named(&export.document, "Camera").camera.is_some());
}

#[test]
fn test_light_produces_warning() {
    let export = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();
    assert!(
        export
            .warnings
            .iter()
            .any(|w| w.path == "nodes[sun]" && w.message.contains("light"))
    );
    // The light's node is still part of the hierarchy
    node_named(&export.document, "Sun");
}

#[test]
fn test_missing_position_bounds_are_computed() {
    let export = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();
    let position = &export.document.accessors[0];
    assert_eq!(position.min, Some(serde_json::json!([0.0, 0.0, -1.0])));
    assert_eq!(position.max, Some(serde_json::json!([1.0, 2.0, 0.0])));
}

#[test]
fn test_shared_accessors_are_copied_once() {
    let mut graph = sample_scene();
    let mut second = graph.meshes[0].clone();
    second.id = "tri2".into();
    graph.meshes.push(second);

    let once = export_gltf(&sample_scene(), &GltfExportOptions::default()).unwrap();
    let twice = export_gltf(&graph, &GltfExportOptions::default()).unwrap();

    assert_eq!(twice.document.meshes.len(), 2);
    assert_eq!(twice.document.accessors.len(), once.document.accessors.len());
    assert_eq!(twice.buffer.len(), once.buffer.len());
}

#[test]
fn test_material_override_creates_mesh_variant() {
    let mut graph = sample_scene();
    let cube = graph.find_node("cube").unwrap();
    graph.node_mut(cube).unwrap().components = vec![Component::Mesh {
        mesh_id: "tri".into(),
        material_id: Some("blue".into()),
    }];

    let export = export_gltf(&graph, &GltfExportOptions::default()).unwrap();
    assert_eq!(export.document.meshes.len(), 2);
    let cube = node_named(&export.document, "Cube");
    let variant = &export.document.meshes[cube.mesh.unwrap().value()];
    assert_eq!(variant.primitives[0].material.map(|m| m.value()), Some(1));
}

#[test]
fn test_unresolved_references_become_warnings() {
    let mut graph = sample_scene();
    graph.materials[0].normal_texture = Some(TextureRef::new("missing"));
    graph.meshes[0].primitives[0].material_id = Some("ghost".into());
    graph.animations[0].channels.push(AnimationChannel {
        target_node: "nobody".into(),
        path: AnimationPath::Scale,
        sampler: 0,
    });
    graph.skins[0].joints.push(SkinJoint {
        node_id: "nobody".into(),
        inverse_bind_matrix: Transform::IDENTITY.to_matrix(),
    });

    let export = export_gltf(&graph, &GltfExportOptions::default()).unwrap();
    let paths: Vec<&str> = export.warnings.iter().map(|w| w.path.as_str()).collect();

    assert!(paths.contains(&"materials[0].normalTexture"));
    assert!(paths.contains(&"meshes[0].primitives[0].material"));
    assert!(paths.contains(&"animations[0].channels[1]"));
    assert!(paths.contains(&"skins[0].joints[1]"));

    assert!(export.document.materials[0].normal_texture.is_none());
    assert!(export.document.materials[0]
        .pbr_metallic_roughness
        .base_color_texture
        .is_some());
    assert!(export.document.meshes[0].primitives[0].material.is_none());
    assert_eq!(export.document.animations[0].channels.len(), 1);
    assert_eq!(export.document.skins[0].joints.len(), 1);
}

#[test]
fn test_animation_without_channels_is_dropped() {
    let mut graph = sample_scene();
    graph.animations[0].channels[0].target_node = "nobody".into();

    let export = export_gltf(&graph, &GltfExportOptions::default()).unwrap();
    assert!(export.document.animations.is_empty());
    assert!(export.warnings.iter().any(|w| w.path == "animations[0]"));

    // Keyframe data of the dropped animation is not copied
    graph.animations.clear();
    let without = export_gltf(&graph, &GltfExportOptions::default()).unwrap();
    assert_eq!(export.document.accessors.len(), without.document.accessors.len());
    assert_eq!(export.buffer, without.buffer);
}

#[test]
fn test_samplers_are_deduplicated() {
    let mut graph = sample_scene();
    let mut copy = graph.textures[0].clone();
    copy.id = "checker2".into();
    graph.textures.push(copy);
    let mut linear = graph.textures[0].clone();
    linear.id = "smooth".into();
    linear.mag_filter = MagFilter::Linear;
    graph.textures.push(linear);

    let export = export_gltf(&graph, &GltfExportOptions::default()).unwrap();
    assert_eq!(export.document.textures.len(), 3);
    assert_eq!(export.document.samplers.len(), 2);
}

#[test]
fn test_buffer_view_texture_is_copied() {
    let mut graph = sample_scene();
    let png = [0x89u8, b'P', b'N', b'G', 1, 2, 3];
    let data = graph.buffers[0].data.as_mut().unwrap();
    let offset = data.len() as u32;
    data.extend_from_slice(&png);
    let length = data.len() as u32;
    graph.buffers[0].byte_length = length;
    graph.buffer_views.push(BufferView {
        buffer: 0,
        byte_offset: offset,
        byte_length: png.len() as u32,
        byte_stride: None,
        target: None,
    });
    graph.textures[0].source = TextureSource::BufferView {
        buffer_view: graph.buffer_views.len() as u32 - 1,
        mime_type: "image/png".into(),
    };

    let export = export_gltf(&graph, &GltfExportOptions::default()).unwrap();
    let image = &export.document.images[0];
    assert!(image.uri.is_none());
    assert_eq!(image.mime_type.as_ref().map(|m| m.0.as_str()), Some("image/png"));

    let view = &export.document.buffer_views[image.buffer_view.unwrap().value()];
    let start = view.byte_offset.map_or(0, |o| o.0 as usize);
    assert_eq!(&export.buffer[start..start + png.len()], &png);
}

#[test]
fn test_json_mode_embeds_data_uri() {
    let options = GltfExportOptions {
        binary: false,
        pretty: true,
        ..Default::default()
    };
    let export = export_gltf(&sample_scene(), &options).unwrap();

    assert!(export.glb.is_none());
    assert_eq!(export.stats.glb_bytes, 0);
    let uri = export.document.buffers[0].uri.as_deref().unwrap();
    assert!(uri.starts_with("data:application/octet-stream;base64,"));
    assert_eq!(export.output_bytes(), export.json.as_slice());

    let gltf = gltf::Gltf::from_slice(&export.json).unwrap();
    assert_eq!(gltf.nodes().count(), 5);
}

#[test]
fn test_json_mode_external_buffer_uri() {
    let options = GltfExportOptions {
        binary: false,
        buffer_uri: Some("scene.bin".into()),
        ..Default::default()
    };
    let export = export_gltf(&sample_scene(), &options).unwrap();
    assert_eq!(export.document.buffers[0].uri.as_deref(), Some("scene.bin"));
    assert_eq!(
        export.document.buffers[0].byte_length.0 as usize,
        export.buffer.len()
    );
}

#[test]
fn test_empty_graph_exports_minimal_document() {
    let export = export_gltf(&SceneGraph::new("empty"), &GltfExportOptions::default()).unwrap();
    assert_eq!(export.stats.node_count, 0);
    assert!(export.document.scene.is_none());
    assert!(export.document.buffers.is_empty());
    assert!(export.warnings.is_empty());

    let text = String::from_utf8(export.json.clone()).unwrap();
    assert!(!text.contains("\"meshes\""));
    assert!(!text.contains("\"nodes\""));
    assert!(export.glb.unwrap().len() > 20);
}

#[test]
fn test_out_of_range_view_is_an_error() {
    let mut graph = sample_scene();
    graph.buffer_views[0].byte_length = 10_000;
    let result = export_gltf(&graph, &GltfExportOptions::default());
    assert!(matches!(result, Err(ExportError::OutOfBounds { .. })));
}

#[test]
fn test_payloadless_buffer_drops_geometry() {
    let mut graph = sample_scene();
    graph.buffers[0].data = None;

    let export = export_gltf(&graph, &GltfExportOptions::default()).unwrap();
    assert!(export.document.meshes[0].primitives[0].attributes.is_empty());
    assert!(export.document.animations.is_empty());
    assert!(export.warnings.iter().any(|w| w.message.contains("no payload")));
}

#[test]
fn test_exporter_state_resets_between_calls() {
    let mut exporter = GltfExporter::new();
    let graph = sample_scene();
    let first = exporter.export(&graph, &GltfExportOptions::default()).unwrap();
    let second = exporter.export(&graph, &GltfExportOptions::default()).unwrap();
    assert_eq!(first.json, second.json);
    assert_eq!(first.buffer, second.buffer);
}

#[test]
fn test_generator_is_written() {
    let options = GltfExportOptions {
        generator: "unit-test".into(),
        ..Default::default()
    };
    let export = export_gltf(&sample_scene(), &options).unwrap();
    assert_eq!(export.document.asset.generator.as_deref(), Some("unit-test"));
}
