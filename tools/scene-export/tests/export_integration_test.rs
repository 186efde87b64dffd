//! End-to-end tests across serializers and exporters

use std::collections::BTreeMap;

use scene_common::{ChunkedOptions, TextOptions, decode_scene, encode_scene, from_json, to_json};
use scene_export::{
    DirectCompileOptions, GltfExportOptions, compile_composition, export_gltf,
};
use scenepack_shared::*;

/// Two nodes sharing one triangle mesh, plus a bobbing animation
fn triangle_scene() -> SceneGraph {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let times: [f32; 2] = [0.0, 1.0];
    let offsets: [f32; 6] = [0.0, 0.0, 0.0, 0.0, 0.5, 0.0];
    let mut data: Vec<u8> = positions.iter().flat_map(|v| v.to_le_bytes()).collect();
    for i in [0u16, 1, 2, 0] {
        data.extend_from_slice(&i.to_le_bytes());
    }
    data.extend(times.iter().flat_map(|v| v.to_le_bytes()));
    data.extend(offsets.iter().flat_map(|v| v.to_le_bytes()));

    let mut graph = SceneGraph::new("triangles");
    graph.buffers.push(Buffer::from_bytes("geometry", data));
    for (offset, length) in [(0, 36), (36, 6), (44, 8), (52, 24)] {
        graph.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: offset,
            byte_length: length,
            byte_stride: None,
            target: None,
        });
    }
    for (view, count, kind, component) in [
        (0, 3, AccessorType::Vec3, ComponentType::Float),
        (1, 3, AccessorType::Scalar, ComponentType::UnsignedShort),
        (2, 2, AccessorType::Scalar, ComponentType::Float),
        (3, 2, AccessorType::Vec3, ComponentType::Float),
    ] {
        graph.accessors.push(Accessor {
            buffer_view: view,
            byte_offset: 0,
            component_type: component,
            count,
            accessor_type: kind,
            normalized: false,
            min: None,
            max: None,
        });
    }

    let mut green = Material::new("green", "Green");
    green.base_color = [0.0, 1.0, 0.0, 1.0];
    graph.materials.push(green);
    graph.meshes.push(Mesh {
        id: "tri".into(),
        name: "Triangle".into(),
        primitives: vec![Primitive {
            attributes: BTreeMap::from([("POSITION".to_string(), 0)]),
            indices: Some(1),
            material_id: Some("green".into()),
            mode: PrimitiveMode::Triangles,
        }],
        bounds: Bounds::default(),
    });

    let root = graph.set_root(SceneNode::new("root", "Root"));
    for (id, x) in [("left", -1.0), ("right", 1.0)] {
        graph
            .add_child(
                root,
                SceneNode::new(id, id)
                    .with_transform(Transform::from_position([x, 0.0, 0.0]))
                    .with_component(Component::Mesh {
                        mesh_id: "tri".into(),
                        material_id: None,
                    }),
            )
            .unwrap();
    }

    graph.animations.push(Animation {
        id: "bob".into(),
        name: "Bob".into(),
        duration: 1.0,
        samplers: vec![AnimationSampler {
            input: 2,
            output: 3,
            interpolation: Interpolation::Linear,
        }],
        channels: vec![AnimationChannel {
            sampler: 0,
            target_node: "left".into(),
            path: AnimationPath::Translation,
        }],
    });
    graph
}

#[test]
fn test_scene_to_glb_reopens() {
    let export = export_gltf(&triangle_scene(), &GltfExportOptions::default()).unwrap();
    assert!(export.warnings.is_empty(), "{:?}", export.warnings);

    let gltf = gltf::Gltf::from_slice(export.glb.as_ref().unwrap()).unwrap();
    assert_eq!(gltf.nodes().count(), 3);
    assert_eq!(gltf.meshes().count(), 1);
    assert_eq!(gltf.animations().count(), 1);

    let scene = gltf.default_scene().unwrap();
    let roots: Vec<_> = scene.nodes().map(|n| n.name().unwrap_or("").to_string()).collect();
    assert_eq!(roots, ["Root"]);
}

#[test]
fn test_binary_round_trip_exports_identically() {
    let graph = triangle_scene();
    let bytes = encode_scene(&graph, &ChunkedOptions::default()).unwrap();
    let decoded = decode_scene(&bytes, &ChunkedOptions::default()).unwrap();

    let options = GltfExportOptions::default();
    let direct = export_gltf(&graph, &options).unwrap();
    let via_binary = export_gltf(&decoded, &options).unwrap();
    assert_eq!(direct.json, via_binary.json);
    assert_eq!(direct.buffer, via_binary.buffer);
}

#[test]
fn test_text_round_trip_exports_identically() {
    let graph = triangle_scene();
    let text = to_json(&graph, &TextOptions::default()).unwrap();
    let parsed = from_json(&text).unwrap();

    let options = GltfExportOptions::default();
    let direct = export_gltf(&graph, &options).unwrap();
    let via_text = export_gltf(&parsed, &options).unwrap();
    assert_eq!(direct.glb, via_text.glb);
}

#[test]
fn test_gltf_json_with_embedded_buffer_imports() {
    let options = GltfExportOptions {
        binary: false,
        ..Default::default()
    };
    let export = export_gltf(&triangle_scene(), &options).unwrap();
    assert!(export.glb.is_none());

    let (document, buffers, _) = gltf::import_slice(&export.json).unwrap();
    assert_eq!(buffers.len(), 1);

    let mesh = document.meshes().next().unwrap();
    let primitive = mesh.primitives().next().unwrap();
    let reader = primitive.reader(|b| Some(&buffers[b.index()]));
    let positions: Vec<[f32; 3]> = reader.read_positions().unwrap().collect();
    assert_eq!(positions, [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let indices: Vec<u32> = reader.read_indices().unwrap().into_u32().collect();
    assert_eq!(indices, [0, 1, 2]);
}

#[test]
fn test_composition_from_json_compiles() {
    let composition: Composition = serde_json::from_str(
        r##"{
            "name": "yard",
            "objects": [
                { "name": "crate", "properties": { "geometry": "box", "color": "#8b4513" } },
                { "name": "post", "properties": { "geometry": "cylinder", "position": [2, 0, 0] } }
            ],
            "camera": { "properties": { "position": [0, 2, 6], "target": [0, 0, 0] } },
            "timelines": [{
                "name": "spin",
                "duration": 2.0,
                "tracks": [{
                    "target": "crate",
                    "property": "rotation",
                    "keyframes": [
                        { "time": 0.0, "value": [0, 0, 0] },
                        { "time": 2.0, "value": [0, 180, 0] }
                    ]
                }]
            }]
        }"##,
    )
    .unwrap();

    let export = compile_composition(&composition, &DirectCompileOptions::default()).unwrap();
    assert!(export.warnings.is_empty(), "{:?}", export.warnings);
    assert_eq!(export.stats.node_count, 3);
    assert_eq!(export.stats.mesh_count, 2);
    assert_eq!(export.stats.animation_count, 1);

    let gltf = gltf::Gltf::from_slice(export.glb.as_ref().unwrap()).unwrap();
    let camera = gltf.nodes().find(|n| n.camera().is_some()).unwrap();
    let (translation, rotation, _) = camera.transform().decomposed();
    assert_eq!(translation, [0.0, 2.0, 6.0]);
    // Tilted down toward the origin
    assert!(rotation[0] < 0.0);
}
