//! Command-line round trips through the scene-export binary

use std::path::Path;
use std::process::{Command, Output};

use scene_common::{TextOptions, to_json};
use scenepack_shared::*;

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scene-export"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

/// Root with one child carrying a triangle mesh
fn write_scene(dir: &Path) {
    let mut data: Vec<u8> = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    data.extend([0u16, 1, 2, 0].iter().flat_map(|i| i.to_le_bytes()));

    let mut graph = SceneGraph::new("cli");
    graph.buffers.push(Buffer::from_bytes("geometry", data));
    graph.buffer_views.push(BufferView {
        buffer: 0,
        byte_offset: 0,
        byte_length: 36,
        byte_stride: None,
        target: Some(BufferTarget::ArrayBuffer),
    });
    graph.accessors.push(Accessor {
        buffer_view: 0,
        byte_offset: 0,
        component_type: ComponentType::Float,
        count: 3,
        accessor_type: AccessorType::Vec3,
        normalized: false,
        min: None,
        max: None,
    });
    graph.meshes.push(Mesh {
        id: "tri".into(),
        name: "Triangle".into(),
        primitives: vec![Primitive {
            attributes: [("POSITION".to_string(), 0)].into(),
            indices: None,
            material_id: None,
            mode: PrimitiveMode::Triangles,
        }],
        bounds: Bounds::default(),
    });
    let root = graph.set_root(SceneNode::new("root", "Root"));
    graph
        .add_child(
            root,
            SceneNode::new("tri", "Tri").with_component(Component::Mesh {
                mesh_id: "tri".into(),
                material_id: None,
            }),
        )
        .unwrap();

    let text = to_json(&graph, &TextOptions::default()).unwrap();
    std::fs::write(dir.join("scene.json"), text).unwrap();
}

#[test]
fn test_glb_command() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());

    let output = run(&["glb", "scene.json"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = std::fs::read(dir.path().join("scene.glb")).unwrap();
    let gltf = gltf::Gltf::from_slice(&bytes).unwrap();
    assert_eq!(gltf.nodes().count(), 2);
}

#[test]
fn test_gltf_command_writes_sibling_buffer() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());

    let output = run(&["gltf", "scene.json", "-o", "out/model.gltf"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let gltf_path = dir.path().join("out/model.gltf");
    assert!(dir.path().join("out/model.bin").is_file());
    let (document, buffers, _) = gltf::import(&gltf_path).unwrap();
    assert_eq!(document.meshes().count(), 1);
    assert_eq!(buffers.len(), 1);
    match document.buffers().next().unwrap().source() {
        gltf::buffer::Source::Uri(uri) => assert_eq!(uri, "model.bin"),
        gltf::buffer::Source::Bin => panic!("expected an external buffer"),
    }
}

#[test]
fn test_config_embeds_buffer() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());
    std::fs::write(
        dir.path().join("scene-export.toml"),
        "[gltf]\nembed_buffer = true\ngenerator = \"cli-test\"\n",
    )
    .unwrap();

    let output = run(&["gltf", "scene.json"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert!(!dir.path().join("scene.bin").exists());
    let (document, _, _) = gltf::import(dir.path().join("scene.gltf")).unwrap();
    assert_eq!(document.as_json().asset.generator.as_deref(), Some("cli-test"));
}

#[test]
fn test_binary_then_decode() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());

    let output = run(&["binary", "scene.json", "-o", "scene.scnb"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let bytes = std::fs::read(dir.path().join("scene.scnb")).unwrap();
    assert_eq!(&bytes[0..4], b"SCNB");

    let output = run(&["decode", "scene.scnb", "-o", "decoded.json"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let original =
        scene_common::from_json(&std::fs::read_to_string(dir.path().join("scene.json")).unwrap())
            .unwrap();
    let decoded =
        scene_common::from_json(&std::fs::read_to_string(dir.path().join("decoded.json")).unwrap())
            .unwrap();
    assert_eq!(decoded.nodes.len(), original.nodes.len());
    assert_eq!(decoded.buffers[0].data, original.buffers[0].data);

    // The binary scene exports directly too
    let output = run(&["glb", "scene.scnb", "-o", "from_binary.glb"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_input_format_is_detected_from_content() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());

    let output = run(&["binary", "scene.json", "-o", "scene.dat"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    std::fs::copy(dir.path().join("scene.json"), dir.path().join("scene.txt")).unwrap();

    for input in ["scene.dat", "scene.txt"] {
        let output = run(&["glb", input, "-o", "out.glb"], dir.path());
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let bytes = std::fs::read(dir.path().join("out.glb")).unwrap();
        assert_eq!(gltf::Gltf::from_slice(&bytes).unwrap().nodes().count(), 2);
    }
}

#[test]
fn test_validate_command() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());
    let output = run(&["validate", "scene.json"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let empty = to_json(&SceneGraph::new("empty"), &TextOptions::default()).unwrap();
    std::fs::write(dir.path().join("empty.json"), empty).unwrap();
    let output = run(&["validate", "empty.json"], dir.path());
    assert!(!output.status.success());
}

#[test]
fn test_compile_command() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("room.json"),
        r#"{
            "name": "room",
            "objects": [{ "name": "ball", "properties": { "geometry": "sphere" } }],
            "camera": { "properties": { "fov": 45 } }
        }"#,
    )
    .unwrap();

    let output = run(&["compile", "room.json"], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = std::fs::read(dir.path().join("room.glb")).unwrap();
    let gltf = gltf::Gltf::from_slice(&bytes).unwrap();
    assert_eq!(gltf.meshes().count(), 1);
    assert_eq!(gltf.cameras().count(), 1);
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["glb", "missing.json"], dir.path());
    assert!(!output.status.success());
}
