use glb_builder::Valid;
use scenepack_shared::*;

use super::*;

fn crate_box(name: &str) -> CompositionObject {
    CompositionObject::new(name)
        .with_property("geometry", "box")
        .with_property("color", "#ff0000")
}

fn compile(composition: &Composition) -> GltfExport {
    compile_composition(composition, &DirectCompileOptions::default()).unwrap()
}

fn node_named<'a>(export: &'a GltfExport, name: &str) -> &'a json::Node {
    export
        .document
        .nodes
        .iter()
        .find(|n| n.name.as_deref() == Some(name))
        .unwrap()
}

fn position_max(export: &GltfExport, name: &str) -> serde_json::Value {
    let mesh = node_named(export, name).mesh.unwrap().value();
    let position = export.document.meshes[mesh].primitives[0]
        .attributes
        .get(&Valid(json::mesh::Semantic::Positions))
        .unwrap();
    export.document.accessors[position.value()].max.clone().unwrap()
}

fn keyframe(time: f32, value: &[f32]) -> Keyframe {
    Keyframe {
        time,
        value: value.to_vec(),
    }
}

#[test]
fn test_empty_composition() {
    let export = compile(&Composition::new("empty"));
    assert_eq!(export.stats.node_count, 0);
    assert_eq!(export.stats.mesh_count, 0);
    assert!(export.document.scene.is_none());
    let glb = export.glb.unwrap();
    assert_eq!(&glb[0..4], b"glTF");
    assert!(glb.len() > 20);
}

#[test]
fn test_single_red_box() {
    let mut composition = Composition::new("one");
    composition.objects.push(crate_box("crate"));
    let export = compile(&composition);

    assert_eq!(export.stats.node_count, 1);
    assert_eq!(export.stats.mesh_count, 1);
    assert_eq!(export.stats.material_count, 1);
    assert_eq!(export.stats.vertex_count, 24);
    assert_eq!(export.stats.triangle_count, 12);

    let material = &export.document.materials[0];
    assert_eq!(
        material.pbr_metallic_roughness.base_color_factor.0,
        [1.0, 0.0, 0.0, 1.0]
    );
    assert!(export.warnings.is_empty());
}

#[test]
fn test_identical_objects_share_mesh_and_material() {
    let mut composition = Composition::new("pair");
    composition.objects.push(crate_box("a").with_property("position", [-2.0, 0.0, 0.0]));
    composition.objects.push(crate_box("b").with_property("position", [2.0, 0.0, 0.0]));
    let export = compile(&composition);

    assert_eq!(export.stats.node_count, 2);
    assert_eq!(export.stats.mesh_count, 1);
    assert_eq!(export.stats.material_count, 1);
    assert_eq!(node_named(&export, "a").mesh, node_named(&export, "b").mesh);
}

#[test]
fn test_scale_is_baked_per_mesh() {
    let mut composition = Composition::new("scaled");
    composition.objects.push(crate_box("small"));
    composition
        .objects
        .push(crate_box("tall").with_property("scale", [1.0, 3.0, 1.0]));
    let export = compile(&composition);

    assert_eq!(export.stats.mesh_count, 2);
    assert_eq!(export.stats.material_count, 1);
    assert!(node_named(&export, "tall").scale.is_none());
    assert_eq!(position_max(&export, "tall")[1], serde_json::json!(1.5));
}

#[test]
fn test_parent_scale_is_inherited_by_children() {
    let mut composition = Composition::new("nested-scale");
    let mut parent = crate_box("parent").with_property("scale", [2.0, 2.0, 2.0]);
    parent
        .children
        .push(crate_box("child").with_property("position", [1.0, 0.0, 0.0]));
    composition.objects.push(parent);
    let export = compile(&composition);

    // The parent's mesh stays unit size and its node carries the scale
    let parent = node_named(&export, "parent");
    assert_eq!(parent.scale, Some([2.0, 2.0, 2.0]));
    assert_eq!(position_max(&export, "parent"), serde_json::json!([0.5, 0.5, 0.5]));

    let child_index = parent.children.as_ref().unwrap()[0].value();
    let child = &export.document.nodes[child_index];
    assert_eq!(child.name.as_deref(), Some("child"));
    assert_eq!(child.translation, Some([1.0, 0.0, 0.0]));
    // World x of the child: parent scale 2 * local x 1
    let world_x = parent.scale.unwrap()[0] * child.translation.unwrap()[0];
    assert_eq!(world_x, 2.0);
}

#[test]
fn test_scale_track_target_keeps_node_scale() {
    let mut composition = Composition::new("pulse");
    composition
        .objects
        .push(crate_box("heart").with_property("scale", [2.0, 2.0, 2.0]));
    composition.timelines.push(Timeline {
        name: "beat".into(),
        duration: 1.0,
        tracks: vec![TimelineTrack {
            target: "heart".into(),
            property: "scale".into(),
            interpolation: None,
            keyframes: vec![keyframe(0.0, &[2.0, 2.0, 2.0]), keyframe(1.0, &[1.0])],
        }],
        ..Default::default()
    });
    let export = compile(&composition);

    // Animated scale replaces the node scale, so nothing may be baked
    assert_eq!(node_named(&export, "heart").scale, Some([2.0, 2.0, 2.0]));
    assert_eq!(position_max(&export, "heart"), serde_json::json!([0.5, 0.5, 0.5]));
    assert_eq!(export.stats.animation_count, 1);
}

#[test]
fn test_different_colors_split_materials() {
    let mut composition = Composition::new("colors");
    composition.objects.push(crate_box("red"));
    composition
        .objects
        .push(crate_box("blue").with_property("color", "#0000ff"));
    let export = compile(&composition);
    assert_eq!(export.stats.material_count, 2);
    assert_eq!(export.stats.mesh_count, 2);
}

#[test]
fn test_object_transform() {
    let mut composition = Composition::new("placed");
    composition.objects.push(
        crate_box("turned")
            .with_property("position", [1.0, 2.0, 3.0])
            .with_property("rotation", [0.0, 90.0, 0.0]),
    );
    composition.objects.push(
        CompositionObject::new("anchor")
            .with_property("scale", [2.0, 2.0, 2.0])
            .with_property("rotation", PropertyValue::Array(vec![
                PropertyValue::Number(0.0),
                PropertyValue::Number(0.0),
                PropertyValue::Number(0.0),
                PropertyValue::Number(2.0),
            ])),
    );
    let export = compile(&composition);

    let turned = node_named(&export, "turned");
    assert_eq!(turned.translation, Some([1.0, 2.0, 3.0]));
    let rotation = turned.rotation.as_ref().unwrap().0;
    let expected = euler_degrees_to_quat([0.0, 90.0, 0.0]);
    for (a, b) in rotation.iter().zip(expected) {
        assert!((a - b).abs() < 1e-6);
    }

    // No geometry: scale stays on the node, quaternion is normalized to identity
    let anchor = node_named(&export, "anchor");
    assert!(anchor.mesh.is_none());
    assert_eq!(anchor.scale, Some([2.0, 2.0, 2.0]));
    assert!(anchor.rotation.is_none());
}

#[test]
fn test_unknown_geometry_warns() {
    let mut composition = Composition::new("odd");
    composition
        .objects
        .push(CompositionObject::new("blob").with_property("geometry", "torus"));
    let export = compile(&composition);

    assert_eq!(export.stats.node_count, 1);
    assert_eq!(export.stats.mesh_count, 0);
    assert_eq!(export.warnings[0].path, "objects[0].geometry");
}

#[test]
fn test_traits_feed_materials() {
    let mut composition = Composition::new("glow");
    composition
        .objects
        .push(crate_box("lamp").with_trait(TraitDecl::new("@glowing")));
    let export = compile(&composition);
    let emissive = export.document.materials[0].emissive_factor.0;
    assert!(emissive.iter().all(|c| *c > 0.0));
}

#[test]
fn test_children_and_groups() {
    let mut composition = Composition::new("nested");
    let mut parent = crate_box("parent");
    parent.children.push(crate_box("child"));
    composition.objects.push(parent);
    composition.groups.push(SpatialGroup {
        name: "shelf".into(),
        properties: Properties::from([("position".to_string(), PropertyValue::from([0.0, 1.0, 0.0]))]),
        objects: vec![crate_box("left"), crate_box("right")],
        groups: vec![],
    });
    let export = compile(&composition);

    assert_eq!(export.stats.node_count, 5);
    assert_eq!(node_named(&export, "parent").children.as_ref().unwrap().len(), 1);
    let shelf = node_named(&export, "shelf");
    assert_eq!(shelf.children.as_ref().unwrap().len(), 2);
    assert_eq!(shelf.translation, Some([0.0, 1.0, 0.0]));
    // Only top-level entries are scene roots
    assert_eq!(export.document.scenes[0].nodes.len(), 2);
}

#[test]
fn test_camera_defaults_and_orthographic() {
    let mut composition = Composition::new("view");
    composition.camera = Some(CameraDecl::default());
    let export = compile(&composition);
    let perspective = export.document.cameras[0].perspective.as_ref().unwrap();
    assert!((perspective.yfov - 60f32.to_radians()).abs() < 1e-6);
    assert_eq!(perspective.znear, DEFAULT_CAMERA_NEAR);

    composition.camera = Some(CameraDecl {
        properties: Properties::from([
            ("type".to_string(), PropertyValue::from("orthographic")),
            ("size".to_string(), PropertyValue::Number(5.0)),
        ]),
    });
    let export = compile(&composition);
    let ortho = export.document.cameras[0].orthographic.as_ref().unwrap();
    assert_eq!(ortho.xmag, 5.0);
    assert_eq!(ortho.ymag, 5.0);
}

#[test]
fn test_camera_target_points_forward() {
    let mut composition = Composition::new("aim");
    composition.camera = Some(CameraDecl {
        properties: Properties::from([
            ("position".to_string(), PropertyValue::from([0.0, 0.0, 5.0])),
            ("target".to_string(), PropertyValue::from([0.0, 0.0, 0.0])),
        ]),
    });
    let export = compile(&composition);
    // Already looking down -Z at the origin: no rotation needed
    let camera = node_named(&export, "Camera");
    assert_eq!(camera.translation, Some([0.0, 0.0, 5.0]));
    assert!(camera.rotation.is_none());
}

#[test]
fn test_lights_become_nodes_with_warning() {
    let mut composition = Composition::new("lit");
    composition.lights.push(LightDecl {
        name: "sun".into(),
        kind: "directional".into(),
        properties: Properties::new(),
    });
    let export = compile(&composition);
    assert_eq!(export.stats.node_count, 1);
    assert_eq!(export.warnings.len(), 1);
    assert_eq!(export.warnings[0].path, "lights[0]");
}

#[test]
fn test_timeline_animation() {
    let mut composition = Composition::new("moving");
    composition.objects.push(crate_box("crate"));
    composition.timelines.push(Timeline {
        name: "bounce".into(),
        duration: 2.0,
        looping: true,
        tracks: vec![
            TimelineTrack {
                target: "crate".into(),
                property: "position".into(),
                interpolation: None,
                keyframes: vec![keyframe(2.0, &[0.0, 0.0, 0.0]), keyframe(0.0, &[0.0, 1.0, 0.0])],
            },
            TimelineTrack {
                target: "crate".into(),
                property: "rotation".into(),
                interpolation: Some("step".into()),
                keyframes: vec![keyframe(0.0, &[0.0, 0.0, 0.0]), keyframe(1.0, &[0.0, 180.0, 0.0])],
            },
            TimelineTrack {
                target: "ghost".into(),
                property: "scale".into(),
                interpolation: None,
                keyframes: vec![keyframe(0.0, &[1.0])],
            },
        ],
    });
    let export = compile(&composition);

    assert_eq!(export.stats.animation_count, 1);
    let animation = &export.document.animations[0];
    assert_eq!(animation.channels.len(), 2);
    assert_eq!(animation.samplers.len(), 2);
    assert!(
        export
            .warnings
            .iter()
            .any(|w| w.path == "timelines[0].tracks[2]")
    );

    // Keys are sorted by time and the input carries bounds
    let input = &export.document.accessors[animation.samplers[0].input.value()];
    assert_eq!(input.min, Some(serde_json::json!([0.0])));
    assert_eq!(input.max, Some(serde_json::json!([2.0])));

    let rotation_output = &export.document.accessors[animation.samplers[1].output.value()];
    assert_eq!(rotation_output.type_, Valid(json::accessor::Type::Vec4));
}

#[test]
fn test_timeline_without_valid_tracks_is_dropped() {
    let mut composition = Composition::new("broken");
    composition.objects.push(crate_box("crate"));
    composition.timelines.push(Timeline {
        name: "bad".into(),
        tracks: vec![TimelineTrack {
            target: "crate".into(),
            property: "color".into(),
            interpolation: None,
            keyframes: vec![keyframe(0.0, &[1.0, 0.0, 0.0])],
        }],
        ..Default::default()
    });
    let export = compile(&composition);
    assert_eq!(export.stats.animation_count, 0);
    assert!(export.warnings.iter().any(|w| w.path == "timelines[0]"));
}

#[test]
fn test_compiled_glb_reopens() {
    let mut composition = Composition::new("full");
    composition.objects.push(crate_box("crate"));
    composition
        .objects
        .push(crate_box("ball").with_property("geometry", "sphere"));
    composition.camera = Some(CameraDecl::default());
    let export = compile(&composition);

    let gltf = gltf::Gltf::from_slice(export.glb.as_ref().unwrap()).unwrap();
    assert_eq!(gltf.meshes().count(), 2);
    assert_eq!(gltf.cameras().count(), 1);
    assert_eq!(gltf.default_scene().unwrap().nodes().count(), 3);
}
