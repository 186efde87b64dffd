//! Scene fixtures shared by the serializer tests

use std::collections::BTreeMap;

use scenepack_shared::*;

/// Triangle positions followed by u16 indices (padded to 4 bytes)
fn triangle_bytes() -> Vec<u8> {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let mut bytes: Vec<u8> = positions.iter().flat_map(|v| v.to_le_bytes()).collect();
    for i in [0u16, 1, 2, 0] {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes
}

/// A small scene touching every table and component kind
pub fn sample_scene() -> SceneGraph {
    let mut graph = SceneGraph::new("sample");
    graph.metadata.author = Some("tests".into());
    graph.metadata.tags = vec!["demo".into(), "fixture".into()];

    let root = graph.set_root(SceneNode::new("root", "Root").with_kind("scene"));
    let mut cube = SceneNode::new("cube", "Cube")
        .with_transform(Transform::from_position([3.0, 4.0, 5.0]))
        .with_component(Component::Mesh {
            mesh_id: "tri".into(),
            material_id: Some("red".into()),
        })
        .with_component(Component::Custom {
            kind: "spin".into(),
            data: BTreeMap::from([("speed".to_string(), serde_json::json!(2.5))]),
        });
    cube.tags = vec!["solid".into()];
    cube.metadata
        .insert("note".into(), serde_json::json!({ "a": [1, 2, 3] }));
    cube.prefab = Some("prefabs/cube".into());
    cube.layer = 3;
    let cube = graph.add_child(root, cube).expect("root exists");

    graph
        .add_child(
            cube,
            SceneNode::new("cube_child", "Cube Child").with_transform(Transform::from_euler_degrees(
                [0.0, 1.0, 0.0],
                [0.0, 45.0, 0.0],
                [0.5, 0.5, 0.5],
            )),
        )
        .expect("cube exists");

    let mut camera = SceneNode::new("camera", "Camera")
        .with_kind("camera")
        .with_component(Component::Camera(CameraComponent::perspective(60.0)));
    camera.active = false;
    graph.add_child(root, camera).expect("root exists");

    graph
        .add_child(
            root,
            SceneNode::new("sun", "Sun").with_component(Component::Light(LightComponent {
                kind: LightKind::Spot,
                range: Some(20.0),
                ..Default::default()
            })),
        )
        .expect("root exists");

    let mut red = Material::new("red", "Red");
    red.base_color = [1.0, 0.0, 0.0, 1.0];
    red.metallic = 0.25;
    red.base_color_texture = Some(TextureRef::new("checker"));
    red.alpha_mode = AlphaMode::Mask;
    red.double_sided = true;
    graph.materials.push(red);

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
        wrap_t: WrapMode::MirroredRepeat,
    });

    let data = triangle_bytes();
    graph.buffers.push(Buffer::from_bytes("geometry", data));
    graph.buffer_views.push(BufferView {
        buffer: 0,
        byte_offset: 0,
        byte_length: 36,
        byte_stride: None,
        target: Some(BufferTarget::ArrayBuffer),
    });
    graph.buffer_views.push(BufferView {
        buffer: 0,
        byte_offset: 36,
        byte_length: 6,
        byte_stride: None,
        target: Some(BufferTarget::ElementArrayBuffer),
    });
    graph.accessors.push(Accessor {
        buffer_view: 0,
        byte_offset: 0,
        component_type: ComponentType::Float,
        count: 3,
        accessor_type: AccessorType::Vec3,
        normalized: false,
        min: Some(vec![0.0, 0.0, 0.0]),
        max: Some(vec![1.0, 1.0, 0.0]),
    });
    graph.accessors.push(Accessor {
        buffer_view: 1,
        byte_offset: 0,
        component_type: ComponentType::UnsignedShort,
        count: 3,
        accessor_type: AccessorType::Scalar,
        normalized: false,
        min: None,
        max: None,
    });

    graph.meshes.push(Mesh {
        id: "tri".into(),
        name: "Triangle".into(),
        primitives: vec![Primitive {
            attributes: BTreeMap::from([("POSITION".to_string(), 0)]),
            indices: Some(1),
            material_id: Some("red".into()),
            mode: PrimitiveMode::Triangles,
        }],
        bounds: Bounds {
            min: [0.0, 0.0, 0.0],
            max: [1.0, 1.0, 0.0],
        },
    });

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
            input: 1,
            output: 0,
            interpolation: Interpolation::Step,
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
