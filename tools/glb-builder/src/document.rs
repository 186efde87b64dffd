//! GLTF document construction and referential validation

use gltf_json as json;

/// Empty document with the asset block filled in
pub fn new_document(generator: &str) -> json::Root {
    json::Root {
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some(generator.to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        ..Default::default()
    }
}

/// Node with only a name; every other field absent
pub fn node(name: &str) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}

/// Drop entries that would make an otherwise empty document invalid
///
/// Empty top-level arrays are already skipped by the serializer.
pub fn cleanup(root: &mut json::Root) {
    if root.buffer_views.is_empty() {
        root.buffers.retain(|b| b.byte_length.0 > 0);
    }
    if root.scenes.is_empty() {
        root.scene = None;
    }
}

/// Check every cross-reference in the document
///
/// Returns one human-readable message per dangling index; an empty list
/// means the document is referentially sound.
pub fn validate_document(root: &json::Root) -> Vec<String> {
    let mut errors = Vec::new();
    let mut check = |path: String, index: usize, len: usize, what: &str| {
        if index >= len {
            errors.push(format!(
                "{path}: {what} index {index} out of range ({len} {what}s)"
            ));
        }
    };

    if let Some(scene) = root.scene {
        check("scene".into(), scene.value(), root.scenes.len(), "scene");
    }

    for (i, scene) in root.scenes.iter().enumerate() {
        for (j, node) in scene.nodes.iter().enumerate() {
            check(format!("scenes[{i}].nodes[{j}]"), node.value(), root.nodes.len(), "node");
        }
    }

    for (i, node) in root.nodes.iter().enumerate() {
        if let Some(mesh) = node.mesh {
            check(format!("nodes[{i}].mesh"), mesh.value(), root.meshes.len(), "mesh");
        }
        if let Some(camera) = node.camera {
            check(format!("nodes[{i}].camera"), camera.value(), root.cameras.len(), "camera");
        }
        if let Some(skin) = node.skin {
            check(format!("nodes[{i}].skin"), skin.value(), root.skins.len(), "skin");
        }
        for (j, child) in node.children.iter().flatten().enumerate() {
            check(format!("nodes[{i}].children[{j}]"), child.value(), root.nodes.len(), "node");
        }
    }

    for (i, mesh) in root.meshes.iter().enumerate() {
        for (j, prim) in mesh.primitives.iter().enumerate() {
            let path = format!("meshes[{i}].primitives[{j}]");
            if let Some(material) = prim.material {
                check(format!("{path}.material"), material.value(), root.materials.len(), "material");
            }
            for accessor in prim.attributes.values() {
                check(format!("{path}.attributes"), accessor.value(), root.accessors.len(), "accessor");
            }
            if let Some(indices) = prim.indices {
                check(format!("{path}.indices"), indices.value(), root.accessors.len(), "accessor");
            }
        }
    }

    for (i, material) in root.materials.iter().enumerate() {
        let pbr = &material.pbr_metallic_roughness;
        let textures = [
            ("baseColorTexture", pbr.base_color_texture.as_ref().map(|t| t.index)),
            (
                "metallicRoughnessTexture",
                pbr.metallic_roughness_texture.as_ref().map(|t| t.index),
            ),
            ("normalTexture", material.normal_texture.as_ref().map(|t| t.index)),
            ("occlusionTexture", material.occlusion_texture.as_ref().map(|t| t.index)),
            ("emissiveTexture", material.emissive_texture.as_ref().map(|t| t.index)),
        ];
        for (slot, index) in textures {
            if let Some(index) = index {
                check(format!("materials[{i}].{slot}"), index.value(), root.textures.len(), "texture");
            }
        }
    }

    for (i, texture) in root.textures.iter().enumerate() {
        check(format!("textures[{i}].source"), texture.source.value(), root.images.len(), "image");
        if let Some(sampler) = texture.sampler {
            check(format!("textures[{i}].sampler"), sampler.value(), root.samplers.len(), "sampler");
        }
    }

    for (i, image) in root.images.iter().enumerate() {
        if let Some(view) = image.buffer_view {
            check(format!("images[{i}].bufferView"), view.value(), root.buffer_views.len(), "bufferView");
        }
    }

    for (i, view) in root.buffer_views.iter().enumerate() {
        check(format!("bufferViews[{i}].buffer"), view.buffer.value(), root.buffers.len(), "buffer");
    }

    for (i, accessor) in root.accessors.iter().enumerate() {
        if let Some(view) = accessor.buffer_view {
            check(format!("accessors[{i}].bufferView"), view.value(), root.buffer_views.len(), "bufferView");
        }
    }

    for (i, skin) in root.skins.iter().enumerate() {
        for (j, joint) in skin.joints.iter().enumerate() {
            check(format!("skins[{i}].joints[{j}]"), joint.value(), root.nodes.len(), "node");
        }
        if let Some(skeleton) = skin.skeleton {
            check(format!("skins[{i}].skeleton"), skeleton.value(), root.nodes.len(), "node");
        }
        if let Some(ibm) = skin.inverse_bind_matrices {
            check(format!("skins[{i}].inverseBindMatrices"), ibm.value(), root.accessors.len(), "accessor");
        }
    }

    for (i, animation) in root.animations.iter().enumerate() {
        for (j, channel) in animation.channels.iter().enumerate() {
            let path = format!("animations[{i}].channels[{j}]");
            check(format!("{path}.sampler"), channel.sampler.value(), animation.samplers.len(), "sampler");
            check(format!("{path}.target.node"), channel.target.node.value(), root.nodes.len(), "node");
        }
        for (j, sampler) in animation.samplers.iter().enumerate() {
            let path = format!("animations[{i}].samplers[{j}]");
            check(format!("{path}.input"), sampler.input.value(), root.accessors.len(), "accessor");
            check(format!("{path}.output"), sampler.output.value(), root.accessors.len(), "accessor");
        }
    }

    errors
}
