//! Deep copy and merge of scene graphs

use scenepack_shared::{Component, NodeId, SceneGraph, SceneNode, TextureSource};
use tracing::debug;

/// Independent deep copy
pub fn clone_graph(graph: &SceneGraph) -> SceneGraph {
    graph.clone()
}

/// Append `source` into `target`
///
/// The source root subtree is attached under the target root (or becomes
/// the root when the target has none). Source material, texture, mesh,
/// animation and skin ids get a `<source name>_` prefix, and every
/// reference to them is rewritten. Buffer, view and accessor indices are
/// shifted past the target's existing tables. Node ids are kept as-is.
///
/// Returns the handle of the grafted subtree root, if the source had one.
pub fn merge(target: &mut SceneGraph, source: &SceneGraph) -> Option<NodeId> {
    let prefix = format!("{}_", source.metadata.name);
    let renamed = |id: &str| format!("{prefix}{id}");

    let buffer_offset = target.buffers.len() as u32;
    let view_offset = target.buffer_views.len() as u32;
    let accessor_offset = target.accessors.len() as u32;

    target.buffers.extend(source.buffers.iter().cloned());
    target
        .buffer_views
        .extend(source.buffer_views.iter().cloned().map(|mut view| {
            view.buffer += buffer_offset;
            view
        }));
    target
        .accessors
        .extend(source.accessors.iter().cloned().map(|mut accessor| {
            accessor.buffer_view += view_offset;
            accessor
        }));

    for texture in &source.textures {
        let mut texture = texture.clone();
        texture.id = renamed(&texture.id);
        if let TextureSource::BufferView { buffer_view, .. } = &mut texture.source {
            *buffer_view += view_offset;
        }
        target.textures.push(texture);
    }

    for material in &source.materials {
        let mut material = material.clone();
        material.id = renamed(&material.id);
        for slot in material.texture_slots_mut() {
            slot.texture_id = renamed(&slot.texture_id);
        }
        target.materials.push(material);
    }

    for mesh in &source.meshes {
        let mut mesh = mesh.clone();
        mesh.id = renamed(&mesh.id);
        for prim in &mut mesh.primitives {
            for accessor in prim.attributes.values_mut() {
                *accessor += accessor_offset;
            }
            if let Some(indices) = &mut prim.indices {
                *indices += accessor_offset;
            }
            if let Some(material) = &mut prim.material_id {
                *material = renamed(material);
            }
        }
        target.meshes.push(mesh);
    }

    for animation in &source.animations {
        let mut animation = animation.clone();
        animation.id = renamed(&animation.id);
        for sampler in &mut animation.samplers {
            sampler.input += accessor_offset;
            sampler.output += accessor_offset;
        }
        target.animations.push(animation);
    }

    for skin in &source.skins {
        let mut skin = skin.clone();
        skin.id = renamed(&skin.id);
        target.skins.push(skin);
    }

    let grafted = source.root.and_then(|root| {
        target.graft_subtree(source, root, &mut |node: &mut SceneNode| {
            for component in &mut node.components {
                if let Component::Mesh {
                    mesh_id,
                    material_id,
                } = component
                {
                    *mesh_id = renamed(mesh_id);
                    if let Some(material) = material_id {
                        *material = renamed(material);
                    }
                }
            }
        })
    });

    if let Some(grafted) = grafted {
        match target.root {
            Some(root) => {
                if let Some(root) = target.node_mut(root) {
                    root.children.push(grafted);
                }
            }
            None => target.root = Some(grafted),
        }
    }

    target.metadata.touch();
    debug!(
        "Merged '{}' into '{}' with prefix '{}'",
        source.metadata.name, target.metadata.name, prefix
    );
    grafted
}
