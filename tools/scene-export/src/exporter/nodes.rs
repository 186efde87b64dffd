//! Node hierarchy, animation and skin stages

use glb_builder::{Valid, json, node};
use hashbrown::HashMap;
use scenepack_shared::{Component, NodeId, SceneGraph, SceneNode};
use tracing::debug;

use super::GltfExporter;
use super::convert;
use crate::error::ExportError;

impl GltfExporter {
    /// Export the hierarchy under the root in post-order
    ///
    /// Children always get lower indices than their parent. A node reachable
    /// through several parents is exported once, under the first parent the
    /// pre-order walk reaches it from.
    pub(super) fn export_nodes(&mut self, graph: &SceneGraph) {
        let Some(root) = graph.root else {
            return;
        };

        let order = graph.traverse_pre_order();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for &(id, parent) in &order {
            if let Some(parent) = parent {
                children.entry(parent).or_default().push(id);
            }
        }

        let mut exported: HashMap<NodeId, u32> = HashMap::with_capacity(order.len());
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if !expanded {
                stack.push((id, true));
                if let Some(kids) = children.get(&id) {
                    stack.extend(kids.iter().rev().map(|&kid| (kid, false)));
                }
                continue;
            }

            let Some(scene_node) = graph.node(id) else {
                continue;
            };
            let child_indices: Vec<u32> = children
                .get(&id)
                .map(|kids| kids.iter().filter_map(|k| exported.get(k).copied()).collect())
                .unwrap_or_default();
            let index = self.export_node(scene_node, child_indices);
            exported.insert(id, index);
        }

        let Some(&root_index) = exported.get(&root) else {
            return;
        };
        let name = &graph.metadata.name;
        self.root.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: (!name.is_empty()).then(|| name.clone()),
            nodes: vec![json::Index::new(root_index)],
        });
        self.root.scene = Some(json::Index::new(0));
    }

    fn export_node(&mut self, scene_node: &SceneNode, mut children: Vec<u32>) -> u32 {
        let path = format!("nodes[{}]", scene_node.id);
        let name = if scene_node.name.is_empty() {
            scene_node.id.as_str()
        } else {
            scene_node.name.as_str()
        };

        let mut gltf_node = node(name);
        convert::apply_transform(&mut gltf_node, &scene_node.transform);

        for (k, component) in scene_node.components.iter().enumerate() {
            match component {
                Component::Mesh {
                    mesh_id,
                    material_id,
                } => {
                    let Some(mesh) = self.mesh_index(mesh_id, material_id.as_deref(), &path) else {
                        continue;
                    };
                    if gltf_node.mesh.is_none() {
                        gltf_node.mesh = Some(json::Index::new(mesh));
                    } else {
                        // A glTF node holds one mesh; the rest go on child nodes
                        let mut extra = node(&format!("{}_mesh{}", name, k));
                        extra.mesh = Some(json::Index::new(mesh));
                        children.push(self.root.nodes.len() as u32);
                        self.root.nodes.push(extra);
                    }
                }
                Component::Camera(camera) => {
                    if gltf_node.camera.is_some() {
                        self.warnings
                            .push(&path, "node has several cameras; only the first is exported");
                        continue;
                    }
                    let index = self.root.cameras.len() as u32;
                    self.root.cameras.push(convert::camera(name, camera));
                    gltf_node.camera = Some(json::Index::new(index));
                }
                Component::Light(light) => {
                    self.warnings.push(
                        &path,
                        format!(
                            "{:?} light dropped; punctual light extensions are not emitted",
                            light.kind
                        ),
                    );
                }
                Component::Custom { kind, .. } => {
                    debug!("{}: custom component '{}' has no glTF equivalent", path, kind);
                }
            }
        }

        if !children.is_empty() {
            gltf_node.children = Some(children.into_iter().map(json::Index::new).collect());
        }

        let index = self.root.nodes.len() as u32;
        self.root.nodes.push(gltf_node);
        if self.node_ids.contains_key(&scene_node.id) {
            self.warnings.push(
                &path,
                "duplicate node id; animations and skins resolve to the first one",
            );
        } else {
            self.node_ids.insert(scene_node.id.clone(), index);
        }
        index
    }

    /// Channels are resolved before any keyframe data is copied, so dropped
    /// channels and animations leave nothing behind in the output buffer.
    pub(super) fn export_animations(&mut self, graph: &SceneGraph) -> Result<(), ExportError> {
        for (i, animation) in graph.animations.iter().enumerate() {
            let path = format!("animations[{}]", i);

            let mut targets = Vec::with_capacity(animation.channels.len());
            for (c, channel) in animation.channels.iter().enumerate() {
                let channel_path = format!("{}.channels[{}]", path, c);
                let Some(&target) = self.node_ids.get(&channel.target_node) else {
                    self.warnings.push(
                        channel_path,
                        format!("target node '{}' not found, channel dropped", channel.target_node),
                    );
                    continue;
                };
                if animation.samplers.get(channel.sampler as usize).is_none() {
                    self.warnings.push(
                        channel_path,
                        format!("sampler {} not found, channel dropped", channel.sampler),
                    );
                    continue;
                }
                targets.push((channel_path, channel, target));
            }

            // Source sampler index -> exported sampler index, filled on first use
            let mut sampler_map: Vec<Option<Option<u32>>> = vec![None; animation.samplers.len()];
            let mut samplers = Vec::new();
            let mut channels = Vec::new();
            for (channel_path, channel, target) in targets {
                let source = channel.sampler as usize;
                let exported = match sampler_map[source] {
                    Some(exported) => exported,
                    None => {
                        let sampler = &animation.samplers[source];
                        let sampler_path = format!("{}.samplers[{}]", path, source);
                        let input = self.export_accessor(graph, sampler.input, &sampler_path)?;
                        let output = self.export_accessor(graph, sampler.output, &sampler_path)?;
                        let exported = match (input, output) {
                            (Some(input), Some(output)) => {
                                samplers.push(json::animation::Sampler {
                                    input: input.as_json_index(),
                                    interpolation: Valid(convert::interpolation(sampler.interpolation)),
                                    output: output.as_json_index(),
                                    extensions: Default::default(),
                                    extras: Default::default(),
                                });
                                Some(samplers.len() as u32 - 1)
                            }
                            _ => {
                                self.warnings
                                    .push(sampler_path, "sampler dropped, keyframe data unavailable");
                                None
                            }
                        };
                        sampler_map[source] = Some(exported);
                        exported
                    }
                };
                let Some(sampler) = exported else {
                    self.warnings.push(
                        channel_path,
                        format!("sampler {} unavailable, channel dropped", channel.sampler),
                    );
                    continue;
                };
                channels.push(json::animation::Channel {
                    sampler: json::Index::new(sampler),
                    target: json::animation::Target {
                        node: json::Index::new(target),
                        path: Valid(convert::animation_path(channel.path)),
                        extensions: Default::default(),
                        extras: Default::default(),
                    },
                    extensions: Default::default(),
                    extras: Default::default(),
                });
            }

            if channels.is_empty() {
                self.warnings
                    .push(&path, format!("animation '{}' has no exportable channels", animation.name));
                continue;
            }

            self.root.animations.push(json::Animation {
                name: Some(animation.name.clone()),
                channels,
                samplers,
                extensions: Default::default(),
                extras: Default::default(),
            });
        }
        Ok(())
    }

    pub(super) fn export_skins(&mut self, graph: &SceneGraph) {
        for (i, skin) in graph.skins.iter().enumerate() {
            let path = format!("skins[{}]", i);

            let mut joints = Vec::with_capacity(skin.joints.len());
            let mut matrices = Vec::with_capacity(skin.joints.len());
            for (j, joint) in skin.joints.iter().enumerate() {
                match self.node_ids.get(&joint.node_id) {
                    Some(&index) => {
                        joints.push(json::Index::new(index));
                        matrices.push(joint.inverse_bind_matrix);
                    }
                    None => self.warnings.push(
                        format!("{}.joints[{}]", path, j),
                        format!("joint node '{}' not found, dropped", joint.node_id),
                    ),
                }
            }
            if joints.is_empty() {
                self.warnings
                    .push(&path, format!("skin '{}' has no resolvable joints", skin.name));
                continue;
            }

            let skeleton = match skin.skeleton.as_deref() {
                Some(id) => match self.node_ids.get(id) {
                    Some(&index) => Some(json::Index::new(index)),
                    None => {
                        self.warnings.push(
                            format!("{}.skeleton", path),
                            format!("skeleton node '{}' not found", id),
                        );
                        None
                    }
                },
                None => None,
            };

            let inverse_bind_matrices = self.buffer.pack_mat4(&matrices);
            self.root.skins.push(json::Skin {
                extensions: Default::default(),
                extras: Default::default(),
                inverse_bind_matrices: Some(inverse_bind_matrices.as_json_index()),
                joints,
                name: Some(skin.name.clone()),
                skeleton,
            });
        }
    }
}
