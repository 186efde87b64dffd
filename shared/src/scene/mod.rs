//! Scene graph model
//!
//! Nodes live in a flat arena addressed by [`NodeId`]; each node keeps the
//! handles of its children. Resources are flat tables cross-referenced by
//! string id or integer index, so the whole graph is plain data that
//! serializers can walk without lifetimes or back-pointers.

mod components;
mod resources;

pub use components::*;
pub use resources::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::format::TEXT_SCENE_VERSION;
use crate::math::Transform;

/// Handle to a node inside a [`SceneGraph`] arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Descriptive information about a scene
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// RFC 3339 creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// RFC 3339 modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SceneMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            name: name.into(),
            created_at: Some(now.clone()),
            modified_at: Some(now),
            ..Default::default()
        }
    }

    /// Stamp `modified_at` with the current time
    pub fn touch(&mut self) {
        self.modified_at = Some(chrono::Utc::now().to_rfc3339());
    }
}

/// One entry in the hierarchy
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: String,
    pub name: String,
    /// Free-form kind tag ("object", "group", "light", ...)
    pub kind: String,
    pub transform: Transform,
    pub active: bool,
    pub layer: u32,
    pub tags: Vec<String>,
    pub children: Vec<NodeId>,
    pub components: Vec<Component>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub prefab: Option<String>,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: "object".to_string(),
            transform: Transform::IDENTITY,
            active: true,
            layer: 1,
            tags: Vec::new(),
            children: Vec::new(),
            components: Vec::new(),
            metadata: BTreeMap::new(),
            prefab: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// First mesh component, if any
    pub fn mesh_component(&self) -> Option<(&str, Option<&str>)> {
        self.components.iter().find_map(|c| match c {
            Component::Mesh {
                mesh_id,
                material_id,
            } => Some((mesh_id.as_str(), material_id.as_deref())),
            _ => None,
        })
    }

    pub fn camera_component(&self) -> Option<&CameraComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Camera(camera) => Some(camera),
            _ => None,
        })
    }
}

/// In-memory scene: a node arena plus resource tables
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph {
    pub version: String,
    pub metadata: SceneMetadata,
    pub nodes: Vec<SceneNode>,
    pub root: Option<NodeId>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub meshes: Vec<Mesh>,
    pub animations: Vec<Animation>,
    pub skins: Vec<Skin>,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub accessors: Vec<Accessor>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            version: TEXT_SCENE_VERSION.to_string(),
            metadata: SceneMetadata::default(),
            nodes: Vec::new(),
            root: None,
            materials: Vec::new(),
            textures: Vec::new(),
            meshes: Vec::new(),
            animations: Vec::new(),
            skins: Vec::new(),
            buffers: Vec::new(),
            buffer_views: Vec::new(),
            accessors: Vec::new(),
        }
    }
}

impl SceneGraph {
    /// Empty graph with fresh metadata and no root
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: SceneMetadata::new(name),
            ..Default::default()
        }
    }

    /// Add a detached node to the arena
    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add a node and attach it under `parent`
    ///
    /// Returns `None` (and adds nothing) when `parent` is not in the arena.
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Option<NodeId> {
        if parent.index() >= self.nodes.len() {
            return None;
        }
        let id = self.add_node(node);
        self.nodes[parent.index()].children.push(id);
        Some(id)
    }

    /// Add a node and make it the root
    pub fn set_root(&mut self, node: SceneNode) -> NodeId {
        let id = self.add_node(node);
        self.root = Some(id);
        id
    }

    pub fn root_node(&self) -> Option<&SceneNode> {
        self.root.and_then(|id| self.node(id))
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    /// Look up a node handle by its string id
    pub fn find_node(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .map(|i| NodeId(i as u32))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes reachable from the root in pre-order, paired with their parent
    ///
    /// Each handle is visited at most once, so a malformed arena that
    /// shares or cycles children cannot loop forever.
    pub fn traverse_pre_order(&self) -> Vec<(NodeId, Option<NodeId>)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return order;
        };
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![(root, None)];

        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if std::mem::replace(&mut visited[id.index()], true) {
                continue;
            }
            order.push((id, parent));
            // Reverse so the first child is popped first
            for &child in node.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }
        order
    }

    /// Parent handle of every arena slot (`None` for the root and detached nodes)
    pub fn parents(&self) -> Vec<Option<NodeId>> {
        let mut parents = vec![None; self.nodes.len()];
        for (id, parent) in self.traverse_pre_order() {
            parents[id.index()] = parent;
        }
        parents
    }

    /// Transform from `id`'s local space to scene space
    ///
    /// Composes full TRS matrices along the ancestor chain, so rotated and
    /// non-uniformly scaled ancestors are respected.
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let matrix = self.world_matrix(id)?;
        Some(Transform::from_matrix(&matrix))
    }

    /// Column-major world matrix of `id`
    pub fn world_matrix(&self, id: NodeId) -> Option<[f32; 16]> {
        self.node(id)?;
        let parents = self.parents();
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = parents[current.index()] {
            chain.push(parent);
            current = parent;
        }

        let mut world = glam::Mat4::IDENTITY;
        for ancestor in chain.iter().rev() {
            world *= self.nodes[ancestor.index()].transform.to_mat4();
        }
        Some(world.to_cols_array())
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn texture(&self, id: &str) -> Option<&Texture> {
        self.textures.iter().find(|t| t.id == id)
    }

    pub fn mesh(&self, id: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.id == id)
    }

    pub fn animation(&self, id: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id == id)
    }

    pub fn skin(&self, id: &str) -> Option<&Skin> {
        self.skins.iter().find(|s| s.id == id)
    }

    /// Deep-copy the subtree rooted at `node` of `source` into this arena
    ///
    /// Returns the handle of the copied subtree root (detached; the caller
    /// attaches it). Node contents are passed through `map` before insertion.
    pub fn graft_subtree(
        &mut self,
        source: &SceneGraph,
        node: NodeId,
        map: &mut impl FnMut(&mut SceneNode),
    ) -> Option<NodeId> {
        let original = source.node(node)?;
        let mut copy = original.clone();
        copy.children.clear();
        map(&mut copy);
        let new_id = self.add_node(copy);

        // Explicit stack of (source node, copied parent)
        let mut stack: Vec<(NodeId, NodeId)> = original
            .children
            .iter()
            .rev()
            .map(|&c| (c, new_id))
            .collect();
        let mut visited = vec![false; source.nodes.len()];
        visited[node.index()] = true;

        while let Some((src, parent)) = stack.pop() {
            let Some(src_node) = source.node(src) else {
                continue;
            };
            if std::mem::replace(&mut visited[src.index()], true) {
                continue;
            }
            let mut copy = src_node.clone();
            copy.children.clear();
            map(&mut copy);
            let Some(copied) = self.add_child(parent, copy) else {
                continue;
            };
            for &child in src_node.children.iter().rev() {
                stack.push((child, copied));
            }
        }
        Some(new_id)
    }
}
