//! Referential checks over a scene graph
//!
//! Findings are collected, never raised: callers decide whether warnings
//! are acceptable.

use hashbrown::HashSet;
use scenepack_shared::{Component, SceneGraph};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Location such as `root`, `nodes[cube]` or `materials[0].normalTexture`
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// `true` when no issue has [`Severity::Error`]
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(path.into(), message.into(), Severity::Error);
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(path.into(), message.into(), Severity::Warning);
    }

    fn push(&mut self, path: String, message: String, severity: Severity) {
        self.0.push(ValidationIssue {
            path,
            message,
            severity,
        });
    }
}

pub fn validate(graph: &SceneGraph) -> ValidationReport {
    let mut issues = Issues::default();

    if graph.version.trim().is_empty() {
        issues.error("version", "missing version");
    }
    if graph.root_node().is_none() {
        issues.error("root", "scene has no root node");
    }

    check_nodes(graph, &mut issues);
    check_materials(graph, &mut issues);
    check_meshes(graph, &mut issues);
    check_buffers(graph, &mut issues);

    let valid = issues.0.iter().all(|i| i.severity != Severity::Error);
    ValidationReport {
        valid,
        issues: issues.0,
    }
}

fn check_nodes(graph: &SceneGraph, issues: &mut Issues) {
    let mut seen = HashSet::new();
    for (id, _) in graph.traverse_pre_order() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        if !seen.insert(node.id.as_str()) {
            issues.error(format!("nodes[{}]", node.id), "duplicate node id");
        }
        for (k, component) in node.components.iter().enumerate() {
            let Component::Mesh { mesh_id, .. } = component else {
                continue;
            };
            if graph.mesh(mesh_id).is_none() {
                issues.warning(
                    format!("nodes[{}].components[{k}]", node.id),
                    format!("unknown mesh '{mesh_id}'"),
                );
            }
        }
    }
}

fn check_materials(graph: &SceneGraph, issues: &mut Issues) {
    let mut seen = HashSet::new();
    for (i, material) in graph.materials.iter().enumerate() {
        if !seen.insert(material.id.as_str()) {
            issues.error(
                format!("materials[{i}]"),
                format!("duplicate material id '{}'", material.id),
            );
        }
        for (slot, tex) in material.texture_slots() {
            if graph.texture(&tex.texture_id).is_none() {
                issues.warning(
                    format!("materials[{i}].{slot}"),
                    format!("unknown texture '{}'", tex.texture_id),
                );
            }
        }
    }
}

fn check_meshes(graph: &SceneGraph, issues: &mut Issues) {
    let accessor_count = graph.accessors.len() as u32;
    for (i, mesh) in graph.meshes.iter().enumerate() {
        for (j, prim) in mesh.primitives.iter().enumerate() {
            if let Some(material) = &prim.material_id {
                if graph.material(material).is_none() {
                    issues.error(
                        format!("meshes[{i}].primitives[{j}].material"),
                        format!("unknown material '{material}'"),
                    );
                }
            }
            for (semantic, &accessor) in &prim.attributes {
                if accessor >= accessor_count {
                    issues.error(
                        format!("meshes[{i}].primitives[{j}].attributes.{semantic}"),
                        format!("accessor {accessor} out of range"),
                    );
                }
            }
            if let Some(indices) = prim.indices.filter(|&a| a >= accessor_count) {
                issues.error(
                    format!("meshes[{i}].primitives[{j}].indices"),
                    format!("accessor {indices} out of range"),
                );
            }
        }
    }
}

fn check_buffers(graph: &SceneGraph, issues: &mut Issues) {
    for (i, accessor) in graph.accessors.iter().enumerate() {
        if accessor.buffer_view as usize >= graph.buffer_views.len() {
            issues.error(
                format!("accessors[{i}].bufferView"),
                format!("buffer view {} out of range", accessor.buffer_view),
            );
        }
    }
    for (i, view) in graph.buffer_views.iter().enumerate() {
        match graph.buffers.get(view.buffer as usize) {
            None => issues.error(
                format!("bufferViews[{i}].buffer"),
                format!("buffer {} out of range", view.buffer),
            ),
            Some(buffer) => {
                let end = view.byte_offset as u64 + view.byte_length as u64;
                if end > buffer.byte_length as u64 {
                    issues.warning(
                        format!("bufferViews[{i}]"),
                        format!(
                            "range ends at byte {end}, past buffer length {}",
                            buffer.byte_length
                        ),
                    );
                }
            }
        }
    }
}
