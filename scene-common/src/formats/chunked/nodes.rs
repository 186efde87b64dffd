//! Metadata and node chunk payloads
//!
//! Nodes are flattened in pre-order with the index of their parent
//! (`-1` for the root). Every parent precedes its children, so decoding
//! rebuilds the hierarchy in a single forward pass.

use std::collections::BTreeMap;

use scenepack_shared::{
    CameraComponent, Component, LightComponent, NodeId, Projection, SceneGraph, SceneMetadata,
    SceneNode,
};
use tracing::debug;

use super::tags::{read_tag, write_tag};
use super::{read_opt_f32, write_opt_f32};
use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{FormatError, Result};
use crate::string_table::StringTable;

const COMPONENT_MESH: u8 = 0;
const COMPONENT_CAMERA: u8 = 1;
const COMPONENT_LIGHT: u8 = 2;
const COMPONENT_CUSTOM: u8 = 3;

const PROJECTION_PERSPECTIVE: u8 = 0;
const PROJECTION_ORTHOGRAPHIC: u8 = 1;

// ============================================================================
// Metadata
// ============================================================================

pub fn write_metadata(
    w: &mut ByteWriter,
    strings: &mut StringTable,
    graph: &SceneGraph,
) -> Result<()> {
    let meta = &graph.metadata;
    w.write_string_ref(strings, &graph.version)?;
    w.write_string_ref(strings, &meta.name)?;
    w.write_opt_string_ref(strings, meta.description.as_deref())?;
    w.write_opt_string_ref(strings, meta.author.as_deref())?;
    w.write_opt_string_ref(strings, meta.license.as_deref())?;
    w.write_opt_string_ref(strings, meta.created_at.as_deref())?;
    w.write_opt_string_ref(strings, meta.modified_at.as_deref())?;
    write_string_list(w, strings, &meta.tags)
}

pub fn read_metadata(
    r: &mut ByteReader<'_>,
    strings: &StringTable,
    graph: &mut SceneGraph,
) -> Result<()> {
    graph.version = r.read_string_ref(strings)?;
    graph.metadata = SceneMetadata {
        name: r.read_string_ref(strings)?,
        description: r.read_opt_string_ref(strings)?,
        author: r.read_opt_string_ref(strings)?,
        license: r.read_opt_string_ref(strings)?,
        created_at: r.read_opt_string_ref(strings)?,
        modified_at: r.read_opt_string_ref(strings)?,
        tags: read_string_list(r, strings)?,
    };
    Ok(())
}

pub(super) fn write_string_list(
    w: &mut ByteWriter,
    strings: &mut StringTable,
    list: &[String],
) -> Result<()> {
    w.write_count_u16("string list entries", list.len())?;
    for s in list {
        w.write_string_ref(strings, s)?;
    }
    Ok(())
}

pub(super) fn read_string_list(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Vec<String>> {
    let count = r.read_u16()? as usize;
    (0..count).map(|_| r.read_string_ref(strings)).collect()
}

// ============================================================================
// Nodes
// ============================================================================

pub fn write_nodes(w: &mut ByteWriter, strings: &mut StringTable, graph: &SceneGraph) -> Result<()> {
    let order: Vec<_> = graph
        .traverse_pre_order()
        .into_iter()
        .filter_map(|(id, parent)| graph.node(id).map(|node| (id, parent, node)))
        .collect();
    if order.len() < graph.node_count() {
        debug!(
            "Skipping {} node(s) not reachable from the root",
            graph.node_count() - order.len()
        );
    }

    // Arena handle -> position in the flattened list
    let mut flat_index = vec![-1i32; graph.node_count()];
    w.write_u32(order.len() as u32);

    for (position, (id, parent, node)) in order.into_iter().enumerate() {
        flat_index[id.index()] = position as i32;
        let parent_index = parent.map(|p| flat_index[p.index()]).unwrap_or(-1);
        w.write_i32(parent_index);
        write_node(w, strings, node)?;
    }
    Ok(())
}

fn write_node(w: &mut ByteWriter, strings: &mut StringTable, node: &SceneNode) -> Result<()> {
    w.write_string_ref(strings, &node.id)?;
    w.write_string_ref(strings, &node.name)?;
    w.write_string_ref(strings, &node.kind)?;
    w.write_transform(&node.transform);
    w.write_bool(node.active);
    w.write_u32(node.layer);
    write_string_list(w, strings, &node.tags)?;

    w.write_count_u16("components", node.components.len())?;
    for component in &node.components {
        write_component(w, strings, component)?;
    }

    if node.metadata.is_empty() {
        w.write_string("");
    } else {
        w.write_string(&serde_json::to_string(&node.metadata)?);
    }
    w.write_opt_string_ref(strings, node.prefab.as_deref())
}

fn write_component(
    w: &mut ByteWriter,
    strings: &mut StringTable,
    component: &Component,
) -> Result<()> {
    match component {
        Component::Mesh {
            mesh_id,
            material_id,
        } => {
            w.write_u8(COMPONENT_MESH);
            w.write_string_ref(strings, mesh_id)?;
            w.write_opt_string_ref(strings, material_id.as_deref())?;
        }
        Component::Camera(camera) => {
            w.write_u8(COMPONENT_CAMERA);
            match camera.projection {
                Projection::Perspective {
                    fov_degrees,
                    aspect_ratio,
                } => {
                    w.write_u8(PROJECTION_PERSPECTIVE);
                    w.write_f32(fov_degrees);
                    write_opt_f32(w, aspect_ratio);
                }
                Projection::Orthographic { xmag, ymag } => {
                    w.write_u8(PROJECTION_ORTHOGRAPHIC);
                    w.write_f32(xmag);
                    w.write_f32(ymag);
                }
            }
            w.write_f32(camera.near);
            write_opt_f32(w, camera.far);
        }
        Component::Light(light) => {
            w.write_u8(COMPONENT_LIGHT);
            write_tag(w, light.kind);
            w.write_vec3(light.color);
            w.write_f32(light.intensity);
            write_opt_f32(w, light.range);
            w.write_f32(light.inner_cone_angle);
            w.write_f32(light.outer_cone_angle);
        }
        Component::Custom { kind, data } => {
            w.write_u8(COMPONENT_CUSTOM);
            w.write_string_ref(strings, kind)?;
            w.write_string(&serde_json::to_string(data)?);
        }
    }
    Ok(())
}

pub fn read_nodes(
    r: &mut ByteReader<'_>,
    strings: &StringTable,
    graph: &mut SceneGraph,
) -> Result<()> {
    if !graph.nodes.is_empty() {
        return Err(FormatError::BadHierarchy("duplicate node chunk".into()));
    }
    let count = r.read_u32()? as usize;

    for position in 0..count {
        let parent = r.read_i32()?;
        let node = read_node(r, strings)?;

        if parent < 0 {
            if graph.root.is_some() {
                return Err(FormatError::BadHierarchy(format!(
                    "node {position} is a second root"
                )));
            }
            graph.set_root(node);
        } else if (parent as usize) < position {
            graph
                .add_child(NodeId(parent as u32), node)
                .ok_or_else(|| {
                    FormatError::BadHierarchy(format!("node {position} has unknown parent {parent}"))
                })?;
        } else {
            return Err(FormatError::BadHierarchy(format!(
                "node {position} refers to parent {parent} that does not precede it"
            )));
        }
    }
    Ok(())
}

fn read_node(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<SceneNode> {
    let id = r.read_string_ref(strings)?;
    let name = r.read_string_ref(strings)?;
    let kind = r.read_string_ref(strings)?;
    let transform = r.read_transform()?;
    let active = r.read_bool()?;
    let layer = r.read_u32()?;
    let tags = read_string_list(r, strings)?;

    let component_count = r.read_u16()? as usize;
    let components = (0..component_count)
        .map(|_| read_component(r, strings))
        .collect::<Result<Vec<_>>>()?;

    let metadata_json = r.read_string()?;
    let metadata = if metadata_json.is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str(&metadata_json)?
    };
    let prefab = r.read_opt_string_ref(strings)?;

    Ok(SceneNode {
        id,
        name,
        kind,
        transform,
        active,
        layer,
        tags,
        children: Vec::new(),
        components,
        metadata,
        prefab,
    })
}

fn read_component(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Component> {
    let tag = r.read_u8()?;
    let component = match tag {
        COMPONENT_MESH => Component::Mesh {
            mesh_id: r.read_string_ref(strings)?,
            material_id: r.read_opt_string_ref(strings)?,
        },
        COMPONENT_CAMERA => {
            let projection = match r.read_u8()? {
                PROJECTION_PERSPECTIVE => Projection::Perspective {
                    fov_degrees: r.read_f32()?,
                    aspect_ratio: read_opt_f32(r)?,
                },
                PROJECTION_ORTHOGRAPHIC => Projection::Orthographic {
                    xmag: r.read_f32()?,
                    ymag: r.read_f32()?,
                },
                other => {
                    return Err(FormatError::InvalidTag {
                        what: "camera projection",
                        value: other as u32,
                    });
                }
            };
            Component::Camera(CameraComponent {
                projection,
                near: r.read_f32()?,
                far: read_opt_f32(r)?,
            })
        }
        COMPONENT_LIGHT => Component::Light(LightComponent {
            kind: read_tag(r)?,
            color: r.read_vec3()?,
            intensity: r.read_f32()?,
            range: read_opt_f32(r)?,
            inner_cone_angle: r.read_f32()?,
            outer_cone_angle: r.read_f32()?,
        }),
        COMPONENT_CUSTOM => {
            let kind = r.read_string_ref(strings)?;
            let data = serde_json::from_str(&r.read_string()?)?;
            Component::Custom { kind, data }
        }
        other => {
            return Err(FormatError::InvalidTag {
                what: "component",
                value: other as u32,
            });
        }
    };
    Ok(component)
}
