//! Resource table chunk payloads
//!
//! Every table starts with a u32 entry count. Ids and other short repeated
//! text go through the string table; URIs are written inline since data
//! URIs can be arbitrarily large.

use std::collections::BTreeMap;

use scenepack_shared::{
    Accessor, Animation, AnimationChannel, AnimationSampler, Bounds, Buffer, BufferView,
    ComponentType, MagFilter, Material, Mesh, MinFilter, Primitive, SceneGraph, Skin, SkinJoint,
    Texture, TextureRef, TextureSource, WrapMode,
};

use super::tags::{read_opt_tag, read_tag, write_opt_tag, write_tag};
use super::{read_opt_u32, write_opt_u32};
use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{FormatError, Result};
use crate::string_table::StringTable;

const SOURCE_URI: u8 = 0;
const SOURCE_DATA_URI: u8 = 1;
const SOURCE_BUFFER_VIEW: u8 = 2;

fn invalid_code(what: &'static str, value: u32) -> FormatError {
    FormatError::InvalidTag { what, value }
}

fn read_count(r: &mut ByteReader<'_>) -> Result<usize> {
    Ok(r.read_u32()? as usize)
}

// ============================================================================
// Materials
// ============================================================================

fn write_texture_ref(
    w: &mut ByteWriter,
    strings: &mut StringTable,
    tex: Option<&TextureRef>,
) -> Result<()> {
    match tex {
        Some(tex) => {
            w.write_bool(true);
            w.write_string_ref(strings, &tex.texture_id)?;
            w.write_u32(tex.tex_coord);
        }
        None => w.write_bool(false),
    }
    Ok(())
}

fn read_texture_ref(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Option<TextureRef>> {
    if !r.read_bool()? {
        return Ok(None);
    }
    Ok(Some(TextureRef {
        texture_id: r.read_string_ref(strings)?,
        tex_coord: r.read_u32()?,
    }))
}

pub fn write_materials(
    w: &mut ByteWriter,
    strings: &mut StringTable,
    materials: &[Material],
) -> Result<()> {
    w.write_u32(materials.len() as u32);
    for m in materials {
        w.write_string_ref(strings, &m.id)?;
        w.write_string_ref(strings, &m.name)?;
        write_tag(w, m.kind);
        w.write_quat(m.base_color);
        w.write_f32(m.metallic);
        w.write_f32(m.roughness);
        write_texture_ref(w, strings, m.base_color_texture.as_ref())?;
        write_texture_ref(w, strings, m.metallic_roughness_texture.as_ref())?;
        write_texture_ref(w, strings, m.normal_texture.as_ref())?;
        write_texture_ref(w, strings, m.occlusion_texture.as_ref())?;
        write_texture_ref(w, strings, m.emissive_texture.as_ref())?;
        w.write_vec3(m.emissive);
        write_tag(w, m.alpha_mode);
        w.write_f32(m.alpha_cutoff);
        w.write_bool(m.double_sided);
    }
    Ok(())
}

pub fn read_materials(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Vec<Material>> {
    let count = read_count(r)?;
    let mut materials = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        materials.push(Material {
            id: r.read_string_ref(strings)?,
            name: r.read_string_ref(strings)?,
            kind: read_tag(r)?,
            base_color: r.read_quat()?,
            metallic: r.read_f32()?,
            roughness: r.read_f32()?,
            base_color_texture: read_texture_ref(r, strings)?,
            metallic_roughness_texture: read_texture_ref(r, strings)?,
            normal_texture: read_texture_ref(r, strings)?,
            occlusion_texture: read_texture_ref(r, strings)?,
            emissive_texture: read_texture_ref(r, strings)?,
            emissive: r.read_vec3()?,
            alpha_mode: read_tag(r)?,
            alpha_cutoff: r.read_f32()?,
            double_sided: r.read_bool()?,
        });
    }
    Ok(materials)
}

// ============================================================================
// Textures
// ============================================================================

pub fn write_textures(
    w: &mut ByteWriter,
    strings: &mut StringTable,
    textures: &[Texture],
) -> Result<()> {
    w.write_u32(textures.len() as u32);
    for t in textures {
        w.write_string_ref(strings, &t.id)?;
        w.write_string_ref(strings, &t.name)?;
        match &t.source {
            TextureSource::Uri { uri } => {
                w.write_u8(SOURCE_URI);
                w.write_string(uri);
            }
            TextureSource::DataUri { uri } => {
                w.write_u8(SOURCE_DATA_URI);
                w.write_string(uri);
            }
            TextureSource::BufferView {
                buffer_view,
                mime_type,
            } => {
                w.write_u8(SOURCE_BUFFER_VIEW);
                w.write_u32(*buffer_view);
                w.write_string_ref(strings, mime_type)?;
            }
        }
        w.write_u32(t.width);
        w.write_u32(t.height);
        w.write_u32(t.min_filter.gl_code());
        w.write_u32(t.mag_filter.gl_code());
        w.write_u32(t.wrap_s.gl_code());
        w.write_u32(t.wrap_t.gl_code());
    }
    Ok(())
}

fn read_wrap(r: &mut ByteReader<'_>) -> Result<WrapMode> {
    let code = r.read_u32()?;
    WrapMode::from_gl_code(code).ok_or(invalid_code("wrap mode", code))
}

pub fn read_textures(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Vec<Texture>> {
    let count = read_count(r)?;
    let mut textures = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let id = r.read_string_ref(strings)?;
        let name = r.read_string_ref(strings)?;
        let source = match r.read_u8()? {
            SOURCE_URI => TextureSource::Uri {
                uri: r.read_string()?,
            },
            SOURCE_DATA_URI => TextureSource::DataUri {
                uri: r.read_string()?,
            },
            SOURCE_BUFFER_VIEW => TextureSource::BufferView {
                buffer_view: r.read_u32()?,
                mime_type: r.read_string_ref(strings)?,
            },
            other => return Err(invalid_code("texture source", other as u32)),
        };
        let width = r.read_u32()?;
        let height = r.read_u32()?;
        let min_code = r.read_u32()?;
        let min_filter =
            MinFilter::from_gl_code(min_code).ok_or(invalid_code("min filter", min_code))?;
        let mag_code = r.read_u32()?;
        let mag_filter =
            MagFilter::from_gl_code(mag_code).ok_or(invalid_code("mag filter", mag_code))?;

        textures.push(Texture {
            id,
            name,
            source,
            width,
            height,
            min_filter,
            mag_filter,
            wrap_s: read_wrap(r)?,
            wrap_t: read_wrap(r)?,
        });
    }
    Ok(textures)
}

// ============================================================================
// Meshes
// ============================================================================

pub fn write_meshes(w: &mut ByteWriter, strings: &mut StringTable, meshes: &[Mesh]) -> Result<()> {
    w.write_u32(meshes.len() as u32);
    for mesh in meshes {
        w.write_string_ref(strings, &mesh.id)?;
        w.write_string_ref(strings, &mesh.name)?;
        w.write_count_u16("primitives", mesh.primitives.len())?;
        for prim in &mesh.primitives {
            w.write_count_u16("attributes", prim.attributes.len())?;
            for (semantic, accessor) in &prim.attributes {
                w.write_string_ref(strings, semantic)?;
                w.write_u32(*accessor);
            }
            write_opt_u32(w, prim.indices);
            w.write_opt_string_ref(strings, prim.material_id.as_deref())?;
            write_tag(w, prim.mode);
        }
        w.write_vec3(mesh.bounds.min);
        w.write_vec3(mesh.bounds.max);
    }
    Ok(())
}

pub fn read_meshes(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Vec<Mesh>> {
    let count = read_count(r)?;
    let mut meshes = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let id = r.read_string_ref(strings)?;
        let name = r.read_string_ref(strings)?;
        let prim_count = r.read_u16()? as usize;
        let mut primitives = Vec::with_capacity(prim_count);
        for _ in 0..prim_count {
            let attr_count = r.read_u16()? as usize;
            let mut attributes = BTreeMap::new();
            for _ in 0..attr_count {
                let semantic = r.read_string_ref(strings)?;
                attributes.insert(semantic, r.read_u32()?);
            }
            primitives.push(Primitive {
                attributes,
                indices: read_opt_u32(r)?,
                material_id: r.read_opt_string_ref(strings)?,
                mode: read_tag(r)?,
            });
        }
        meshes.push(Mesh {
            id,
            name,
            primitives,
            bounds: Bounds {
                min: r.read_vec3()?,
                max: r.read_vec3()?,
            },
        });
    }
    Ok(meshes)
}

// ============================================================================
// Animations and skins
// ============================================================================

pub fn write_animations(
    w: &mut ByteWriter,
    strings: &mut StringTable,
    animations: &[Animation],
) -> Result<()> {
    w.write_u32(animations.len() as u32);
    for anim in animations {
        w.write_string_ref(strings, &anim.id)?;
        w.write_string_ref(strings, &anim.name)?;
        w.write_f32(anim.duration);
        w.write_u32(anim.channels.len() as u32);
        for channel in &anim.channels {
            w.write_string_ref(strings, &channel.target_node)?;
            write_tag(w, channel.path);
            w.write_u32(channel.sampler);
        }
        w.write_u32(anim.samplers.len() as u32);
        for sampler in &anim.samplers {
            w.write_u32(sampler.input);
            w.write_u32(sampler.output);
            write_tag(w, sampler.interpolation);
        }
    }
    Ok(())
}

pub fn read_animations(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Vec<Animation>> {
    let count = read_count(r)?;
    let mut animations = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let id = r.read_string_ref(strings)?;
        let name = r.read_string_ref(strings)?;
        let duration = r.read_f32()?;

        let channel_count = read_count(r)?;
        let mut channels = Vec::with_capacity(channel_count.min(1024));
        for _ in 0..channel_count {
            channels.push(AnimationChannel {
                target_node: r.read_string_ref(strings)?,
                path: read_tag(r)?,
                sampler: r.read_u32()?,
            });
        }

        let sampler_count = read_count(r)?;
        let mut samplers = Vec::with_capacity(sampler_count.min(1024));
        for _ in 0..sampler_count {
            samplers.push(AnimationSampler {
                input: r.read_u32()?,
                output: r.read_u32()?,
                interpolation: read_tag(r)?,
            });
        }

        animations.push(Animation {
            id,
            name,
            duration,
            channels,
            samplers,
        });
    }
    Ok(animations)
}

pub fn write_skins(w: &mut ByteWriter, strings: &mut StringTable, skins: &[Skin]) -> Result<()> {
    w.write_u32(skins.len() as u32);
    for skin in skins {
        w.write_string_ref(strings, &skin.id)?;
        w.write_string_ref(strings, &skin.name)?;
        w.write_u32(skin.joints.len() as u32);
        for joint in &skin.joints {
            w.write_string_ref(strings, &joint.node_id)?;
            for v in joint.inverse_bind_matrix {
                w.write_f32(v);
            }
        }
        w.write_opt_string_ref(strings, skin.skeleton.as_deref())?;
    }
    Ok(())
}

pub fn read_skins(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Vec<Skin>> {
    let count = read_count(r)?;
    let mut skins = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let id = r.read_string_ref(strings)?;
        let name = r.read_string_ref(strings)?;
        let joint_count = read_count(r)?;
        let mut joints = Vec::with_capacity(joint_count.min(1024));
        for _ in 0..joint_count {
            let node_id = r.read_string_ref(strings)?;
            let mut inverse_bind_matrix = [0.0f32; 16];
            for v in &mut inverse_bind_matrix {
                *v = r.read_f32()?;
            }
            joints.push(SkinJoint {
                node_id,
                inverse_bind_matrix,
            });
        }
        skins.push(Skin {
            id,
            name,
            joints,
            skeleton: r.read_opt_string_ref(strings)?,
        });
    }
    Ok(skins)
}

// ============================================================================
// Buffers, buffer views, accessors
// ============================================================================

fn write_opt_floats(w: &mut ByteWriter, values: Option<&[f32]>) -> Result<()> {
    match values {
        Some(values) => {
            w.write_bool(true);
            w.write_count_u16("accessor bound values", values.len())?;
            for v in values {
                w.write_f32(*v);
            }
        }
        None => w.write_bool(false),
    }
    Ok(())
}

fn read_opt_floats(r: &mut ByteReader<'_>) -> Result<Option<Vec<f32>>> {
    if !r.read_bool()? {
        return Ok(None);
    }
    let len = r.read_u16()? as usize;
    (0..len).map(|_| r.read_f32()).collect::<Result<Vec<_>>>().map(Some)
}

/// Buffers, then views, then accessors in one payload
pub fn write_buffers(w: &mut ByteWriter, strings: &mut StringTable, graph: &SceneGraph) -> Result<()> {
    w.write_u32(graph.buffers.len() as u32);
    for buffer in &graph.buffers {
        w.write_string_ref(strings, &buffer.id)?;
        w.write_u32(buffer.byte_length);
        match &buffer.data {
            Some(data) => {
                w.write_bool(true);
                w.write_bytes(data);
            }
            None => w.write_bool(false),
        }
    }

    w.write_u32(graph.buffer_views.len() as u32);
    for view in &graph.buffer_views {
        w.write_u32(view.buffer);
        w.write_u32(view.byte_offset);
        w.write_u32(view.byte_length);
        write_opt_u32(w, view.byte_stride);
        write_opt_tag(w, view.target);
    }

    w.write_u32(graph.accessors.len() as u32);
    for accessor in &graph.accessors {
        w.write_u32(accessor.buffer_view);
        w.write_u32(accessor.byte_offset);
        w.write_u32(accessor.component_type.gl_code());
        w.write_u32(accessor.count);
        write_tag(w, accessor.accessor_type);
        w.write_bool(accessor.normalized);
        write_opt_floats(w, accessor.min.as_deref())?;
        write_opt_floats(w, accessor.max.as_deref())?;
    }
    Ok(())
}

pub fn read_buffers(
    r: &mut ByteReader<'_>,
    strings: &StringTable,
    graph: &mut SceneGraph,
) -> Result<()> {
    let buffer_count = read_count(r)?;
    for _ in 0..buffer_count {
        let id = r.read_string_ref(strings)?;
        let byte_length = r.read_u32()?;
        let data = if r.read_bool()? {
            Some(r.read_bytes()?.to_vec())
        } else {
            None
        };
        graph.buffers.push(Buffer {
            id,
            byte_length,
            data,
        });
    }

    let view_count = read_count(r)?;
    for _ in 0..view_count {
        graph.buffer_views.push(BufferView {
            buffer: r.read_u32()?,
            byte_offset: r.read_u32()?,
            byte_length: r.read_u32()?,
            byte_stride: read_opt_u32(r)?,
            target: read_opt_tag(r)?,
        });
    }

    let accessor_count = read_count(r)?;
    for _ in 0..accessor_count {
        let buffer_view = r.read_u32()?;
        let byte_offset = r.read_u32()?;
        let code = r.read_u32()?;
        let component_type =
            ComponentType::from_gl_code(code).ok_or(invalid_code("component type", code))?;
        graph.accessors.push(Accessor {
            buffer_view,
            byte_offset,
            component_type,
            count: r.read_u32()?,
            accessor_type: read_tag(r)?,
            normalized: r.read_bool()?,
            min: read_opt_floats(r)?,
            max: read_opt_floats(r)?,
        });
    }
    Ok(())
}
