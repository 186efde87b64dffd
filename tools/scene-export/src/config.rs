//! Tool configuration (scene-export.toml)
//!
//! Every table and field is optional; a missing file section falls back to
//! the library defaults.
//!
//! ```toml
//! [gltf]
//! generator = "my-pipeline"
//! pretty = true
//! embed_buffer = false
//!
//! [binary]
//! alignment = 8
//!
//! [text]
//! pretty = true
//! embed_buffers = false
//!
//! [compile]
//! default_fov = 45.0
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use scene_common::{ChunkedOptions, TextOptions};
use serde::{Deserialize, Serialize};

use crate::compile::{DEFAULT_FOV_DEGREES, DirectCompileOptions};
use crate::exporter::GltfExportOptions;

/// Default config file name looked up next to the working directory
pub const CONFIG_FILE_NAME: &str = "scene-export.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// glTF/GLB output settings
    #[serde(default)]
    pub gltf: GltfConfig,
    /// Chunked binary (SCNB) settings
    #[serde(default)]
    pub binary: BinaryConfig,
    /// JSON scene settings
    #[serde(default)]
    pub text: TextConfig,
    /// Direct compiler settings
    #[serde(default)]
    pub compile: CompileConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GltfConfig {
    /// Overrides `asset.generator`
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub pretty: bool,
    /// `.gltf` output: embed the buffer as a data URI instead of writing a
    /// sibling `.bin` file
    #[serde(default)]
    pub embed_buffer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryConfig {
    /// Chunk alignment in bytes (default: 4)
    #[serde(default = "default_alignment")]
    pub alignment: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default)]
    pub pretty: bool,
    /// Write buffer payloads as base64 (default: true)
    #[serde(default = "default_true")]
    pub embed_buffers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Vertical field of view in degrees for cameras without `fov` (default: 60)
    #[serde(default = "default_fov")]
    pub default_fov: f32,
}

fn default_alignment() -> usize {
    4
}
fn default_true() -> bool {
    true
}
fn default_fov() -> f32 {
    DEFAULT_FOV_DEGREES
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            alignment: default_alignment(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            embed_buffers: default_true(),
        }
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            default_fov: default_fov(),
        }
    }
}

impl ExportConfig {
    /// glTF options for GLB (`binary`) or `.gltf` output
    ///
    /// `.gltf` output without `embed_buffer` leaves `buffer_uri` unset; the
    /// caller knows the sibling file name.
    pub fn gltf_options(&self, binary: bool) -> GltfExportOptions {
        let mut options = GltfExportOptions {
            binary,
            pretty: self.gltf.pretty,
            ..Default::default()
        };
        if let Some(generator) = &self.gltf.generator {
            options.generator = generator.clone();
        }
        options
    }

    pub fn chunked_options(&self) -> ChunkedOptions {
        ChunkedOptions {
            alignment: self.binary.alignment,
        }
    }

    pub fn text_options(&self) -> TextOptions {
        TextOptions {
            pretty: self.text.pretty,
            embed_buffers: self.text.embed_buffers,
        }
    }

    pub fn compile_options(&self) -> DirectCompileOptions {
        DirectCompileOptions {
            output: self.gltf_options(true),
            default_fov: self.compile.default_fov,
            ..Default::default()
        }
    }
}

/// Load and parse a config file
pub fn load_config(path: &Path) -> Result<ExportConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;
    let config: ExportConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {:?}", path))?;
    Ok(config)
}

/// Explicit path, else `scene-export.toml` in the working directory if
/// present, else defaults
pub fn resolve_config(path: Option<&Path>) -> Result<ExportConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let local = Path::new(CONFIG_FILE_NAME);
            if local.is_file() {
                tracing::debug!("Using {:?}", local);
                load_config(local)
            } else {
                Ok(ExportConfig::default())
            }
        }
    }
}
