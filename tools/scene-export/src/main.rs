//! scene-export - scene conversion tool
//!
//! Converts scene graphs (JSON, SCNB) to glTF/GLB or the chunked binary
//! encoding, and compiles compositions straight to GLB.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scene_common::formats::{SceneEncoding, sniff_encoding};
use scenepack_shared::{CHUNKED_SCENE_FORMAT, Composition, JSON_SCENE_FORMAT, SceneGraph};
use std::path::{Path, PathBuf};

use scene_export::config::{self, ExportConfig};
use scene_export::{ExportWarning, GltfExport, compile_composition, export_gltf};

#[derive(Parser)]
#[command(name = "scene-export")]
#[command(about = "Scene graph and composition export tool")]
#[command(version)]
struct Cli {
    /// Config file (default: ./scene-export.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene to glTF JSON with a sibling .bin buffer
    Gltf {
        /// Input scene (.json, .scnb or .scnj)
        input: PathBuf,

        /// Output .gltf file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a scene to a GLB container
    Glb {
        /// Input scene (.json, .scnb or .scnj)
        input: PathBuf,

        /// Output .glb file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a scene as chunked binary (.scnb)
    Binary {
        /// Input scene (.json or .scnj)
        input: PathBuf,

        /// Output .scnb file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a binary scene back to JSON
    Decode {
        /// Input .scnb or .scnj file
        input: PathBuf,

        /// Output .json file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a composition directly to GLB
    Compile {
        /// Input composition (.json)
        input: PathBuf,

        /// Output .glb file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a scene for structural and reference errors
    Validate {
        /// Input scene (.json, .scnb or .scnj)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Gltf { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("gltf"));
            tracing::info!("Exporting {:?} -> {:?}", input, output);
            let graph = load_scene(&input, &config)?;
            export_gltf_files(&graph, &output, &config)?;
            tracing::info!("Done!");
        }

        Commands::Glb { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("glb"));
            tracing::info!("Exporting {:?} -> {:?}", input, output);
            let graph = load_scene(&input, &config)?;
            let export = export_gltf(&graph, &config.gltf_options(true))?;
            write_export(&export, &output)?;
            tracing::info!("Done!");
        }

        Commands::Binary { input, output } => {
            let output =
                output.unwrap_or_else(|| input.with_extension(CHUNKED_SCENE_FORMAT.extension));
            tracing::info!("Encoding {:?} -> {:?}", input, output);
            let graph = load_scene(&input, &config)?;
            let bytes = scene_common::encode_scene(&graph, &config.chunked_options())?;
            write_file(&output, &bytes)?;
            tracing::info!("Wrote {} bytes", bytes.len());
        }

        Commands::Decode { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("json"));
            tracing::info!("Decoding {:?} -> {:?}", input, output);
            let graph = load_scene(&input, &config)?;
            let text = scene_common::to_json(&graph, &config.text_options())?;
            write_file(&output, text.as_bytes())?;
            tracing::info!("Done!");
        }

        Commands::Compile { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("glb"));
            tracing::info!("Compiling {:?} -> {:?}", input, output);
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read composition: {:?}", input))?;
            let composition: Composition = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse composition: {:?}", input))?;
            let export = compile_composition(&composition, &config.compile_options())?;
            write_export(&export, &output)?;
            tracing::info!("Done!");
        }

        Commands::Validate { input } => {
            tracing::info!("Validating {:?}", input);
            let graph = load_scene(&input, &config)?;
            let report = scene_common::validate(&graph);
            for issue in &report.issues {
                tracing::warn!("{:?} {}: {}", issue.severity, issue.path, issue.message);
            }
            let errors = report.errors().count();
            if errors > 0 {
                anyhow::bail!("{:?} has {} error(s)", input, errors);
            }
            tracing::info!(
                "Scene is valid! ({} warning(s))",
                report.warnings().count()
            );
        }
    }

    Ok(())
}

/// Load a scene, choosing the decoder by its leading magic bytes
fn load_scene(path: &Path, config: &ExportConfig) -> Result<SceneGraph> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;

    let graph = match sniff_encoding(&bytes) {
        SceneEncoding::Chunked => scene_common::decode_scene(&bytes, &config.chunked_options())
            .with_context(|| format!("Failed to decode {:?}", path))?,
        SceneEncoding::JsonWrapped => {
            tracing::warn!(
                "{:?}: the .{} encoding is deprecated, re-encode as .{}",
                path,
                JSON_SCENE_FORMAT.extension,
                CHUNKED_SCENE_FORMAT.extension
            );
            #[allow(deprecated)]
            let graph = scene_common::formats::text::from_binary(&bytes)
                .with_context(|| format!("Failed to decode {:?}", path))?;
            graph
        }
        SceneEncoding::Text => {
            let text = std::str::from_utf8(&bytes)
                .with_context(|| format!("{:?} is not a binary scene or UTF-8 JSON", path))?;
            scene_common::from_json(text).with_context(|| format!("Failed to parse {:?}", path))?
        }
    };
    Ok(graph)
}

/// `.gltf` plus `<stem>.bin`, or a single `.gltf` with an embedded buffer
fn export_gltf_files(graph: &SceneGraph, output: &Path, config: &ExportConfig) -> Result<()> {
    let mut options = config.gltf_options(false);
    let bin_path = output.with_extension("bin");
    if !config.gltf.embed_buffer {
        let file_name = bin_path
            .file_name()
            .and_then(|n| n.to_str())
            .context("Output path has no file name")?;
        options.buffer_uri = Some(file_name.to_string());
    }

    let export = export_gltf(graph, &options)?;
    write_export(&export, output)?;
    if options.buffer_uri.is_some() && !export.buffer.is_empty() {
        write_file(&bin_path, &export.buffer)?;
    }
    Ok(())
}

fn write_export(export: &GltfExport, output: &Path) -> Result<()> {
    log_warnings(&export.warnings);
    write_file(output, export.output_bytes())?;
    let stats = &export.stats;
    tracing::info!(
        "{} nodes, {} meshes, {} materials, {} animations, {} bytes",
        stats.node_count,
        stats.mesh_count,
        stats.material_count,
        stats.animation_count,
        export.output_bytes().len()
    );
    Ok(())
}

fn log_warnings(warnings: &[ExportWarning]) {
    if !warnings.is_empty() {
        tracing::warn!("{} export warning(s)", warnings.len());
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {:?}", path))
}
