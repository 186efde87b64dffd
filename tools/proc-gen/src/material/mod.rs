//! Material composition
//!
//! A material is built in layers, each overriding the last:
//! 1. defaults (white, dielectric, roughness 0.5)
//! 2. the named preset in the `material` property
//! 3. the blend of the object's visual traits
//! 4. direct property overrides (`color`, `opacity`, `metalness`, ...)

mod color;
mod presets;
mod traits;

use scenepack_shared::{AlphaMode, Properties, PropertyAccess, PropertyValue, TraitDecl};
use serde::Serialize;

pub use color::{parse_color, parse_color_str};
pub use presets::MaterialPreset;
pub use traits::{TraitBlend, TraitCompositor, VisualTraitPreset};

/// Resolved PBR factors for one material
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaterialFactors {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for MaterialFactors {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            emissive: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

impl MaterialFactors {
    /// Key under which identical factor sets deduplicate
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn is_emissive(&self) -> bool {
        self.emissive.iter().any(|c| *c > 0.0)
    }
}

/// Compose material factors with the built-in trait presets
pub fn compose_material(properties: &Properties, traits: &[TraitDecl]) -> MaterialFactors {
    compose_material_with(&TraitCompositor::default(), properties, traits)
}

/// Compose material factors with a caller-supplied trait compositor
pub fn compose_material_with(
    compositor: &TraitCompositor,
    properties: &Properties,
    traits: &[TraitDecl],
) -> MaterialFactors {
    let mut factors = MaterialFactors::default();

    if let Some(descriptor) = properties.string("material") {
        match MaterialPreset::lookup(descriptor) {
            Some(preset) => preset.apply(&mut factors),
            None => tracing::debug!("unknown material preset '{}', using defaults", descriptor),
        }
    }

    compositor.compose(traits).apply(&mut factors);

    apply_overrides(properties, &mut factors);
    factors
}

fn apply_overrides(properties: &Properties, factors: &mut MaterialFactors) {
    let number = |key: &str| properties.property(key).and_then(PropertyValue::as_f32);

    if let Some(color) = properties.property("color").and_then(parse_color) {
        factors.base_color = color;
        if color[3] < 1.0 {
            factors.alpha_mode = AlphaMode::Blend;
        }
    }
    if let Some(opacity) = number("opacity") {
        let opacity = opacity.clamp(0.0, 1.0);
        factors.base_color[3] = opacity;
        if opacity < 1.0 {
            factors.alpha_mode = AlphaMode::Blend;
        }
    }
    if let Some(metallic) = number("metalness").or_else(|| number("metallic")) {
        factors.metallic = metallic.clamp(0.0, 1.0);
    }
    if let Some(roughness) = number("roughness") {
        factors.roughness = roughness.clamp(0.0, 1.0);
    }

    let emissive_color = properties.property("emissive").and_then(parse_color);
    let intensity = number("emissiveIntensity");
    match (emissive_color, intensity) {
        (Some(color), intensity) => {
            let intensity = intensity.unwrap_or(1.0).max(0.0);
            factors.emissive = [color[0] * intensity, color[1] * intensity, color[2] * intensity];
        }
        (None, Some(intensity)) => {
            // Intensity alone scales whatever emission the preset or traits gave
            let intensity = intensity.max(0.0);
            factors.emissive = factors.emissive.map(|c| c * intensity);
        }
        (None, None) => {}
    }

    if let Some(double_sided) = properties.property("doubleSided").and_then(PropertyValue::as_bool) {
        factors.double_sided = double_sided;
    }
    if let Some(cutoff) = number("alphaCutoff") {
        factors.alpha_cutoff = cutoff.clamp(0.0, 1.0);
        if factors.alpha_mode == AlphaMode::Opaque {
            factors.alpha_mode = AlphaMode::Mask;
        }
    }
}
