//! Visual trait blending
//!
//! Each visual trait contributes a partial set of PBR factors. Traits that
//! are not visual (physics, networking, ...) are ignored. When several traits
//! set the same factor:
//! - numeric factors (metallic, roughness, opacity) are averaged
//! - emissive color takes the per-channel maximum
//! - alpha mode keeps the strongest (Blend > Mask > Opaque)

use hashbrown::HashMap;
use scenepack_shared::{AlphaMode, PropertyAccess, PropertyValue, TraitDecl};

use super::MaterialFactors;
use super::color::parse_color;

/// Partial factors contributed by one visual trait
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisualTraitPreset {
    pub metallic: Option<f32>,
    pub roughness: Option<f32>,
    pub opacity: Option<f32>,
    pub emissive: Option<[f32; 3]>,
    pub alpha_mode: Option<AlphaMode>,
    pub alpha_cutoff: Option<f32>,
}

/// Blended result of all visual traits on an object
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TraitBlend {
    pub metallic: Option<f32>,
    pub roughness: Option<f32>,
    pub opacity: Option<f32>,
    pub emissive: Option<[f32; 3]>,
    pub alpha_mode: Option<AlphaMode>,
    pub alpha_cutoff: Option<f32>,
}

impl TraitBlend {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields this blend sets
    pub fn apply(&self, factors: &mut MaterialFactors) {
        if let Some(metallic) = self.metallic {
            factors.metallic = metallic;
        }
        if let Some(roughness) = self.roughness {
            factors.roughness = roughness;
        }
        if let Some(opacity) = self.opacity {
            factors.base_color[3] = opacity;
        }
        if let Some(emissive) = self.emissive {
            factors.emissive = emissive;
        }
        if let Some(mode) = self.alpha_mode {
            factors.alpha_mode = mode;
        }
        if let Some(cutoff) = self.alpha_cutoff {
            factors.alpha_cutoff = cutoff;
        }
    }
}

fn alpha_rank(mode: AlphaMode) -> u8 {
    match mode {
        AlphaMode::Opaque => 0,
        AlphaMode::Mask => 1,
        AlphaMode::Blend => 2,
    }
}

#[derive(Default)]
struct Average {
    sum: f32,
    count: u32,
}

impl Average {
    fn add(&mut self, value: Option<f32>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn get(&self) -> Option<f32> {
        (self.count > 0).then(|| self.sum / self.count as f32)
    }
}

/// Registry of visual trait presets, constructed by the caller
#[derive(Clone, Debug)]
pub struct TraitCompositor {
    presets: HashMap<String, VisualTraitPreset>,
}

impl Default for TraitCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl TraitCompositor {
    /// Compositor with the built-in visual traits
    pub fn new() -> Self {
        let mut compositor = Self::empty();
        compositor.register(
            "glowing",
            VisualTraitPreset {
                emissive: Some([1.0, 1.0, 1.0]),
                ..Default::default()
            },
        );
        compositor.register(
            "emissive",
            VisualTraitPreset {
                emissive: Some([1.0, 1.0, 1.0]),
                ..Default::default()
            },
        );
        compositor.register(
            "transparent",
            VisualTraitPreset {
                opacity: Some(0.5),
                alpha_mode: Some(AlphaMode::Blend),
                ..Default::default()
            },
        );
        compositor.register(
            "reflective",
            VisualTraitPreset {
                metallic: Some(0.8),
                roughness: Some(0.1),
                ..Default::default()
            },
        );
        compositor.register(
            "metallic",
            VisualTraitPreset {
                metallic: Some(1.0),
                roughness: Some(0.3),
                ..Default::default()
            },
        );
        compositor.register(
            "matte",
            VisualTraitPreset {
                metallic: Some(0.0),
                roughness: Some(1.0),
                ..Default::default()
            },
        );
        compositor.register(
            "hologram",
            VisualTraitPreset {
                emissive: Some([0.0, 0.8, 1.0]),
                opacity: Some(0.6),
                alpha_mode: Some(AlphaMode::Blend),
                ..Default::default()
            },
        );
        compositor
    }

    /// Compositor with no presets
    pub fn empty() -> Self {
        Self {
            presets: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, preset: VisualTraitPreset) {
        self.presets.insert(name.to_ascii_lowercase(), preset);
    }

    pub fn preset(&self, name: &str) -> Option<&VisualTraitPreset> {
        self.presets.get(&name.to_ascii_lowercase())
    }

    /// Preset for one declared trait with its config overrides applied
    pub fn resolve(&self, decl: &TraitDecl) -> Option<VisualTraitPreset> {
        let name = decl.name.trim_start_matches('@').to_ascii_lowercase();
        let mut preset = *self.preset(&name)?;
        let config = &decl.config;

        let color = |key: &str| config.property(key).and_then(parse_color);
        let number = |key: &str| config.property(key).and_then(PropertyValue::as_f32);

        match name.as_str() {
            "glowing" | "emissive" => {
                let (color_key, intensity_key) = if name == "glowing" {
                    ("glow_color", "glow_intensity")
                } else {
                    ("emission_color", "emission_intensity")
                };
                let base = color(color_key)
                    .or_else(|| color("color"))
                    .map(|c| [c[0], c[1], c[2]])
                    .or(preset.emissive)
                    .unwrap_or([1.0; 3]);
                let intensity = number(intensity_key)
                    .or_else(|| number("intensity"))
                    .unwrap_or(1.0)
                    .max(0.0);
                preset.emissive = Some(base.map(|c| c * intensity));
            }
            "transparent" => {
                if let Some(opacity) = number("opacity") {
                    preset.opacity = Some(opacity.clamp(0.0, 1.0));
                }
                if let Some(cutoff) = number("alpha_cutoff") {
                    preset.alpha_mode = Some(AlphaMode::Mask);
                    preset.alpha_cutoff = Some(cutoff.clamp(0.0, 1.0));
                }
            }
            "reflective" => {
                if let Some(reflectivity) = number("reflectivity") {
                    preset.metallic = Some(reflectivity.clamp(0.0, 1.0));
                }
                if let Some(roughness) = number("roughness") {
                    preset.roughness = Some(roughness.clamp(0.0, 1.0));
                }
            }
            _ => {
                if let Some(metallic) = number("metallic") {
                    preset.metallic = Some(metallic.clamp(0.0, 1.0));
                }
                if let Some(roughness) = number("roughness") {
                    preset.roughness = Some(roughness.clamp(0.0, 1.0));
                }
            }
        }
        Some(preset)
    }

    /// Blend every visual trait in `traits`
    pub fn compose(&self, traits: &[TraitDecl]) -> TraitBlend {
        let mut metallic = Average::default();
        let mut roughness = Average::default();
        let mut opacity = Average::default();
        let mut blend = TraitBlend::default();

        for preset in traits.iter().filter_map(|decl| self.resolve(decl)) {
            metallic.add(preset.metallic);
            roughness.add(preset.roughness);
            opacity.add(preset.opacity);

            if let Some(emissive) = preset.emissive {
                let current = blend.emissive.unwrap_or([0.0; 3]);
                blend.emissive = Some([
                    current[0].max(emissive[0]),
                    current[1].max(emissive[1]),
                    current[2].max(emissive[2]),
                ]);
            }
            if let Some(mode) = preset.alpha_mode {
                let stronger = blend
                    .alpha_mode
                    .is_none_or(|current| alpha_rank(mode) > alpha_rank(current));
                if stronger {
                    blend.alpha_mode = Some(mode);
                }
            }
            if preset.alpha_cutoff.is_some() {
                blend.alpha_cutoff = preset.alpha_cutoff;
            }
        }

        blend.metallic = metallic.get();
        blend.roughness = roughness.get();
        blend.opacity = opacity.get();
        blend
    }
}
