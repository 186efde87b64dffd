//! Named material presets with PBR parameters
//!
//! Maps semantic descriptors such as `metal.polished` or `glass.frosted` to
//! factor bundles. Unknown variants of a known category fall back to that
//! category's generic preset.

use scenepack_shared::AlphaMode;

use super::MaterialFactors;

/// Material preset with PBR parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialPreset {
    /// Base RGB color (0-255)
    pub base_color: [u8; 3],
    /// Metallic factor (0.0 = dielectric, 1.0 = metal)
    pub metallic: f32,
    /// Roughness factor (0.0 = mirror, 1.0 = rough)
    pub roughness: f32,
    /// Emission strength applied to the base color (0.0 = none)
    pub emission: f32,
    /// Alpha; anything below 1.0 switches the material to blending
    pub opacity: f32,
}

impl Default for MaterialPreset {
    fn default() -> Self {
        Self::new([128, 128, 128], 0.0, 0.5)
    }
}

impl MaterialPreset {
    const fn new(base_color: [u8; 3], metallic: f32, roughness: f32) -> Self {
        Self {
            base_color,
            metallic,
            roughness,
            emission: 0.0,
            opacity: 1.0,
        }
    }

    const fn glowing(self, emission: f32) -> Self {
        Self { emission, ..self }
    }

    const fn translucent(self, opacity: f32) -> Self {
        Self { opacity, ..self }
    }

    /// Look up a preset by descriptor (e.g., "metal.polished")
    pub fn lookup(descriptor: &str) -> Option<Self> {
        let descriptor = descriptor.trim().to_ascii_lowercase();
        let (category, variant) = descriptor
            .split_once('.')
            .unwrap_or((descriptor.as_str(), ""));

        match category {
            "metal" => Some(Self::metal(variant)),
            "wood" => Some(Self::wood(variant)),
            "stone" => Some(Self::stone(variant)),
            "plastic" => Some(Self::plastic(variant)),
            "glass" => Some(Self::glass(variant)),
            "fabric" => Some(Self::fabric(variant)),
            "rubber" => Some(Self::new([40, 40, 40], 0.0, 0.9)),
            "ceramic" => Some(Self::ceramic(variant)),
            "emissive" | "neon" => Some(Self::emissive(variant)),
            _ => None,
        }
    }

    pub fn metal(variant: &str) -> Self {
        match variant {
            "polished" => Self::new([200, 200, 205], 1.0, 0.1),
            "brushed" => Self::new([180, 180, 185], 1.0, 0.35),
            "chrome" => Self::new([220, 220, 225], 1.0, 0.05),
            "rusted" => Self::new([140, 80, 50], 0.3, 0.8),
            "gold" => Self::new([255, 200, 100], 1.0, 0.2),
            "copper" => Self::new([200, 120, 80], 1.0, 0.3),
            _ => Self::new([160, 160, 165], 1.0, 0.4),
        }
    }

    pub fn wood(variant: &str) -> Self {
        match variant {
            "polished" => Self::new([150, 95, 55], 0.0, 0.3),
            "rough" => Self::new([120, 80, 50], 0.0, 0.85),
            "weathered" => Self::new([130, 120, 105], 0.0, 0.9),
            "painted" => Self::new([200, 200, 195], 0.0, 0.5),
            _ => Self::new([140, 90, 55], 0.0, 0.7),
        }
    }

    pub fn stone(variant: &str) -> Self {
        match variant {
            "marble" => Self::new([235, 232, 225], 0.0, 0.2),
            "granite" => Self::new([110, 105, 100], 0.0, 0.6),
            "rough" => Self::new([120, 115, 110], 0.0, 0.95),
            _ => Self::new([130, 128, 125], 0.0, 0.8),
        }
    }

    pub fn plastic(variant: &str) -> Self {
        match variant {
            "glossy" => Self::new([230, 230, 230], 0.0, 0.15),
            "matte" => Self::new([220, 220, 220], 0.0, 0.75),
            _ => Self::new([225, 225, 225], 0.0, 0.4),
        }
    }

    pub fn glass(variant: &str) -> Self {
        match variant {
            "frosted" => Self::new([235, 240, 245], 0.0, 0.6).translucent(0.6),
            "tinted" => Self::new([120, 170, 190], 0.0, 0.05).translucent(0.4),
            _ => Self::new([245, 250, 255], 0.0, 0.05).translucent(0.25),
        }
    }

    pub fn fabric(variant: &str) -> Self {
        match variant {
            "silk" => Self::new([230, 220, 235], 0.0, 0.35),
            "wool" => Self::new([200, 190, 170], 0.0, 1.0),
            "denim" => Self::new([60, 80, 120], 0.0, 0.9),
            _ => Self::new([180, 170, 160], 0.0, 0.85),
        }
    }

    pub fn ceramic(variant: &str) -> Self {
        match variant {
            "glazed" => Self::new([240, 240, 235], 0.0, 0.1),
            _ => Self::new([225, 215, 200], 0.0, 0.5),
        }
    }

    pub fn emissive(variant: &str) -> Self {
        match variant {
            "red" => Self::new([255, 40, 40], 0.0, 0.5).glowing(2.0),
            "blue" => Self::new([40, 120, 255], 0.0, 0.5).glowing(2.0),
            "green" => Self::new([40, 255, 120], 0.0, 0.5).glowing(2.0),
            _ => Self::new([255, 255, 255], 0.0, 0.5).glowing(1.0),
        }
    }

    /// Overwrite the matching fields of `factors`
    pub fn apply(&self, factors: &mut MaterialFactors) {
        let rgb = self.base_color.map(|c| c as f32 / 255.0);
        factors.base_color = [rgb[0], rgb[1], rgb[2], self.opacity];
        factors.metallic = self.metallic;
        factors.roughness = self.roughness;
        if self.emission > 0.0 {
            factors.emissive = rgb.map(|c| c * self.emission);
        }
        if self.opacity < 1.0 {
            factors.alpha_mode = AlphaMode::Blend;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_lookup() {
        let mat = MaterialPreset::lookup("metal.polished").unwrap();
        assert!(mat.metallic > 0.9);
        assert!(mat.roughness < 0.2);

        let mat = MaterialPreset::lookup("Wood.Weathered").unwrap();
        assert!(mat.metallic < 0.1);
        assert!(mat.roughness > 0.5);
    }

    #[test]
    fn test_material_lookup_invalid() {
        assert!(MaterialPreset::lookup("invalid.material").is_none());
        assert!(MaterialPreset::lookup("").is_none());
    }

    #[test]
    fn test_unknown_variant_falls_back_to_category() {
        assert_eq!(
            MaterialPreset::lookup("metal.unobtainium"),
            Some(MaterialPreset::metal(""))
        );
        assert_eq!(MaterialPreset::lookup("rubber"), MaterialPreset::lookup("rubber.tire"));
    }

    #[test]
    fn test_glass_blends() {
        let mut factors = MaterialFactors::default();
        MaterialPreset::lookup("glass").unwrap().apply(&mut factors);
        assert_eq!(factors.alpha_mode, AlphaMode::Blend);
        assert!(factors.base_color[3] < 1.0);
    }

    #[test]
    fn test_neon_emits() {
        let mut factors = MaterialFactors::default();
        MaterialPreset::lookup("neon.blue").unwrap().apply(&mut factors);
        assert!(factors.emissive[2] > 1.0);
        assert_eq!(factors.alpha_mode, AlphaMode::Opaque);
    }
}
