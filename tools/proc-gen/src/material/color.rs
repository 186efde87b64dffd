//! Color parsing for material properties

use scenepack_shared::PropertyValue;

/// Parse a color property into linear-agnostic RGBA floats in `[0, 1]`
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, a handful of CSS color names,
/// and numeric arrays of 3 or 4 components. Arrays whose components exceed
/// 1.0 are treated as 0-255 values.
pub fn parse_color(value: &PropertyValue) -> Option<[f32; 4]> {
    match value {
        PropertyValue::String(text) => parse_color_str(text),
        PropertyValue::Array(_) => {
            let floats = value.as_floats()?;
            let mut rgba = match floats.as_slice() {
                [r, g, b] => [*r, *g, *b, 1.0],
                [r, g, b, a] => [*r, *g, *b, *a],
                _ => return None,
            };
            if rgba[..3].iter().any(|c| *c > 1.0) {
                for c in &mut rgba[..3] {
                    *c /= 255.0;
                }
            }
            Some(rgba.map(|c| c.clamp(0.0, 1.0)))
        }
        _ => None,
    }
}

/// Parse a hex or named color string
pub fn parse_color_str(text: &str) -> Option<[f32; 4]> {
    let text = text.trim();
    match text.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => named_color(&text.to_ascii_lowercase()),
    }
}

fn parse_hex(hex: &str) -> Option<[f32; 4]> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let bytes: [u8; 4] = match hex.len() {
        3 => [nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17, 255],
        6 => [byte(0)?, byte(2)?, byte(4)?, 255],
        8 => [byte(0)?, byte(2)?, byte(4)?, byte(6)?],
        _ => return None,
    };
    Some(bytes.map(|b| b as f32 / 255.0))
}

fn named_color(name: &str) -> Option<[f32; 4]> {
    let rgb: [u8; 3] = match name {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" => [0, 255, 255],
        "magenta" => [255, 0, 255],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "pink" => [255, 192, 203],
        "gray" | "grey" => [128, 128, 128],
        "brown" => [165, 42, 42],
        "gold" => [255, 215, 0],
        "silver" => [192, 192, 192],
        _ => return None,
    };
    Some([
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        1.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color_str("#ff0000"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_color_str("#0f0"), Some([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(parse_color_str("#00000000"), Some([0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_invalid_hex() {
        assert_eq!(parse_color_str("#ff00"), None);
        assert_eq!(parse_color_str("#gg0000"), None);
        assert_eq!(parse_color_str("#ééé"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_color_str("Red"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_color_str("chartreuse-ish"), None);
    }

    #[test]
    fn test_arrays() {
        let unit = PropertyValue::from([0.5, 0.25, 1.0]);
        assert_eq!(parse_color(&unit), Some([0.5, 0.25, 1.0, 1.0]));

        let bytes = PropertyValue::from([255.0, 0.0, 0.0]);
        assert_eq!(parse_color(&bytes), Some([1.0, 0.0, 0.0, 1.0]));

        assert_eq!(parse_color(&PropertyValue::Number(1.0)), None);
    }
}
