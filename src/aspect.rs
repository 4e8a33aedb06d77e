//! Aspect ratio parsing and pixel dimension derivation.

use crate::models::{AspectPreset, Dimensions, ResolvedPreset};

/// Longest side produced for any valid ratio, before snapping.
pub const BASE_MAX: f64 = 4096.0;
pub const MIN_SIDE: u32 = 512;
pub const SNAP: f64 = 8.0;

pub const DEFAULT_WIDTH: u32 = 3840;
pub const DEFAULT_HEIGHT: u32 = 2160;
pub const DEFAULT_RATIO: &str = "16:9";

pub const PRESET_ASPECT_RATIOS: [AspectPreset; 5] = [
    AspectPreset {
        label: "Ultra HD 16:9",
        ratio: "16:9",
        hint: "Cinematic widescreen",
    },
    AspectPreset {
        label: "Portrait 9:16",
        ratio: "9:16",
        hint: "Vertical campaigns",
    },
    AspectPreset {
        label: "Classic 3:2",
        ratio: "3:2",
        hint: "Print ready",
    },
    AspectPreset {
        label: "Hero 2:1",
        ratio: "2:1",
        hint: "Billboard feel",
    },
    AspectPreset {
        label: "Square 1:1",
        ratio: "1:1",
        hint: "Social tiles",
    },
];

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            ratio: DEFAULT_RATIO.to_string(),
        }
    }
}

/// Resolves a `w:h` string into pixel dimensions.
///
/// Anything that does not parse as two positive numbers yields the 4K
/// 16:9 default instead of an error.
pub fn resolve(input: Option<&str>) -> Dimensions {
    let Some((ratio_width, ratio_height)) = input.and_then(parse_ratio) else {
        return Dimensions::default();
    };

    if !ratio_width.is_finite()
        || !ratio_height.is_finite()
        || ratio_width <= 0.0
        || ratio_height <= 0.0
    {
        return Dimensions::default();
    }

    let scale = BASE_MAX / ratio_width.max(ratio_height);

    Dimensions {
        width: snap(ratio_width * scale),
        height: snap(ratio_height * scale),
        ratio: format!("{}:{}", ratio_width, ratio_height),
    }
}

/// Every preset with its resolved pixel size.
pub fn resolved_presets() -> Vec<ResolvedPreset> {
    PRESET_ASPECT_RATIOS
        .iter()
        .map(|preset| {
            let dims = resolve(Some(preset.ratio));
            ResolvedPreset {
                label: preset.label.to_string(),
                ratio: preset.ratio.to_string(),
                hint: preset.hint.to_string(),
                width: dims.width,
                height: dims.height,
            }
        })
        .collect()
}

/// True when `input` (after trimming) has the `w:h` shape, each side being
/// digits with an optional fractional part.
pub fn is_valid_ratio(input: &str) -> bool {
    parse_ratio(input).is_some()
}

fn parse_ratio(input: &str) -> Option<(f64, f64)> {
    let (width, height) = input.trim().split_once(':')?;
    Some((parse_component(width)?, parse_component(height)?))
}

fn parse_component(part: &str) -> Option<f64> {
    let (whole, fraction) = match part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (part, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return None;
    }

    part.parse().ok()
}

fn snap(value: f64) -> u32 {
    let snapped = ((value / SNAP).round() * SNAP) as u32;
    snapped.max(MIN_SIDE)
}
