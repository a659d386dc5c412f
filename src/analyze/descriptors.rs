//! Threshold rules that turn numeric signals into style language.

use crate::analyze::composition::CompositionProfile;
use crate::analyze::palette::{DominantColor, vivid_count};
use crate::analyze::tone::ToneStats;
use crate::foundation::stats::ChannelStats;

/// Upper bound for [`confidence_score`].
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Channel-mean gap that tips an image warm (red-heavy) or cool (blue-heavy).
const TEMPERATURE_GAP: f64 = 15.0;

/// Overall look labels from tone and palette size.
pub fn visual_style_descriptors(tone: &ToneStats, palette: &[DominantColor]) -> Vec<String> {
    let mut out = Vec::new();

    if tone.brightness > 0.7 {
        out.push("bright and airy");
    } else if tone.brightness < 0.3 {
        out.push("dark and moody");
    }

    if !palette.is_empty() && palette.len() <= 3 {
        out.push("minimalist");
    } else if palette.len() >= 6 {
        out.push("rich palette");
    }

    if tone.saturation > 0.7 && vivid_count(palette) >= 3 {
        out.push("vibrant and bold");
    } else if tone.saturation < 0.15 {
        out.push("muted and understated");
    }

    if tone.contrast > 0.3 {
        out.push("high contrast");
    } else if tone.contrast < 0.1 {
        out.push("soft and low-contrast");
    }

    out.into_iter().map(str::to_owned).collect()
}

/// Emotional tone labels: temperature, energy and, for strong contrast, `confident`.
pub fn mood_descriptors(tone: &ToneStats, stats: &ChannelStats) -> Vec<String> {
    let mut out = Vec::new();

    let [r, _, b] = stats.mean;
    if r - b > TEMPERATURE_GAP {
        out.push("warm");
    } else if b - r > TEMPERATURE_GAP {
        out.push("cool");
    }

    let vivid = tone.saturation > 0.5;
    let energy = match (tone.brightness, vivid) {
        (l, true) if l > 0.6 => "energetic",
        (l, false) if l > 0.6 => "calm",
        (l, true) if l < 0.35 => "dramatic",
        (l, false) if l < 0.35 => "mysterious",
        _ => "balanced",
    };
    out.push(energy);

    if tone.contrast > 0.3 {
        out.push("confident");
    }

    out.into_iter().map(str::to_owned).collect()
}

/// Type treatments from contrast, palette size and symmetry.
pub fn typography_suggestions(
    tone: &ToneStats,
    palette_len: usize,
    composition: &CompositionProfile,
) -> Vec<String> {
    let mut out = Vec::new();

    out.push(if tone.contrast > 0.3 {
        "bold sans-serif headlines"
    } else {
        "light sans-serif headlines"
    });

    if palette_len <= 3 {
        out.push("clean geometric type with generous letter spacing");
    }

    if tone.brightness < 0.3 {
        out.push("light type on dark backgrounds");
    } else if tone.brightness > 0.7 {
        out.push("dark, high-legibility type on light backgrounds");
    }

    out.push(if composition.symmetry_score > 0.7 {
        "centered text alignment"
    } else {
        "left-aligned text blocks"
    });

    out.into_iter().map(str::to_owned).collect()
}

/// The top three palette colors with their share, then the focal weight.
pub fn key_elements(palette: &[DominantColor], composition: &CompositionProfile) -> Vec<String> {
    let mut out: Vec<String> = palette
        .iter()
        .take(3)
        .map(|c| format!("{} ({:.1}% of frame)", c.hex(), c.percentage))
        .collect();
    out.push(format!("focal weight: {}", composition.weight.label()));
    out
}

/// Confidence of a pixel-derived analysis.
///
/// Starts at 0.5 and adds 0.15 for a palette of 3 to 8 colors, 0.1 for at least two style
/// descriptors, 0.1 for at least three composition descriptors, 0.05 for mid-range brightness
/// and 0.05 for contrast above 0.3, capped at [`MAX_CONFIDENCE`].
pub fn confidence_score(
    palette_len: usize,
    style_len: usize,
    composition_len: usize,
    brightness: f64,
    contrast: f64,
) -> f64 {
    let mut c = 0.5;
    if (3..=8).contains(&palette_len) {
        c += 0.15;
    }
    if style_len >= 2 {
        c += 0.1;
    }
    if composition_len >= 3 {
        c += 0.1;
    }
    if brightness > 0.2 && brightness < 0.8 {
        c += 0.05;
    }
    if contrast > 0.3 {
        c += 0.05;
    }
    f64::min(c, MAX_CONFIDENCE)
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/descriptors.rs"]
mod tests;
