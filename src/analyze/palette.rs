use std::collections::HashMap;

use image::RgbaImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgb8;
use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Colors reported by [`extract_dominant_colors`].
pub const MAX_PALETTE_COLORS: usize = 8;

/// Channel step used to bucket similar colors together.
const QUANT_STEP: u32 = 32;

/// One quantized color and its share of the sampled opaque pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    /// Quantized color.
    pub color: Rgb8,
    /// Share of counted pixels in `0..=100`.
    pub percentage: f64,
}

impl DominantColor {
    /// Uppercase `#RRGGBB` form of [`DominantColor::color`].
    pub fn hex(&self) -> String {
        self.color.to_hex()
    }
}

/// Round a channel to the nearest multiple of [`QUANT_STEP`], clamped to 255.
pub(crate) fn quantize_channel(c: u8) -> u8 {
    let q = (u32::from(c) + QUANT_STEP / 2) / QUANT_STEP * QUANT_STEP;
    q.min(255) as u8
}

/// Downsample to `sample_px` squared, quantize, and return the most frequent buckets.
///
/// Fully transparent pixels are skipped. Ties keep first-seen (row-major) order, so the result is
/// deterministic for identical input. An image with no opaque pixels yields an empty palette.
pub fn extract_dominant_colors(
    img: &RgbaImage,
    sample_px: u32,
) -> AdcraftResult<Vec<DominantColor>> {
    if sample_px == 0 {
        return Err(AdcraftError::validation("palette sample size must be > 0"));
    }
    if img.width() == 0 || img.height() == 0 {
        return Ok(Vec::new());
    }

    let sample = image::imageops::resize(img, sample_px, sample_px, FilterType::Triangle);

    let mut index: HashMap<Rgb8, usize> = HashMap::new();
    let mut buckets: Vec<(Rgb8, u64)> = Vec::new();
    let mut counted = 0u64;
    for px in sample.pixels() {
        let [r, g, b, a] = px.0;
        if a == 0 {
            continue;
        }
        let q = Rgb8::new(quantize_channel(r), quantize_channel(g), quantize_channel(b));
        let slot = *index.entry(q).or_insert_with(|| {
            buckets.push((q, 0));
            buckets.len() - 1
        });
        buckets[slot].1 += 1;
        counted += 1;
    }

    if counted == 0 {
        return Ok(Vec::new());
    }

    // Stable sort keeps first-seen order among equal counts.
    buckets.sort_by(|a, b| b.1.cmp(&a.1));
    buckets.truncate(MAX_PALETTE_COLORS);

    Ok(buckets
        .into_iter()
        .map(|(color, n)| DominantColor {
            color,
            percentage: n as f64 * 100.0 / counted as f64,
        })
        .collect())
}

/// Palette entries with strong chroma and enough brightness to read as vivid.
pub(crate) fn vivid_count(palette: &[DominantColor]) -> usize {
    palette
        .iter()
        .filter(|c| {
            let max = c.color.r.max(c.color.g).max(c.color.b);
            c.color.chroma_ratio() > 0.5 && max >= 128
        })
        .count()
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/palette.rs"]
mod tests;
