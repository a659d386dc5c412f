use image::imageops::FilterType;
use image::{GrayImage, Luma, RgbaImage};

use crate::foundation::color::luma;
use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Sharpen high-pass response (0..=255 scale) counted as an edge.
const EDGE_THRESHOLD: i32 = 48;
/// Mirrored pixels closer than this are treated as matching.
const SYMMETRY_TOLERANCE: i16 = 30;
/// Column-third luma spread below which weight counts as balanced.
const BALANCE_SPREAD: f64 = 10.0;

/// Orientation class of the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AspectClass {
    /// Width and height within 10% of each other.
    Square,
    /// Wider than tall.
    Landscape,
    /// Taller than wide.
    Portrait,
}

impl AspectClass {
    /// Classify a width/height ratio. Within 10% of 1:1 counts as square.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.1 {
            Self::Landscape
        } else if ratio < 0.9 {
            Self::Portrait
        } else {
            Self::Square
        }
    }

    /// Descriptor text for this class.
    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "square format",
            Self::Landscape => "landscape orientation",
            Self::Portrait => "portrait orientation",
        }
    }
}

/// Which column third carries the most luminance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualWeight {
    /// No column third clearly outweighs the others.
    Balanced,
    /// Left third is brightest.
    Left,
    /// Middle third is brightest.
    Center,
    /// Right third is brightest.
    Right,
}

impl VisualWeight {
    /// Descriptor text for this weight.
    pub fn label(self) -> &'static str {
        match self {
            Self::Balanced => "balanced visual weight",
            Self::Left => "left-weighted composition",
            Self::Center => "center-weighted composition",
            Self::Right => "right-weighted composition",
        }
    }
}

/// Structural measurements taken on a fixed grayscale grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositionProfile {
    /// Width over height of the source, before downsampling.
    pub aspect_ratio: f64,
    /// Orientation derived from `aspect_ratio`.
    pub aspect: AspectClass,
    /// Fraction of interior grid pixels counted as edges.
    pub edge_density: f64,
    /// Fraction of mirrored pixel pairs within the symmetry tolerance.
    pub symmetry_score: f64,
    /// Brightest column third.
    pub weight: VisualWeight,
}

impl CompositionProfile {
    /// Human-readable labels in a fixed order: aspect, complexity, symmetry, weight.
    pub fn descriptors(&self) -> Vec<String> {
        let mut out = vec![self.aspect.label().to_owned()];

        let complexity = if self.edge_density > 0.15 {
            "high visual complexity"
        } else if self.edge_density > 0.05 {
            "moderate detail"
        } else {
            "clean and simple composition"
        };
        out.push(complexity.to_owned());

        if self.symmetry_score > 0.7 {
            out.push("symmetrical layout".to_owned());
        } else if self.symmetry_score > 0.4 {
            out.push("partially symmetrical layout".to_owned());
        } else {
            out.push("asymmetrical layout".to_owned());
        }

        out.push(self.weight.label().to_owned());
        out
    }
}

/// Measure aspect, edge density, mirror symmetry and visual weight.
///
/// The image is resampled to `grid_px` squared before measuring so cost and thresholds do not
/// depend on the source resolution.
pub fn analyze_composition(img: &RgbaImage, grid_px: u32) -> AdcraftResult<CompositionProfile> {
    if grid_px == 0 {
        return Err(AdcraftError::validation("composition grid size must be > 0"));
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(AdcraftError::validation("cannot measure an empty image"));
    }

    let aspect_ratio = f64::from(img.width()) / f64::from(img.height());
    let gray = grayscale_grid(img, grid_px);

    Ok(CompositionProfile {
        aspect_ratio,
        aspect: AspectClass::from_ratio(aspect_ratio),
        edge_density: edge_density(&gray),
        symmetry_score: symmetry_score(&gray),
        weight: visual_weight(&gray),
    })
}

fn grayscale_grid(img: &RgbaImage, grid_px: u32) -> GrayImage {
    let small = image::imageops::resize(img, grid_px, grid_px, FilterType::Triangle);
    GrayImage::from_fn(grid_px, grid_px, |x, y| {
        let [r, g, b, _] = small.get_pixel(x, y).0;
        let l = luma(f64::from(r), f64::from(g), f64::from(b));
        Luma([l.round().clamp(0.0, 255.0) as u8])
    })
}

/// Fraction of interior pixels whose sharpen-kernel high-pass response exceeds the edge threshold.
///
/// The sharpen kernel is `5c - (n + s + e + w)`; subtracting the original leaves the Laplacian
/// `4c - (n + s + e + w)`, whose magnitude is the response. Grids smaller than 3x3 have no
/// interior and report 0.
pub fn edge_density(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }
    let px = |x: u32, y: u32| i32::from(gray.get_pixel(x, y).0[0]);

    let mut edges = 0u64;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let response =
                4 * px(x, y) - px(x - 1, y) - px(x + 1, y) - px(x, y - 1) - px(x, y + 1);
            if response.abs() > EDGE_THRESHOLD {
                edges += 1;
            }
        }
    }
    edges as f64 / (u64::from(w - 2) * u64::from(h - 2)) as f64
}

/// Fraction of left/right mirrored pixel pairs that match within tolerance.
///
/// A grid one pixel wide has no pairs and counts as perfectly symmetric.
pub fn symmetry_score(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    let half = w / 2;
    if half == 0 || h == 0 {
        return 1.0;
    }

    let mut matching = 0u64;
    for y in 0..h {
        for x in 0..half {
            let a = i16::from(gray.get_pixel(x, y).0[0]);
            let b = i16::from(gray.get_pixel(w - 1 - x, y).0[0]);
            if (a - b).abs() < SYMMETRY_TOLERANCE {
                matching += 1;
            }
        }
    }
    matching as f64 / (u64::from(half) * u64::from(h)) as f64
}

/// Compare mean luma of the left, center and right column thirds.
pub fn visual_weight(gray: &GrayImage) -> VisualWeight {
    let (w, h) = gray.dimensions();
    if w < 3 || h == 0 {
        return VisualWeight::Balanced;
    }

    let bounds = [0, w / 3, 2 * w / 3, w];
    let mut means = [0.0f64; 3];
    for (i, mean) in means.iter_mut().enumerate() {
        let (x0, x1) = (bounds[i], bounds[i + 1]);
        let mut sum = 0u64;
        for y in 0..h {
            for x in x0..x1 {
                sum += u64::from(gray.get_pixel(x, y).0[0]);
            }
        }
        *mean = sum as f64 / (u64::from(x1 - x0) * u64::from(h)) as f64;
    }

    let max = means.iter().copied().fold(f64::MIN, f64::max);
    let min = means.iter().copied().fold(f64::MAX, f64::min);
    if max - min < BALANCE_SPREAD {
        return VisualWeight::Balanced;
    }
    match means.iter().position(|&m| m == max) {
        Some(0) => VisualWeight::Left,
        Some(1) => VisualWeight::Center,
        _ => VisualWeight::Right,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/composition.rs"]
mod tests;
