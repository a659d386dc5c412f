use serde::{Deserialize, Serialize};

use crate::analyze::palette::DominantColor;

/// Text describing a reference creative, supplied alongside its image.
///
/// Drives the heuristic fallback when pixel analysis is unavailable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceMetadata {
    /// Headline or title of the reference.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Hashtags or labels.
    pub tags: Vec<String>,
    /// Publishing platform the reference came from (`instagram`, `tiktok`, ...).
    pub platform: Option<String>,
}

/// Where a [`StyleAnalysis`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Pixel statistics of the decoded reference image.
    Pixels,
    /// Keyword heuristics over [`ReferenceMetadata`] only.
    Metadata,
}

/// Raw numeric signals behind a pixel-derived analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleMetrics {
    /// Perceptual brightness in `[0, 1]`.
    pub brightness: f64,
    /// Mean per-channel standard deviation over 255.
    pub contrast: f64,
    /// Spread of the channel means relative to the brightest mean.
    pub saturation: f64,
    /// Left/right mirror agreement in `[0, 1]`.
    pub symmetry_score: f64,
    /// Fraction of pixels with a strong sharpen response.
    pub edge_density: f64,
    /// Palette with per-color pixel shares.
    pub dominant_colors: Vec<DominantColor>,
}

/// Quantitative style profile of a reference creative.
///
/// Immutable once produced and safe to cache indefinitely keyed by image identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAnalysis {
    /// Hex colors in dominance order.
    pub color_palette: Vec<String>,
    /// Suggested type treatments.
    pub typography_suggestions: Vec<String>,
    /// Aspect, complexity, symmetry and visual-weight labels.
    pub composition_descriptors: Vec<String>,
    /// Emotional tone labels.
    pub mood_descriptors: Vec<String>,
    /// Overall look labels (`bright and airy`, `minimalist`, ...).
    pub visual_style_descriptors: Vec<String>,
    /// Notable elements worth carrying into generated creatives.
    pub key_elements: Vec<String>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Pixel analysis or metadata fallback.
    pub source: AnalysisSource,
    /// Numeric signals; absent for metadata fallbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<StyleMetrics>,
}

impl StyleAnalysis {
    /// `true` when this profile came from the metadata heuristic rather than pixels.
    pub fn is_fallback(&self) -> bool {
        self.source == AnalysisSource::Metadata
    }
}
