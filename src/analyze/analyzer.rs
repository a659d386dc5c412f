use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::analyze::composition::analyze_composition;
use crate::analyze::descriptors::{
    confidence_score, key_elements, mood_descriptors, typography_suggestions,
    visual_style_descriptors,
};
use crate::analyze::enhance::{StyleEnhancer, StyleSignals, apply_enhancement, enhance_with_timeout};
use crate::analyze::fallback::metadata_fallback;
use crate::analyze::palette::extract_dominant_colors;
use crate::analyze::profile::{AnalysisSource, ReferenceMetadata, StyleAnalysis, StyleMetrics};
use crate::analyze::tone::ToneStats;
use crate::assets::codec::decode_rgba;
use crate::assets::fetch::ImageFetcher;
use crate::foundation::error::{AdcraftError, AdcraftResult};
use crate::foundation::stats::ChannelStats;

/// Sampling sizes and enhancer deadline for a [`StyleAnalyzer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOpts {
    /// Square grid the palette is extracted from.
    pub palette_sample_px: u32,
    /// Square grid edge density and symmetry are measured on.
    pub composition_sample_px: u32,
    /// Hard deadline for the optional enhancer.
    pub enhancer_timeout_ms: u64,
}

impl Default for AnalyzerOpts {
    fn default() -> Self {
        Self {
            palette_sample_px: 150,
            composition_sample_px: 200,
            enhancer_timeout_ms: 5000,
        }
    }
}

impl AnalyzerOpts {
    /// Reject zero sample sizes and a zero enhancer timeout.
    pub fn validate(&self) -> AdcraftResult<()> {
        if self.palette_sample_px == 0 {
            return Err(AdcraftError::validation("analysis palette_sample_px must be > 0"));
        }
        if self.composition_sample_px == 0 {
            return Err(AdcraftError::validation(
                "analysis composition_sample_px must be > 0",
            ));
        }
        if self.enhancer_timeout_ms == 0 {
            return Err(AdcraftError::validation(
                "analysis enhancer_timeout_ms must be > 0",
            ));
        }
        Ok(())
    }
}

/// Derives a [`StyleAnalysis`] from reference pixels, falling back to metadata heuristics.
///
/// Pure apart from the optional enhancer call; caching results is the caller's job.
pub struct StyleAnalyzer {
    opts: AnalyzerOpts,
    enhancer: Option<Arc<dyn StyleEnhancer>>,
}

impl std::fmt::Debug for StyleAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleAnalyzer")
            .field("opts", &self.opts)
            .field("enhancer", &self.enhancer.is_some())
            .finish()
    }
}

impl StyleAnalyzer {
    /// Build an analyzer without an enhancer. Fails on invalid `opts`.
    pub fn new(opts: AnalyzerOpts) -> AdcraftResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            enhancer: None,
        })
    }

    /// Attach an external enhancer, consulted after every pixel analysis.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn StyleEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Options this analyzer was built with.
    pub fn opts(&self) -> &AnalyzerOpts {
        &self.opts
    }

    /// Analyze encoded image bytes.
    ///
    /// Fails only when `bytes` cannot be decoded. Any later computation problem degrades to
    /// [`metadata_fallback`]; enhancer problems keep the numeric result.
    #[tracing::instrument(skip(self, bytes, meta), fields(bytes = bytes.len()))]
    pub fn analyze(&self, bytes: &[u8], meta: &ReferenceMetadata) -> AdcraftResult<StyleAnalysis> {
        let img = decode_rgba(bytes)?;
        Ok(self.analyze_image(&img, meta))
    }

    /// Analyze an already decoded image. Never fails.
    pub fn analyze_image(&self, img: &RgbaImage, meta: &ReferenceMetadata) -> StyleAnalysis {
        let mut analysis = match self.numeric_analysis(img) {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(error = %e, "pixel analysis failed; using metadata heuristics");
                return metadata_fallback(meta);
            }
        };

        if let Some(enhancer) = &self.enhancer {
            let signals = signals_for(&analysis, meta);
            let timeout = Duration::from_millis(self.opts.enhancer_timeout_ms);
            if let Some(enhancement) = enhance_with_timeout(enhancer, signals, timeout) {
                apply_enhancement(&mut analysis, enhancement);
                tracing::debug!("analysis enhanced");
            }
        }

        analysis
    }

    /// Fetch `uri` and analyze it. Fetch or decode failures fall back to metadata heuristics, so
    /// orchestration callers always receive a profile.
    #[tracing::instrument(skip(self, fetcher, meta))]
    pub fn analyze_reference(
        &self,
        fetcher: &dyn ImageFetcher,
        uri: &str,
        meta: &ReferenceMetadata,
    ) -> StyleAnalysis {
        match fetcher.fetch(uri).and_then(|bytes| self.analyze(&bytes, meta)) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(uri, error = %e, "reference unavailable; using metadata heuristics");
                metadata_fallback(meta)
            }
        }
    }

    /// The deterministic pixel path without enhancement.
    pub fn numeric_analysis(&self, img: &RgbaImage) -> AdcraftResult<StyleAnalysis> {
        let palette = extract_dominant_colors(img, self.opts.palette_sample_px)?;
        let stats = ChannelStats::from_rgba(img.as_raw());
        let tone = ToneStats::from_channel_stats(&stats);
        if !tone.is_finite() {
            return Err(AdcraftError::validation("tone statistics are not finite"));
        }
        let composition = analyze_composition(img, self.opts.composition_sample_px)?;

        let composition_descriptors = composition.descriptors();
        let visual_style = visual_style_descriptors(&tone, &palette);
        let confidence = confidence_score(
            palette.len(),
            visual_style.len(),
            composition_descriptors.len(),
            tone.brightness,
            tone.contrast,
        );

        Ok(StyleAnalysis {
            color_palette: palette.iter().map(|c| c.hex()).collect(),
            typography_suggestions: typography_suggestions(&tone, palette.len(), &composition),
            composition_descriptors,
            mood_descriptors: mood_descriptors(&tone, &stats),
            visual_style_descriptors: visual_style,
            key_elements: key_elements(&palette, &composition),
            confidence,
            source: AnalysisSource::Pixels,
            metrics: Some(StyleMetrics {
                brightness: tone.brightness,
                contrast: tone.contrast,
                saturation: tone.saturation,
                symmetry_score: composition.symmetry_score,
                edge_density: composition.edge_density,
                dominant_colors: palette,
            }),
        })
    }
}

fn signals_for(analysis: &StyleAnalysis, meta: &ReferenceMetadata) -> StyleSignals {
    let (brightness, contrast, saturation) = analysis
        .metrics
        .as_ref()
        .map(|m| (m.brightness, m.contrast, m.saturation))
        .unwrap_or_default();
    StyleSignals {
        color_palette: analysis.color_palette.clone(),
        brightness,
        contrast,
        saturation,
        composition_descriptors: analysis.composition_descriptors.clone(),
        visual_style_descriptors: analysis.visual_style_descriptors.clone(),
        metadata: meta.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/analyzer.rs"]
mod tests;
