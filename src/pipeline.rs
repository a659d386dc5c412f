use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analyze::analyzer::StyleAnalyzer;
use crate::analyze::enhance::StyleEnhancer;
use crate::analyze::profile::{ReferenceMetadata, StyleAnalysis};
use crate::assets::fetch::{FsFetcher, ImageFetcher};
use crate::cache::bytes::CachedBytes;
use crate::cache::key::{CacheKey, CacheKind};
use crate::cache::store::RenderCache;
use crate::config::PipelineConfig;
use crate::foundation::error::{AdcraftError, AdcraftResult};
use crate::render::brand::{BrandStore, InMemoryBrandStore};
use crate::render::model::{Format, Layout, RenderRequest, RenderResult, SubjectRef};
use crate::render::renderer::CreativeRenderer;
use crate::render::segment::{DEFAULT_SEGMENTATION_MODEL, Segmenter};

/// What to render for a workspace; the brand style comes from the workspace profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeSpec {
    /// Output frame format.
    #[serde(default)]
    pub format: Format,
    /// Subject and caption placement.
    #[serde(default)]
    pub layout: Layout,
    /// Caption text, possibly empty.
    #[serde(default)]
    pub caption: String,
    /// Draw the attribution watermark.
    #[serde(default)]
    pub watermark: bool,
    /// JPEG quality in `1..=100`.
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_quality() -> u8 {
    RenderRequest::default().quality
}

impl Default for CreativeSpec {
    fn default() -> Self {
        Self {
            format: Format::default(),
            layout: Layout::default(),
            caption: String::new(),
            watermark: false,
            quality: default_quality(),
        }
    }
}

/// Wires the cache, analyzer and renderer behind one shared [`RenderCache`].
///
/// Analysis profiles are cached under [`CacheKind::Style`], segmented subjects under
/// [`CacheKind::Mask`] and finished renders under [`CacheKind::Render`].
pub struct Pipeline {
    config: PipelineConfig,
    cache: Arc<RenderCache>,
    fetcher: Arc<dyn ImageFetcher>,
    brands: Arc<dyn BrandStore>,
    analyzer: StyleAnalyzer,
    renderer: CreativeRenderer,
    segmenter: Option<Arc<dyn Segmenter>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("segmenter", &self.segmenter.is_some())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Build a pipeline around `fetcher` and `brands`.
    ///
    /// Validates `config` and creates the cache and output directories.
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn ImageFetcher>,
        brands: Arc<dyn BrandStore>,
    ) -> AdcraftResult<Self> {
        config.validate()?;
        let cache = Arc::new(RenderCache::new(config.cache.clone())?);
        let analyzer = StyleAnalyzer::new(config.analysis.clone())?;
        let renderer = CreativeRenderer::new(
            config.render.clone(),
            Arc::clone(&cache),
            Arc::clone(&fetcher),
        )?;
        Ok(Self {
            config,
            cache,
            fetcher,
            brands,
            analyzer,
            renderer,
            segmenter: None,
        })
    }

    /// Filesystem fetcher under `content_root` and an empty brand store.
    pub fn from_config(config: PipelineConfig) -> AdcraftResult<Self> {
        let fetcher = Arc::new(FsFetcher::new(config.content_root.clone()));
        Self::new(config, fetcher, Arc::new(InMemoryBrandStore::new()))
    }

    /// Segment sources before rendering. Without a segmenter sources render as-is.
    pub fn with_segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    /// Attach a style enhancer to the analyzer.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn StyleEnhancer>) -> Self {
        self.analyzer = self.analyzer.with_enhancer(enhancer);
        self
    }

    /// Configuration the pipeline was built from.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cache shared by analysis, segmentation and rendering.
    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    /// The style analyzer.
    pub fn analyzer(&self) -> &StyleAnalyzer {
        &self.analyzer
    }

    /// The creative renderer.
    pub fn renderer(&self) -> &CreativeRenderer {
        &self.renderer
    }

    /// Style profile for the reference at `uri`.
    ///
    /// Pixel-derived profiles are cached by `uri`; metadata fallbacks are not, so a reference that
    /// becomes reachable later gets a real analysis.
    #[tracing::instrument(skip(self, meta))]
    pub fn analyze_reference(&self, uri: &str, meta: &ReferenceMetadata) -> StyleAnalysis {
        let key = CacheKey::new(CacheKind::Style, uri);
        if let Some(hit) = self.cache.get::<StyleAnalysis>(&key) {
            return hit;
        }
        let analysis = self
            .analyzer
            .analyze_reference(self.fetcher.as_ref(), uri, meta);
        if !analysis.is_fallback() {
            self.cache.set(&key, &analysis, None);
        }
        analysis
    }

    /// Analyze several references in parallel; results keep the input order.
    pub fn analyze_references(&self, refs: &[(String, ReferenceMetadata)]) -> Vec<StyleAnalysis> {
        refs.par_iter()
            .map(|(uri, meta)| self.analyze_reference(uri, meta))
            .collect()
    }

    /// Segment `source` (when a segmenter is attached) and render it with the workspace brand.
    ///
    /// Segmentation failures fall back to the original image.
    #[tracing::instrument(skip(self, source, spec), fields(source = %source))]
    pub fn render_for_workspace(
        &self,
        workspace_id: &str,
        source: &SubjectRef,
        spec: &CreativeSpec,
    ) -> AdcraftResult<RenderResult> {
        let profile = self.brands.brand_profile(workspace_id).ok_or_else(|| {
            AdcraftError::validation(format!("unknown workspace '{workspace_id}'"))
        })?;
        let req = RenderRequest {
            format: spec.format,
            layout: spec.layout,
            caption: spec.caption.clone(),
            brand_style: profile.style,
            watermark: spec.watermark,
            quality: spec.quality,
        };
        req.validate()?;

        let original = self.fetcher.fetch(source.as_str())?;
        let model = profile
            .segmentation_model
            .as_deref()
            .unwrap_or(DEFAULT_SEGMENTATION_MODEL);
        match self.masked_subject(source.as_str(), &original, model) {
            Some(masked) => {
                let subject_id = format!("{source}#mask={model}");
                self.renderer.render_bytes(&subject_id, &masked, &req)
            }
            None => self.renderer.render_bytes(source.as_str(), &original, &req),
        }
    }

    fn masked_subject(&self, uri: &str, original: &[u8], model: &str) -> Option<Vec<u8>> {
        let segmenter = self.segmenter.as_ref()?;
        let key = CacheKey::new(CacheKind::Mask, format!("{model}:{uri}"));
        if let Some(hit) = self.cache.get::<CachedBytes>(&key) {
            return Some(hit.into_inner());
        }
        match segmenter.segment(original, model) {
            Ok(masked) => {
                let masked = CachedBytes(masked);
                self.cache.set(&key, &masked, None);
                Some(masked.into_inner())
            }
            Err(e) => {
                tracing::warn!(uri, model, error = %e, "segmentation failed; rendering original image");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
