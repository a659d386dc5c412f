//! Adcraft is the creative rendering and style-learning core of an ad-creative pipeline.
//!
//! Three parts share one [`RenderCache`]:
//!
//! - [`StyleAnalyzer`] turns a reference image into a [`StyleAnalysis`]
//! - [`CreativeRenderer`] composes branded JPEG creatives from masked subjects
//! - [`Pipeline`] wires both to an [`ImageFetcher`], a [`BrandStore`] and an optional
//!   [`Segmenter`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod analyze;
mod assets;
mod cache;
mod foundation;
mod render;

/// JSON configuration for a [`Pipeline`].
pub mod config;
/// Orchestration of analysis, segmentation and rendering.
pub mod pipeline;

pub use crate::foundation::color::Rgb8;
pub use crate::foundation::error::{AdcraftError, AdcraftResult};
pub use crate::foundation::stats::ChannelStats;

pub use crate::assets::codec::{decode_rgba, encode_jpeg};
pub use crate::assets::fetch::{FsFetcher, ImageFetcher, MemoryFetcher};

pub use crate::cache::bytes::CachedBytes;
pub use crate::cache::entry::CacheEntry;
pub use crate::cache::key::{CacheKey, CacheKind};
pub use crate::cache::stats::CacheStats;
pub use crate::cache::store::{CacheOpts, RenderCache};

pub use crate::analyze::analyzer::{AnalyzerOpts, StyleAnalyzer};
pub use crate::analyze::composition::{
    AspectClass, CompositionProfile, VisualWeight, analyze_composition,
};
pub use crate::analyze::descriptors::{MAX_CONFIDENCE, confidence_score};
pub use crate::analyze::enhance::{Enhancement, StyleEnhancer, StyleSignals};
pub use crate::analyze::fallback::{FALLBACK_MAX_CONFIDENCE, metadata_fallback};
pub use crate::analyze::palette::{DominantColor, extract_dominant_colors};
pub use crate::analyze::profile::{AnalysisSource, ReferenceMetadata, StyleAnalysis, StyleMetrics};
pub use crate::analyze::tone::ToneStats;

pub use crate::render::brand::{BrandProfile, BrandStore, InMemoryBrandStore};
pub use crate::render::fingerprint::render_cache_key;
pub use crate::render::layout::{PixelRect, subject_rect, wrap_caption};
pub use crate::render::model::{
    BrandStyle, Format, Layout, RenderRequest, RenderResult, RenderStats, SubjectRef,
};
pub use crate::render::output::{OutputStore, StoredRender};
pub use crate::render::renderer::{CreativeRenderer, RenderOpts};
pub use crate::render::segment::{DEFAULT_SEGMENTATION_MODEL, Segmenter};

pub use crate::config::PipelineConfig;
pub use crate::pipeline::{CreativeSpec, Pipeline};
