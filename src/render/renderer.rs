use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use image::imageops::FilterType;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::assets::codec::{decode_rgba, premultiply_rgba8_in_place};
use crate::assets::fetch::ImageFetcher;
use crate::cache::key::CacheKey;
use crate::cache::store::RenderCache;
use crate::foundation::color::Rgb8;
use crate::foundation::error::{AdcraftError, AdcraftResult};
use crate::render::composite::Canvas;
use crate::render::fingerprint::render_cache_key;
use crate::render::layout::{ACCENT_BAR_PX, CaptionLayout, PixelRect, fit_contain, subject_rect};
use crate::render::model::{RenderRequest, RenderResult, RenderStats, SubjectRef};
use crate::render::output::OutputStore;
use crate::render::overlay::{CaptionBlock, FontBook, overlay_svg, rasterize_overlay};

/// How far the brand primary color is mixed toward white for the background.
pub const BACKGROUND_LIGHTEN: f64 = 0.85;

/// Output location, thumbnail bound, result TTL and text settings for a [`CreativeRenderer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Directory rendered JPEGs are written to.
    pub output_dir: PathBuf,
    /// Longer-side bound for thumbnails.
    pub thumbnail_max_px: u32,
    /// How long a finished render stays in the render cache.
    pub result_ttl_secs: u64,
    /// Extra font files for captions, loaded on top of system fonts.
    pub fonts_dir: Option<PathBuf>,
    /// Load the host's system fonts. Without any fonts captions are skipped.
    pub load_system_fonts: bool,
    /// Attribution drawn when a request asks for a watermark.
    pub watermark_text: String,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("renders"),
            thumbnail_max_px: 400,
            result_ttl_secs: 24 * 60 * 60,
            fonts_dir: None,
            load_system_fonts: true,
            watermark_text: "Made with Adcraft".to_owned(),
        }
    }
}

impl RenderOpts {
    /// Reject a zero thumbnail bound and a zero result TTL.
    pub fn validate(&self) -> AdcraftResult<()> {
        if self.thumbnail_max_px == 0 {
            return Err(AdcraftError::validation("render thumbnail_max_px must be > 0"));
        }
        if self.result_ttl_secs == 0 {
            return Err(AdcraftError::validation("render result_ttl_secs must be > 0"));
        }
        Ok(())
    }

    /// Result TTL as a [`Duration`].
    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }
}

/// Composes branded creatives from masked subjects and caches finished renders.
pub struct CreativeRenderer {
    opts: RenderOpts,
    cache: Arc<RenderCache>,
    fetcher: Arc<dyn ImageFetcher>,
    output: OutputStore,
    fonts: FontBook,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    stats: Mutex<RenderStats>,
}

impl std::fmt::Debug for CreativeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreativeRenderer")
            .field("opts", &self.opts)
            .field("font_faces", &self.fonts.face_count())
            .field("stats", &self.stats())
            .finish()
    }
}

impl CreativeRenderer {
    /// Validate `opts`, create the output directory and load fonts.
    pub fn new(
        opts: RenderOpts,
        cache: Arc<RenderCache>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> AdcraftResult<Self> {
        opts.validate()?;
        let output = OutputStore::open(&opts.output_dir, opts.thumbnail_max_px)?;
        let fonts = if opts.load_system_fonts {
            FontBook::system(opts.fonts_dir.as_deref())
        } else {
            FontBook::empty()
        };
        Ok(Self {
            opts,
            cache,
            fetcher,
            output,
            fonts,
            in_flight: Mutex::new(HashMap::new()),
            stats: Mutex::new(RenderStats::default()),
        })
    }

    /// Options this renderer was built with.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Where finished creatives are written.
    pub fn output(&self) -> &OutputStore {
        &self.output
    }

    /// Snapshot of the render counters.
    pub fn stats(&self) -> RenderStats {
        *self.stats.lock()
    }

    /// Render `subject` (resolved through the fetcher) for `req`.
    ///
    /// A cached result is returned without fetching the subject.
    #[tracing::instrument(skip(self, req), fields(format = req.format.as_str(), layout = req.layout.as_str()))]
    pub fn render(&self, subject: &SubjectRef, req: &RenderRequest) -> AdcraftResult<RenderResult> {
        self.render_keyed(subject.as_str(), req, || {
            self.fetcher.fetch(subject.as_str()).map(Cow::Owned)
        })
    }

    /// Render already-loaded subject bytes identified by `subject_id`.
    pub fn render_bytes(
        &self,
        subject_id: &str,
        subject: &[u8],
        req: &RenderRequest,
    ) -> AdcraftResult<RenderResult> {
        self.render_keyed(subject_id, req, || Ok(Cow::Borrowed(subject)))
    }

    fn render_keyed<'a, F>(
        &self,
        subject_id: &str,
        req: &RenderRequest,
        load: F,
    ) -> AdcraftResult<RenderResult>
    where
        F: FnOnce() -> AdcraftResult<Cow<'a, [u8]>>,
    {
        req.validate()?;
        let key = render_cache_key(subject_id, req);
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        // Concurrent identical requests collapse into one render; late arrivals find it cached.
        let gate = self.gate_for(&key);
        let result = {
            let _held = gate.lock();
            if let Some(hit) = self.cached(&key) {
                Ok(hit)
            } else {
                let rendered = load().and_then(|bytes| self.render_uncached(&bytes, req));
                if let Ok(r) = &rendered {
                    self.cache.set(&key, r, Some(self.opts.result_ttl()));
                }
                rendered
            }
        };
        self.release_gate(&key, gate);

        if result.is_err() {
            self.stats.lock().failures += 1;
        }
        result
    }

    fn cached(&self, key: &CacheKey) -> Option<RenderResult> {
        let hit = self.cache.get::<RenderResult>(key)?;
        if !std::path::Path::new(&hit.image_ref).is_file() {
            tracing::warn!(key = %key, image = %hit.image_ref, "cached render lost its output file; re-rendering");
            self.cache.delete(key);
            return None;
        }
        self.stats.lock().cache_hits += 1;
        tracing::debug!(key = %key, render_id = %hit.render_id, "render served from cache");
        Some(hit)
    }

    fn gate_for(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut map = self.in_flight.lock();
        Arc::clone(map.entry(key.as_str().to_owned()).or_default())
    }

    fn release_gate(&self, key: &CacheKey, gate: Arc<Mutex<()>>) {
        let mut map = self.in_flight.lock();
        drop(gate);
        // Clones are only taken and dropped under the map lock, so a count of one means no other
        // caller is waiting on this gate.
        if map
            .get(key.as_str())
            .is_some_and(|g| Arc::strong_count(g) == 1)
        {
            map.remove(key.as_str());
        }
    }

    fn render_uncached(&self, subject: &[u8], req: &RenderRequest) -> AdcraftResult<RenderResult> {
        let started = Instant::now();
        let img = self.compose(subject, req)?;
        let stored = self.output.persist(&img, req.quality)?;

        self.stats.lock().renders += 1;
        tracing::info!(
            render_id = %stored.render_id,
            width = img.width(),
            height = img.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render complete"
        );

        Ok(RenderResult {
            render_id: stored.render_id,
            image_ref: stored.image_path.to_string_lossy().into_owned(),
            thumbnail_ref: stored.thumbnail_path.to_string_lossy().into_owned(),
            width: img.width(),
            height: img.height(),
        })
    }

    /// Compose the creative without touching the cache or the output directory.
    ///
    /// Deterministic: identical subject bytes and request produce identical pixels.
    pub fn compose(&self, subject: &[u8], req: &RenderRequest) -> AdcraftResult<RgbaImage> {
        let (width, height) = req.format.dimensions();
        let style = &req.brand_style;

        let subject = decode_rgba(subject)
            .map_err(|e| AdcraftError::render(format!("subject image: {e}")))?;

        let mut canvas = Canvas::new(width, height, style.primary_color.lighten(BACKGROUND_LIGHTEN))?;

        let fit = fit_contain(
            subject.width(),
            subject.height(),
            subject_rect(req.format, req.layout),
        );
        let mut scaled = if (fit.w, fit.h) == subject.dimensions() {
            subject
        } else {
            image::imageops::resize(&subject, fit.w, fit.h, FilterType::CatmullRom)
        };
        premultiply_rgba8_in_place(&mut scaled);
        canvas.draw_over(scaled.as_raw(), fit.w, fit.h, fit.x, fit.y, 1.0)?;

        let caption = CaptionLayout::new(req.format, req.layout);
        let lines = caption.lines(&req.caption);
        let baselines = caption.baselines(lines.len(), height);
        let block = CaptionBlock {
            lines: &lines,
            baselines: &baselines,
            font_px: caption.font_px,
            font_family: &style.heading_font,
            fill: Rgb8::WHITE,
        };
        let watermark = req.watermark.then_some(self.opts.watermark_text.as_str());
        if let Some(svg) = overlay_svg(width, height, Some(&block), watermark) {
            let layer = rasterize_overlay(&svg, width, height, &self.fonts)?;
            canvas.draw_over(&layer, width, height, 0, 0, 1.0)?;
        }

        let bar = |y| PixelRect {
            x: 0,
            y,
            w: width,
            h: ACCENT_BAR_PX,
        };
        canvas.fill_rect(bar(0), style.primary_color);
        canvas.fill_rect(bar(height - ACCENT_BAR_PX), style.primary_color);

        canvas.to_rgba_image()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
