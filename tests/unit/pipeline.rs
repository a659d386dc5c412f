use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageFormat, Rgba, RgbaImage};

use super::*;
use crate::analyze::profile::AnalysisSource;
use crate::assets::fetch::MemoryFetcher;
use crate::foundation::color::Rgb8;
use crate::render::brand::BrandProfile;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "adcraft_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    png(&RgbaImage::from_pixel(w, h, Rgba(px)))
}

struct FakeSegmenter {
    fail: bool,
    calls: AtomicUsize,
}

impl Segmenter for FakeSegmenter {
    fn segment(&self, _image: &[u8], model: &str) -> AdcraftResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(model, "isnet");
        if self.fail {
            return Err(AdcraftError::render("segmentation service down"));
        }
        Ok(solid(1, 1, [0, 0, 255, 255]))
    }
}

struct Fixture {
    dir: std::path::PathBuf,
    fetcher: Arc<MemoryFetcher>,
    pipeline: Pipeline,
}

fn fixture(name: &str) -> Fixture {
    let dir = temp_dir(name);
    let mut config = PipelineConfig::default();
    config.render.output_dir = dir.join("renders");
    config.render.load_system_fonts = false;

    let fetcher = Arc::new(MemoryFetcher::new());
    fetcher.insert("uploads/red.png", solid(1, 1, [255, 0, 0, 255]));

    let brands = Arc::new(InMemoryBrandStore::new());
    brands.insert(
        "ws-1",
        BrandProfile {
            style: crate::render::model::BrandStyle {
                primary_color: Rgb8::new(0x10, 0x20, 0x30),
                ..Default::default()
            },
            segmentation_model: Some("isnet".to_owned()),
        },
    );

    let pipeline = Pipeline::new(config, fetcher.clone(), brands).unwrap();
    Fixture {
        dir,
        fetcher,
        pipeline,
    }
}

fn center_pixel(path: &str) -> [u8; 3] {
    let img = image::open(path).unwrap().to_rgb8();
    let (w, h) = img.dimensions();
    img.get_pixel(w / 2, h / 2).0
}

#[test]
fn unknown_workspace_is_a_validation_error() {
    let fx = fixture("pipeline_unknown_ws");
    let err = fx
        .pipeline
        .render_for_workspace("nope", &SubjectRef::new("uploads/red.png"), &CreativeSpec::default())
        .unwrap_err();
    assert!(matches!(err, AdcraftError::Validation(_)));
    std::fs::remove_dir_all(&fx.dir).ok();
}

#[test]
fn renders_with_workspace_brand_without_segmenter() {
    let fx = fixture("pipeline_plain");
    let spec = CreativeSpec {
        caption: "Hi".to_owned(),
        ..CreativeSpec::default()
    };
    let source = SubjectRef::new("uploads/red.png");

    let first = fx.pipeline.render_for_workspace("ws-1", &source, &spec).unwrap();
    assert_eq!((first.width, first.height), (1080, 1080));
    let c = center_pixel(&first.image_ref);
    assert!(c[0] > 200 && c[1] < 60 && c[2] < 60, "center {c:?}");

    let again = fx.pipeline.render_for_workspace("ws-1", &source, &spec).unwrap();
    assert_eq!(again, first);
    let stats = fx.pipeline.renderer().stats();
    assert_eq!((stats.renders, stats.cache_hits), (1, 1));

    std::fs::remove_dir_all(&fx.dir).ok();
}

#[test]
fn segmented_subject_is_rendered_and_mask_is_cached() {
    let fx = fixture("pipeline_masked");
    let segmenter = Arc::new(FakeSegmenter {
        fail: false,
        calls: AtomicUsize::new(0),
    });
    let pipeline = fx.pipeline.with_segmenter(segmenter.clone());
    let source = SubjectRef::new("uploads/red.png");

    let first = pipeline
        .render_for_workspace("ws-1", &source, &CreativeSpec::default())
        .unwrap();
    let c = center_pixel(&first.image_ref);
    assert!(c[2] > 200 && c[0] < 60, "center {c:?}");

    let other = CreativeSpec {
        layout: Layout::BottomText,
        ..CreativeSpec::default()
    };
    pipeline.render_for_workspace("ws-1", &source, &other).unwrap();
    assert_eq!(segmenter.calls.load(Ordering::SeqCst), 1);
    let mask_key = CacheKey::new(CacheKind::Mask, "isnet:uploads/red.png");
    let cached = pipeline.cache().get::<CachedBytes>(&mask_key).unwrap();
    assert!(!cached.is_empty());

    std::fs::remove_dir_all(&fx.dir).ok();
}

#[test]
fn segmentation_failure_falls_back_to_original() {
    let fx = fixture("pipeline_seg_fail");
    let pipeline = fx.pipeline.with_segmenter(Arc::new(FakeSegmenter {
        fail: true,
        calls: AtomicUsize::new(0),
    }));

    let r = pipeline
        .render_for_workspace("ws-1", &SubjectRef::new("uploads/red.png"), &CreativeSpec::default())
        .unwrap();
    let c = center_pixel(&r.image_ref);
    assert!(c[0] > 200 && c[2] < 60, "center {c:?}");
    assert!(!pipeline
        .cache()
        .has(&CacheKey::new(CacheKind::Mask, "isnet:uploads/red.png")));

    std::fs::remove_dir_all(&fx.dir).ok();
}

#[test]
fn pixel_analysis_is_cached_but_fallback_is_not() {
    let fx = fixture("pipeline_style");
    let meta = ReferenceMetadata {
        title: "Minimal summer sale".to_owned(),
        ..ReferenceMetadata::default()
    };

    let missing = fx.pipeline.analyze_reference("uploads/later.png", &meta);
    assert_eq!(missing.source, AnalysisSource::Metadata);
    assert!(missing.confidence <= 0.5);
    assert!(!fx
        .pipeline
        .cache()
        .has(&CacheKey::new(CacheKind::Style, "uploads/later.png")));

    fx.fetcher
        .insert("uploads/later.png", solid(8, 8, [240, 240, 240, 255]));
    let real = fx.pipeline.analyze_reference("uploads/later.png", &meta);
    assert_eq!(real.source, AnalysisSource::Pixels);
    assert!(fx
        .pipeline
        .cache()
        .has(&CacheKey::new(CacheKind::Style, "uploads/later.png")));

    // Served from cache even after the reference disappears.
    fx.fetcher.insert("uploads/later.png", b"garbage".to_vec());
    let cached = fx.pipeline.analyze_reference("uploads/later.png", &meta);
    assert_eq!(cached.source, AnalysisSource::Pixels);
    assert_eq!(cached.color_palette, real.color_palette);
    assert_eq!(cached.visual_style_descriptors, real.visual_style_descriptors);

    std::fs::remove_dir_all(&fx.dir).ok();
}

#[test]
fn creative_spec_defaults_match_render_request() {
    let spec: CreativeSpec = serde_json::from_str("{}").unwrap();
    assert_eq!(spec, CreativeSpec::default());
    assert_eq!(spec.quality, 90);
    assert_eq!(spec.format, Format::Square);
}

#[test]
fn batch_analysis_keeps_input_order() {
    let fx = fixture("pipeline_batch");
    fx.fetcher.insert("a.png", solid(4, 4, [250, 250, 250, 255]));
    fx.fetcher.insert("b.png", solid(4, 4, [10, 10, 10, 255]));
    let refs = vec![
        ("a.png".to_owned(), ReferenceMetadata::default()),
        ("missing.png".to_owned(), ReferenceMetadata::default()),
        ("b.png".to_owned(), ReferenceMetadata::default()),
    ];

    let out = fx.pipeline.analyze_references(&refs);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].color_palette.first().map(String::as_str), Some("#FFFFFF"));
    assert!(out[1].is_fallback());
    assert_eq!(out[2].color_palette.first().map(String::as_str), Some("#000000"));

    std::fs::remove_dir_all(&fx.dir).ok();
}
