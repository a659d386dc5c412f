use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageFormat, Rgba};

use super::*;
use crate::assets::fetch::MemoryFetcher;
use crate::cache::store::CacheOpts;
use crate::render::model::{Format, Layout};

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

fn red_pixel() -> Vec<u8> {
    png(&RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])))
}

struct CountingFetcher {
    inner: MemoryFetcher,
    calls: AtomicUsize,
}

impl ImageFetcher for CountingFetcher {
    fn fetch(&self, uri: &str) -> AdcraftResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(uri)
    }
}

fn renderer(out: &std::path::Path, fetcher: Arc<dyn ImageFetcher>) -> CreativeRenderer {
    let cache = Arc::new(RenderCache::new(CacheOpts::default()).unwrap());
    CreativeRenderer::new(
        RenderOpts {
            output_dir: out.to_path_buf(),
            load_system_fonts: false,
            ..RenderOpts::default()
        },
        cache,
        fetcher,
    )
    .unwrap()
}

fn hello() -> RenderRequest {
    RenderRequest {
        format: Format::Square,
        layout: Layout::CenterFocus,
        caption: "Hello".to_owned(),
        watermark: false,
        quality: 90,
        ..RenderRequest::default()
    }
}

#[test]
fn red_pixel_square_render_is_served_from_cache_the_second_time() {
    let tmp = temp_dir("renderer_e2e");
    let fetcher = Arc::new(CountingFetcher {
        inner: MemoryFetcher::new(),
        calls: AtomicUsize::new(0),
    });
    fetcher.inner.insert("subjects/red.png", red_pixel());
    let r = renderer(&tmp, fetcher.clone());
    let subject = SubjectRef::new("subjects/red.png");

    let first = r.render(&subject, &hello()).unwrap();
    assert_eq!((first.width, first.height), (1080, 1080));
    assert!(!first.image_ref.is_empty());
    assert!(std::path::Path::new(&first.image_ref).is_file());
    assert!(std::path::Path::new(&first.thumbnail_ref).is_file());

    let second = r.render(&subject, &hello()).unwrap();
    assert_eq!(second, first);
    assert_eq!(
        r.stats(),
        RenderStats {
            renders: 1,
            cache_hits: 1,
            failures: 0
        }
    );
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1, "cache hit must not fetch");

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn compose_is_deterministic_and_places_layers() {
    let tmp = temp_dir("renderer_compose");
    let r = renderer(&tmp, Arc::new(MemoryFetcher::new()));
    let req = hello();

    let a = r.compose(&red_pixel(), &req).unwrap();
    let b = r.compose(&red_pixel(), &req).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.dimensions(), (1080, 1080));

    let primary = req.brand_style.primary_color;
    let bg = primary.lighten(BACKGROUND_LIGHTEN).to_rgba8();
    assert_eq!(a.get_pixel(100, 540).0, bg);
    assert_eq!(a.get_pixel(540, 0).0, primary.to_rgba8());
    assert_eq!(a.get_pixel(540, 1079).0, primary.to_rgba8());
    assert_eq!(a.get_pixel(540, ACCENT_BAR_PX).0, bg);

    let center = a.get_pixel(540, 540).0;
    assert!(center[0] > 250 && center[1] < 5 && center[2] < 5, "{center:?}");
    // Square subject fitted into the 864x648 box spans x in 216..864.
    assert_eq!(a.get_pixel(215, 540).0, bg);
    assert!(a.get_pixel(220, 540).0[0] > 250);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn story_format_uses_fixed_dimensions() {
    let tmp = temp_dir("renderer_story");
    let r = renderer(&tmp, Arc::new(MemoryFetcher::new()));
    let req = RenderRequest {
        format: Format::Story,
        layout: Layout::TopText,
        watermark: true,
        ..hello()
    };
    let res = r.render_bytes("inline:red", &red_pixel(), &req).unwrap();
    assert_eq!((res.width, res.height), (1080, 1920));
    let thumb = image::open(&res.thumbnail_ref).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (225, 400));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn failed_render_is_not_cached_and_leaves_no_files() {
    let tmp = temp_dir("renderer_fail");
    let r = renderer(&tmp, Arc::new(MemoryFetcher::new()));

    for _ in 0..2 {
        let err = r.render_bytes("broken", b"definitely not an image", &hello()).unwrap_err();
        assert!(matches!(err, AdcraftError::Render(_)), "{err}");
    }
    assert_eq!(r.stats().renders, 0);
    assert_eq!(r.stats().failures, 2);
    assert_eq!(std::fs::read_dir(&tmp).unwrap().count(), 0);

    // The same key succeeds once the subject is valid.
    let ok = r.render_bytes("broken", &red_pixel(), &hello()).unwrap();
    assert_eq!(ok.width, 1080);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn unknown_subject_is_a_fetch_error() {
    let tmp = temp_dir("renderer_fetch");
    let r = renderer(&tmp, Arc::new(MemoryFetcher::new()));
    let err = r.render(&SubjectRef::new("nope.png"), &hello()).unwrap_err();
    assert!(matches!(err, AdcraftError::Fetch(_)));
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn invalid_quality_is_rejected_up_front() {
    let tmp = temp_dir("renderer_quality");
    let r = renderer(&tmp, Arc::new(MemoryFetcher::new()));
    let req = RenderRequest {
        quality: 0,
        ..hello()
    };
    assert!(matches!(
        r.render_bytes("s", &red_pixel(), &req),
        Err(AdcraftError::Validation(_))
    ));
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn cached_result_with_missing_file_is_rerendered() {
    let tmp = temp_dir("renderer_missing");
    let r = renderer(&tmp, Arc::new(MemoryFetcher::new()));
    let first = r.render_bytes("s", &red_pixel(), &hello()).unwrap();
    std::fs::remove_file(&first.image_ref).unwrap();

    let second = r.render_bytes("s", &red_pixel(), &hello()).unwrap();
    assert_ne!(second.render_id, first.render_id);
    assert_eq!(r.stats().renders, 2);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn concurrent_identical_renders_collapse_into_one() {
    let tmp = temp_dir("renderer_concurrent");
    let fetcher = Arc::new(MemoryFetcher::new());
    fetcher.insert("s.png", red_pixel());
    let r = renderer(&tmp, fetcher);
    let subject = SubjectRef::new("s.png");

    let results: Vec<RenderResult> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| r.render(&subject, &hello()).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(r.stats().renders, 1);
    assert_eq!(r.stats().cache_hits, 3);
    assert!(r.in_flight.lock().is_empty());

    std::fs::remove_dir_all(&tmp).ok();
}
