use image::{ImageFormat, Rgba};

use super::*;
use crate::analyze::enhance::Enhancement;
use crate::assets::fetch::MemoryFetcher;

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn quadrants() -> RgbaImage {
    RgbaImage::from_fn(64, 64, |x, y| match (x < 32, y < 32) {
        (true, true) => Rgba([230, 40, 40, 255]),
        (false, true) => Rgba([40, 40, 230, 255]),
        (true, false) => Rgba([240, 240, 240, 255]),
        (false, false) => Rgba([20, 20, 20, 255]),
    })
}

struct Moody;

impl StyleEnhancer for Moody {
    fn enhance(&self, signals: &StyleSignals) -> AdcraftResult<Enhancement> {
        assert!(!signals.color_palette.is_empty());
        Ok(Enhancement {
            mood_descriptors: Some(vec!["cinematic".to_owned()]),
            ..Enhancement::default()
        })
    }
}

#[test]
fn rejects_invalid_opts() {
    let opts = AnalyzerOpts {
        palette_sample_px: 0,
        ..AnalyzerOpts::default()
    };
    assert!(matches!(
        StyleAnalyzer::new(opts),
        Err(AdcraftError::Validation(_))
    ));
}

#[test]
fn pixel_analysis_is_deterministic_and_complete() {
    let analyzer = StyleAnalyzer::new(AnalyzerOpts::default()).unwrap();
    let bytes = png(&quadrants());
    let a = analyzer.analyze(&bytes, &ReferenceMetadata::default()).unwrap();
    let b = analyzer.analyze(&bytes, &ReferenceMetadata::default()).unwrap();
    assert_eq!(a, b);

    assert_eq!(a.source, AnalysisSource::Pixels);
    assert!(a.color_palette.len() >= 4 && a.color_palette.len() <= 8);
    assert_eq!(a.composition_descriptors[0], "square format");
    assert_eq!(a.composition_descriptors.len(), 4);
    assert!(!a.typography_suggestions.is_empty());
    assert!(!a.mood_descriptors.is_empty());
    assert!(a.confidence >= 0.5 && a.confidence <= 0.95);

    let m = a.metrics.as_ref().unwrap();
    assert!((0.0..=1.0).contains(&m.symmetry_score));
    assert!(m.contrast > 0.3);
}

#[test]
fn undecodable_bytes_are_a_decode_error() {
    let analyzer = StyleAnalyzer::new(AnalyzerOpts::default()).unwrap();
    let err = analyzer
        .analyze(b"not an image", &ReferenceMetadata::default())
        .unwrap_err();
    assert!(matches!(err, AdcraftError::Decode(_)));
}

#[test]
fn unreachable_reference_falls_back_to_metadata() {
    let analyzer = StyleAnalyzer::new(AnalyzerOpts::default()).unwrap();
    let fetcher = MemoryFetcher::new();
    let meta = ReferenceMetadata {
        title: "Retro neon night".to_owned(),
        ..ReferenceMetadata::default()
    };
    let a = analyzer.analyze_reference(&fetcher, "https://unreachable.invalid/ref.png", &meta);
    assert!(a.is_fallback());
    assert!(a.confidence <= 0.5);
    assert!(a.visual_style_descriptors.contains(&"retro".to_owned()));
}

#[test]
fn corrupt_reference_falls_back_to_metadata() {
    let analyzer = StyleAnalyzer::new(AnalyzerOpts::default()).unwrap();
    let fetcher = MemoryFetcher::new();
    fetcher.insert("ref.png", b"\x89PNG broken".to_vec());
    let a = analyzer.analyze_reference(&fetcher, "ref.png", &ReferenceMetadata::default());
    assert!(a.is_fallback());
}

#[test]
fn enhancer_enriches_but_keeps_palette() {
    let plain = StyleAnalyzer::new(AnalyzerOpts::default()).unwrap();
    let enhanced = StyleAnalyzer::new(AnalyzerOpts::default())
        .unwrap()
        .with_enhancer(Arc::new(Moody));

    let img = quadrants();
    let a = plain.analyze_image(&img, &ReferenceMetadata::default());
    let b = enhanced.analyze_image(&img, &ReferenceMetadata::default());
    assert_eq!(b.mood_descriptors, vec!["cinematic"]);
    assert_eq!(a.color_palette, b.color_palette);
    assert_eq!(a.confidence, b.confidence);
}
