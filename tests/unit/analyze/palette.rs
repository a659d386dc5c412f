use image::{Rgba, RgbaImage};

use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(px))
}

#[test]
fn quantize_rounds_to_nearest_step_and_clamps() {
    assert_eq!(quantize_channel(0), 0);
    assert_eq!(quantize_channel(15), 0);
    assert_eq!(quantize_channel(16), 32);
    assert_eq!(quantize_channel(100), 96);
    assert_eq!(quantize_channel(239), 224);
    assert_eq!(quantize_channel(240), 255);
    assert_eq!(quantize_channel(255), 255);
}

#[test]
fn solid_image_is_a_single_full_bucket() {
    let p = extract_dominant_colors(&solid(40, 30, [255, 0, 0, 255]), 150).unwrap();
    assert_eq!(p.len(), 1);
    assert_eq!(p[0].hex(), "#FF0000");
    assert!((p[0].percentage - 100.0).abs() < 1e-9);
}

#[test]
fn majority_color_leads_the_palette() {
    // Left three quarters blue, right quarter white; sampled at the native size.
    let mut img = solid(64, 64, [0, 0, 255, 255]);
    for y in 0..64 {
        for x in 48..64 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    let p = extract_dominant_colors(&img, 64).unwrap();
    assert_eq!(p.len(), 2);
    assert_eq!(p[0].hex(), "#0000FF");
    assert_eq!(p[1].hex(), "#FFFFFF");
    assert!((p[0].percentage - 75.0).abs() < 1e-9);
    assert!((p[1].percentage - 25.0).abs() < 1e-9);
}

#[test]
fn noisy_image_is_capped_and_sums_to_at_most_100() {
    let mut state = 0x2545_f491_u32;
    let img = RgbaImage::from_fn(120, 90, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let b = state.to_le_bytes();
        Rgba([b[0], b[1], b[2], 255])
    });
    let p = extract_dominant_colors(&img, 150).unwrap();
    assert!(!p.is_empty());
    assert!(p.len() <= MAX_PALETTE_COLORS);
    let total: f64 = p.iter().map(|c| c.percentage).sum();
    assert!(total <= 100.0 + 1e-9);
    for w in p.windows(2) {
        assert!(w[0].percentage >= w[1].percentage);
    }
}

#[test]
fn transparent_pixels_are_ignored() {
    let p = extract_dominant_colors(&solid(10, 10, [10, 200, 30, 0]), 10).unwrap();
    assert!(p.is_empty());

    let mut img = solid(10, 10, [0, 0, 0, 0]);
    img.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
    let p = extract_dominant_colors(&img, 10).unwrap();
    assert_eq!(p.len(), 1);
    assert_eq!(p[0].hex(), "#00FF00");
    assert!((p[0].percentage - 100.0).abs() < 1e-9);
}

#[test]
fn zero_sample_size_is_rejected() {
    assert!(extract_dominant_colors(&solid(2, 2, [0, 0, 0, 255]), 0).is_err());
}

#[test]
fn vivid_needs_chroma_and_brightness() {
    let mk = |hex: &str| DominantColor {
        color: Rgb8::from_hex(hex).unwrap(),
        percentage: 10.0,
    };
    let palette = vec![mk("#FF0000"), mk("#400000"), mk("#808080"), mk("#00C0FF")];
    assert_eq!(vivid_count(&palette), 2);
}
