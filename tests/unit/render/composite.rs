use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 100, 50, 255];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [9, 8, 7, 255];
    assert_eq!(over(dst, [0, 0, 0, 0], 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let src = [10, 20, 30, 255];
    assert_eq!(over([200, 200, 200, 255], src, 1.0), src);
}

#[test]
fn over_half_alpha_blends() {
    // 50% black over opaque white.
    let out = over([255, 255, 255, 255], [0, 0, 0, 128], 1.0);
    assert_eq!(out, [127, 127, 127, 255]);
}

#[test]
fn new_canvas_is_filled_and_rejects_empty() {
    let c = Canvas::new(3, 2, Rgb8::new(1, 2, 3)).unwrap();
    assert_eq!(c.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(c.pixel(3, 0), None);
    assert!(Canvas::new(0, 5, Rgb8::WHITE).is_err());
}

#[test]
fn fill_rect_clips_to_canvas() {
    let mut c = Canvas::new(4, 4, Rgb8::WHITE).unwrap();
    c.fill_rect(PixelRect { x: 2, y: 3, w: 10, h: 10 }, Rgb8::BLACK);
    assert_eq!(c.pixel(3, 3), Some([0, 0, 0, 255]));
    assert_eq!(c.pixel(1, 3), Some([255, 255, 255, 255]));
    assert_eq!(c.pixel(3, 2), Some([255, 255, 255, 255]));
}

#[test]
fn draw_over_places_and_clips() {
    let mut c = Canvas::new(4, 4, Rgb8::WHITE).unwrap();
    let red = [255u8, 0, 0, 255].repeat(9);
    c.draw_over(&red, 3, 3, 2, 2, 1.0).unwrap();
    assert_eq!(c.pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(c.pixel(3, 3), Some([255, 0, 0, 255]));
    assert_eq!(c.pixel(1, 1), Some([255, 255, 255, 255]));

    assert!(c.draw_over(&red, 2, 2, 0, 0, 1.0).is_err());
}

#[test]
fn to_rgba_image_round_trips_opaque_pixels() {
    let mut c = Canvas::new(2, 1, Rgb8::new(10, 20, 30)).unwrap();
    c.fill_rect(PixelRect { x: 1, y: 0, w: 1, h: 1 }, Rgb8::new(40, 50, 60));
    let img = c.to_rgba_image().unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [40, 50, 60, 255]);
}
