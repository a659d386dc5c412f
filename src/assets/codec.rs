use image::ImageEncoder;

use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Decode any supported raster format into straight-alpha RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> AdcraftResult<image::RgbaImage> {
    if bytes.is_empty() {
        return Err(AdcraftError::decode("image bytes are empty"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| AdcraftError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(AdcraftError::decode("image has zero width or height"));
    }
    Ok(rgba)
}

/// Encode an RGBA8 image as baseline JPEG, dropping alpha.
///
/// `quality` is clamped to `1..=100`.
pub fn encode_jpeg(img: &image::RgbaImage, quality: u8) -> AdcraftResult<Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * 3);
    for px in img.as_raw().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }

    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| AdcraftError::render(format!("encode jpeg: {e}")))?;
    Ok(buf)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/codec.rs"]
mod tests;
