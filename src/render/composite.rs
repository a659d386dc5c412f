use image::RgbaImage;

use crate::foundation::color::Rgb8;
use crate::foundation::error::{AdcraftError, AdcraftResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::layout::PixelRect;

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels, with an extra layer opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Premultiplied RGBA8 frame buffer the renderer draws into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Allocate a canvas filled with opaque `background`.
    pub fn new(width: u32, height: u32, background: Rgb8) -> AdcraftResult<Self> {
        if width == 0 || height == 0 {
            return Err(AdcraftError::render("canvas must be non-empty"));
        }
        let n = (width as usize) * (height as usize);
        let data = background.to_rgba8().repeat(n);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Paint an opaque rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgb8) {
        let px = color.to_rgba8();
        let x1 = rect.x.saturating_add(rect.w).min(self.width);
        let y1 = rect.y.saturating_add(rect.h).min(self.height);
        for y in rect.y.min(y1)..y1 {
            let row = (y as usize) * (self.width as usize);
            for x in rect.x.min(x1)..x1 {
                let i = (row + x as usize) * 4;
                self.data[i..i + 4].copy_from_slice(&px);
            }
        }
    }

    /// Source-over a premultiplied `src_w` x `src_h` image with its top-left at `(x, y)`.
    pub fn draw_over(
        &mut self,
        src: &[u8],
        src_w: u32,
        src_h: u32,
        x: u32,
        y: u32,
        opacity: f32,
    ) -> AdcraftResult<()> {
        if src.len() != (src_w as usize) * (src_h as usize) * 4 {
            return Err(AdcraftError::render(
                "draw_over expects a tightly packed rgba8 buffer",
            ));
        }
        let cols = src_w.min(self.width.saturating_sub(x)) as usize;
        let rows = src_h.min(self.height.saturating_sub(y));
        for sy in 0..rows {
            let s_row = (sy as usize) * (src_w as usize) * 4;
            let d_row = (((y + sy) as usize) * (self.width as usize) + x as usize) * 4;
            let s = &src[s_row..s_row + cols * 4];
            let d = &mut self.data[d_row..d_row + cols * 4];
            for (dp, sp) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
                let out = over([dp[0], dp[1], dp[2], dp[3]], [sp[0], sp[1], sp[2], sp[3]], opacity);
                dp.copy_from_slice(&out);
            }
        }
        Ok(())
    }

    /// Straight-alpha image of the canvas.
    pub fn to_rgba_image(&self) -> AdcraftResult<RgbaImage> {
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| AdcraftError::render("canvas buffer does not match its dimensions"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
