use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::color::Rgb8;
use crate::foundation::error::{AdcraftError, AdcraftResult};
use crate::foundation::math::scale_px;
use crate::render::layout::ACCENT_BAR_PX;

/// Offset of the caption drop shadow, in pixels.
const SHADOW_OFFSET_PX: u32 = 3;
const SHADOW_OPACITY: f32 = 0.55;

/// Font database shared by every overlay a renderer draws.
///
/// Loading system fonts is slow, so a renderer builds one book and reuses it.
#[derive(Clone, Debug)]
pub struct FontBook {
    db: Arc<usvg::fontdb::Database>,
}

impl FontBook {
    /// System fonts plus any `.ttf`/`.otf`/`.ttc` files directly inside `fonts_dir`.
    pub fn system(fonts_dir: Option<&Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = fonts_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.faces().count(), "font book loaded");
        Self { db: Arc::new(db) }
    }

    /// A book with no faces. Text is skipped, which keeps output independent of the host.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    pub fn face_count(&self) -> usize {
        self.db.faces().count()
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "fonts dir unreadable; using system fonts only");
        return;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        if path.is_file() && matches!(ext.as_deref(), Some("ttf" | "otf" | "ttc")) {
            let _ = db.load_font_file(&path);
        }
    }
}

/// Caption lines already wrapped and positioned.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionBlock<'a> {
    pub lines: &'a [String],
    pub baselines: &'a [u32],
    pub font_px: u32,
    pub font_family: &'a str,
    pub fill: Rgb8,
}

/// Build the SVG document holding the caption (with drop shadow) and the watermark.
///
/// Returns `None` when there is nothing to draw.
pub fn overlay_svg(
    width: u32,
    height: u32,
    caption: Option<&CaptionBlock<'_>>,
    watermark: Option<&str>,
) -> Option<String> {
    let caption = caption.filter(|c| !c.lines.is_empty());
    let watermark = watermark.filter(|w| !w.trim().is_empty());
    if caption.is_none() && watermark.is_none() {
        return None;
    }

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    if let Some(c) = caption {
        let family = font_family_list(c.font_family);
        let cx = width / 2;
        for (pass, (dx, fill, opacity)) in [
            (SHADOW_OFFSET_PX, Rgb8::BLACK, SHADOW_OPACITY),
            (0, c.fill, 1.0),
        ]
        .into_iter()
        .enumerate()
        {
            let _ = write!(
                svg,
                r#"<g id="caption-{pass}" font-family="{family}" font-size="{}" font-weight="700" text-anchor="middle" fill="{fill}" fill-opacity="{opacity}">"#,
                c.font_px
            );
            for (line, y) in c.lines.iter().zip(c.baselines) {
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}">{}</text>"#,
                    cx + dx,
                    y + dx,
                    escape_xml(line)
                );
            }
            svg.push_str("</g>");
        }
    }

    if let Some(text) = watermark {
        let size = scale_px(width, 0.022);
        let margin = scale_px(width, 0.022);
        let x = width.saturating_sub(margin);
        let y = height.saturating_sub(ACCENT_BAR_PX + margin);
        let _ = write!(
            svg,
            r#"<g id="watermark" font-family="sans-serif" font-size="{size}" text-anchor="end"><text x="{}" y="{}" fill="{}" fill-opacity="{SHADOW_OPACITY}">{t}</text><text x="{x}" y="{y}" fill="{}" fill-opacity="0.85">{t}</text></g>"#,
            x + 1,
            y + 1,
            Rgb8::BLACK,
            Rgb8::WHITE,
            t = escape_xml(text)
        );
    }

    svg.push_str("</svg>");
    Some(svg)
}

/// Rasterize an overlay document into a premultiplied RGBA8 buffer of `width` x `height`.
pub fn rasterize_overlay(
    svg: &str,
    width: u32,
    height: u32,
    fonts: &FontBook,
) -> AdcraftResult<Vec<u8>> {
    let opts = usvg::Options {
        fontdb: Arc::clone(&fonts.db),
        font_resolver: font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| AdcraftError::render(format!("parse overlay svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| AdcraftError::render("failed to allocate overlay pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap.take())
}

/// The requested family, then generic fallbacks.
fn font_family_list(primary: &str) -> String {
    let primary = primary.replace(['"', '\'', '<', '>', '&'], "");
    let primary = primary.trim();
    if primary.is_empty() || primary == "sans-serif" {
        return "sans-serif".to_owned();
    }
    format!("'{primary}', sans-serif")
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Query the requested families, fall back to generic families, then to any face at all.
fn font_resolver() -> usvg::FontResolver<'static> {
    use usvg::fontdb;

    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let mut families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|f| match f {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => fontdb::Family::Name(s),
                })
                .collect();
            families.push(fontdb::Family::SansSerif);
            families.push(fontdb::Family::Serif);

            let style = match font.style() {
                usvg::FontStyle::Normal => fontdb::Style::Normal,
                usvg::FontStyle::Italic => fontdb::Style::Italic,
                usvg::FontStyle::Oblique => fontdb::Style::Oblique,
            };
            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style,
            };

            db.query(&query).or_else(|| db.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
