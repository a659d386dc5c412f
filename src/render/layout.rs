use crate::foundation::math::scale_px;
use crate::render::model::{Format, Layout};

/// Height of the brand accent bars along the top and bottom edges.
pub const ACCENT_BAR_PX: u32 = 12;

/// Axis-aligned rectangle in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

/// Region the subject is fitted into for `layout`.
///
/// `center-focus` centers an 80% x 60% box. `bottom-text` and `top-text` use a 90% x 70% box
/// starting 5% below the top edge; they differ only in caption placement.
pub fn subject_rect(format: Format, layout: Layout) -> PixelRect {
    let (fw, fh) = format.dimensions();
    match layout {
        Layout::CenterFocus => {
            let w = scale_px(fw, 0.8);
            let h = scale_px(fh, 0.6);
            PixelRect {
                x: (fw - w) / 2,
                y: (fh - h) / 2,
                w,
                h,
            }
        }
        Layout::BottomText | Layout::TopText => {
            let w = scale_px(fw, 0.9);
            let h = scale_px(fh, 0.7);
            PixelRect {
                x: (fw - w) / 2,
                y: scale_px(fh, 0.05),
                w,
                h,
            }
        }
    }
}

/// Largest rectangle with the source aspect ratio that fits inside `bounds`, centered in it.
pub fn fit_contain(src_w: u32, src_h: u32, bounds: PixelRect) -> PixelRect {
    if src_w == 0 || src_h == 0 {
        return PixelRect { w: 0, h: 0, ..bounds };
    }
    let scale = f64::min(
        f64::from(bounds.w) / f64::from(src_w),
        f64::from(bounds.h) / f64::from(src_h),
    );
    let w = ((f64::from(src_w) * scale).round() as u32).clamp(1, bounds.w.max(1));
    let h = ((f64::from(src_h) * scale).round() as u32).clamp(1, bounds.h.max(1));
    PixelRect {
        x: bounds.x + (bounds.w.saturating_sub(w)) / 2,
        y: bounds.y + (bounds.h.saturating_sub(h)) / 2,
        w,
        h,
    }
}

/// Where caption lines go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionAnchor {
    Top,
    Bottom,
}

impl CaptionAnchor {
    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::TopText => Self::Top,
            Layout::CenterFocus | Layout::BottomText => Self::Bottom,
        }
    }
}

/// Caption typography derived from the frame size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptionLayout {
    pub font_px: u32,
    pub line_height_px: u32,
    /// Greedy-wrap budget per line, in characters.
    pub max_chars: usize,
    pub max_lines: usize,
    /// Distance between the frame edge (inside the accent bar) and the text block.
    pub margin_px: u32,
    pub anchor: CaptionAnchor,
}

impl CaptionLayout {
    pub fn new(format: Format, layout: Layout) -> Self {
        let (fw, fh) = format.dimensions();
        let font_px = scale_px(fw, 0.05);
        let line_height_px = scale_px(font_px, 1.25);
        let margin_px = scale_px(fh, 0.04);
        // As many lines as fit between the two accent bars and their margins.
        let usable_h = fh.saturating_sub(2 * (ACCENT_BAR_PX + margin_px));
        Self {
            font_px,
            line_height_px,
            // Roughly 0.55 em per glyph across 90% of the width.
            max_chars: ((f64::from(fw) * 0.9) / (f64::from(font_px) * 0.55)).floor() as usize,
            max_lines: (usable_h / line_height_px).max(1) as usize,
            margin_px,
            anchor: CaptionAnchor::for_layout(layout),
        }
    }

    /// Baseline y for each of `n` lines.
    pub fn baselines(&self, n: usize, frame_h: u32) -> Vec<u32> {
        if n == 0 {
            return Vec::new();
        }
        let step = self.line_height_px;
        let first = match self.anchor {
            CaptionAnchor::Top => ACCENT_BAR_PX + self.margin_px + self.font_px,
            CaptionAnchor::Bottom => {
                let last = frame_h.saturating_sub(ACCENT_BAR_PX + self.margin_px);
                last.saturating_sub(step * (n as u32 - 1))
            }
        };
        (0..n as u32).map(|i| first + i * step).collect()
    }

    /// Wrap `caption` and enforce the line budget, ellipsizing the last kept line.
    ///
    /// The budget only bites when the text would run off the frame.
    pub fn lines(&self, caption: &str) -> Vec<String> {
        let mut lines = wrap_caption(caption, self.max_chars);
        if lines.len() > self.max_lines {
            lines.truncate(self.max_lines);
            if let Some(last) = lines.last_mut() {
                last.push('\u{2026}');
            }
        }
        lines
    }
}

/// Greedy word wrap: a word joins the current line if the result stays within `max_chars`,
/// otherwise it starts a new line. Words longer than the budget get a line of their own.
pub fn wrap_caption(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0usize;

    for word in text.split_whitespace() {
        let n = word.chars().count();
        if line.is_empty() {
            line.push_str(word);
            line_chars = n;
        } else if line_chars + 1 + n <= max_chars {
            line.push(' ');
            line.push_str(word);
            line_chars += 1 + n;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_chars = n;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
