use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgb8;
use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Output frame format. Each format has fixed pixel dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// 1080 x 1080 feed post.
    #[default]
    Square,
    /// 1080 x 1920 vertical story.
    Story,
}

impl Format {
    /// `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Square => (1080, 1080),
            Self::Story => (1080, 1920),
        }
    }

    /// Lowercase name as used in requests and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Story => "story",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = AdcraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(Self::Square),
            "story" => Ok(Self::Story),
            other => Err(AdcraftError::validation(format!(
                "unknown format \"{other}\" (expected square or story)"
            ))),
        }
    }
}

/// Placement strategy for subject and caption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Subject centered; caption along the bottom.
    #[default]
    CenterFocus,
    /// Subject near the top; caption along the bottom.
    BottomText,
    /// Subject near the top; caption along the top.
    TopText,
}

impl Layout {
    /// Kebab-case name as used in requests and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CenterFocus => "center-focus",
            Self::BottomText => "bottom-text",
            Self::TopText => "top-text",
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = AdcraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center-focus" => Ok(Self::CenterFocus),
            "bottom-text" => Ok(Self::BottomText),
            "top-text" => Ok(Self::TopText),
            other => Err(AdcraftError::validation(format!(
                "unknown layout \"{other}\" (expected center-focus, bottom-text or top-text)"
            ))),
        }
    }
}

/// Brand colors and fonts applied to a creative.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandStyle {
    /// Accent bars; lightened for the background.
    pub primary_color: Rgb8,
    /// Secondary brand color.
    pub secondary_color: Rgb8,
    /// Accent brand color.
    pub accent_color: Rgb8,
    /// Caption font family.
    pub heading_font: String,
    /// Body text font family.
    pub body_font: String,
}

impl Default for BrandStyle {
    fn default() -> Self {
        Self {
            primary_color: Rgb8::new(0x1E, 0x88, 0xE5),
            secondary_color: Rgb8::new(0x21, 0x21, 0x21),
            accent_color: Rgb8::new(0xFF, 0xB3, 0x00),
            heading_font: "sans-serif".to_owned(),
            body_font: "sans-serif".to_owned(),
        }
    }
}

/// One creative to render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Output frame format.
    #[serde(default)]
    pub format: Format,
    /// Subject and caption placement.
    #[serde(default)]
    pub layout: Layout,
    /// Caption text; empty draws no caption.
    #[serde(default)]
    pub caption: String,
    /// Brand colors and fonts.
    #[serde(default)]
    pub brand_style: BrandStyle,
    /// Draw the attribution watermark.
    #[serde(default)]
    pub watermark: bool,
    /// JPEG quality in `1..=100`. Not part of the render cache key.
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_quality() -> u8 {
    90
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            format: Format::default(),
            layout: Layout::default(),
            caption: String::new(),
            brand_style: BrandStyle::default(),
            watermark: false,
            quality: default_quality(),
        }
    }
}

impl RenderRequest {
    /// Check quality bounds and that both font names are non-empty.
    pub fn validate(&self) -> AdcraftResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(AdcraftError::validation(format!(
                "quality must be in 1..=100, got {}",
                self.quality
            )));
        }
        for (name, font) in [
            ("headingFont", &self.brand_style.heading_font),
            ("bodyFont", &self.brand_style.body_font),
        ] {
            if font.trim().is_empty() {
                return Err(AdcraftError::validation(format!(
                    "brand style {name} must be non-empty"
                )));
            }
        }
        Ok(())
    }
}

/// Opaque reference to already-masked subject pixels, resolved through an image fetcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectRef(String);

impl SubjectRef {
    /// Wrap a fetcher URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The URI as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted output of one successful render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    /// Unique id, also the output file stem.
    pub render_id: String,
    /// Path of the full-size JPEG.
    pub image_ref: String,
    /// Path of the bounded-size JPEG thumbnail.
    pub thumbnail_ref: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Counters kept by a renderer instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStats {
    /// Full renders performed.
    pub renders: u64,
    /// Requests answered from the render cache.
    pub cache_hits: u64,
    /// Requests that failed.
    pub failures: u64,
}

#[cfg(test)]
#[path = "../../tests/unit/render/model.rs"]
mod tests;
