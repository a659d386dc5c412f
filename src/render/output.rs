use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;
use image::imageops::FilterType;

use crate::assets::codec::encode_jpeg;
use crate::cache::entry::now_ms;
use crate::foundation::error::{AdcraftError, AdcraftResult};

/// Files written for one render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRender {
    /// Id shared by both files.
    pub render_id: String,
    /// Full-size JPEG.
    pub image_path: PathBuf,
    /// Thumbnail JPEG, longer side bounded.
    pub thumbnail_path: PathBuf,
}

/// Durable storage for rendered creatives: `<id>.jpg` plus `<id>_thumb.jpg` under one directory.
///
/// Render ids are `{unix_ms}_{random}` and never reused, so concurrent renders cannot overwrite
/// each other's files.
#[derive(Clone, Debug)]
pub struct OutputStore {
    dir: PathBuf,
    thumbnail_max_px: u32,
}

impl OutputStore {
    /// Create `dir` if needed. Failure here is a startup error.
    pub fn open(dir: impl Into<PathBuf>, thumbnail_max_px: u32) -> AdcraftResult<Self> {
        if thumbnail_max_px == 0 {
            return Err(AdcraftError::validation("thumbnail_max_px must be > 0"));
        }
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))
            .map_err(|e| AdcraftError::storage(format!("{e:#}")))?;
        Ok(Self {
            dir,
            thumbnail_max_px,
        })
    }

    /// Directory renders are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fresh `{unix_ms}_{8 hex}` id.
    pub fn new_render_id() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}_{}", now_ms(), &suffix[..8])
    }

    /// Encode `img` at `quality`, write it and its thumbnail.
    ///
    /// If the thumbnail cannot be produced the main file is removed again, so an error never
    /// leaves a half-written render behind.
    pub fn persist(&self, img: &RgbaImage, quality: u8) -> AdcraftResult<StoredRender> {
        self.persist_as(&Self::new_render_id(), img, quality)
    }

    pub(crate) fn persist_as(
        &self,
        render_id: &str,
        img: &RgbaImage,
        quality: u8,
    ) -> AdcraftResult<StoredRender> {
        let image_path = self.dir.join(format!("{render_id}.jpg"));
        let thumbnail_path = self.dir.join(format!("{render_id}_thumb.jpg"));

        let main = encode_jpeg(img, quality)?;
        write_file(&image_path, &main)?;

        let thumb = self.thumbnail(img);
        if let Err(e) = encode_jpeg(&thumb, quality).and_then(|b| write_file(&thumbnail_path, &b)) {
            if let Err(rm) = std::fs::remove_file(&image_path) {
                tracing::warn!(path = %image_path.display(), error = %rm, "could not remove orphaned render");
            }
            return Err(e);
        }

        Ok(StoredRender {
            render_id: render_id.to_owned(),
            image_path,
            thumbnail_path,
        })
    }

    /// Downscale so the longer side is at most `thumbnail_max_px`; smaller images are kept as-is.
    pub fn thumbnail(&self, img: &RgbaImage) -> RgbaImage {
        let (w, h) = thumbnail_dims(img.width(), img.height(), self.thumbnail_max_px);
        if (w, h) == img.dimensions() {
            return img.clone();
        }
        image::imageops::resize(img, w, h, FilterType::Triangle)
    }
}

/// Dimensions bounded by `max_px` on the longer side, aspect preserved, never below 1.
pub fn thumbnail_dims(width: u32, height: u32, max_px: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_px || longest == 0 {
        return (width, height);
    }
    let scale = f64::from(max_px) / f64::from(longest);
    let w = ((f64::from(width) * scale).round() as u32).max(1);
    let h = ((f64::from(height) * scale).round() as u32).max(1);
    (w, h)
}

fn write_file(path: &Path, bytes: &[u8]) -> AdcraftResult<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("write '{}'", path.display()))
        .map_err(|e| AdcraftError::storage(format!("{e:#}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/output.rs"]
mod tests;
