use crate::foundation::color::{chroma_ratio, luma};
use crate::foundation::stats::ChannelStats;

/// Global tone of an image, every field in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneStats {
    /// Perceptual luma of the channel means over 255.
    pub brightness: f64,
    /// Average of the per-channel standard deviations over 255.
    pub contrast: f64,
    /// `(max - min) / max` across the channel means; 0 for black.
    pub saturation: f64,
}

impl ToneStats {
    /// Derive tone from channel means and standard deviations.
    pub fn from_channel_stats(stats: &ChannelStats) -> Self {
        let [r, g, b] = stats.mean;
        let contrast = stats.std_dev.iter().sum::<f64>() / 3.0 / 255.0;
        Self {
            brightness: (luma(r, g, b) / 255.0).clamp(0.0, 1.0),
            contrast: contrast.clamp(0.0, 1.0),
            saturation: chroma_ratio(r, g, b).clamp(0.0, 1.0),
        }
    }

    /// `false` if any field is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.brightness.is_finite() && self.contrast.is_finite() && self.saturation.is_finite()
    }
}
