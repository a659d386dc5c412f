use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, sync_channel};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analyze::profile::{ReferenceMetadata, StyleAnalysis};
use crate::foundation::color::Rgb8;
use crate::foundation::error::AdcraftResult;

/// Numeric signals handed to an external enhancer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSignals {
    /// Hex palette in dominance order.
    pub color_palette: Vec<String>,
    /// Perceptual brightness in `[0, 1]`.
    pub brightness: f64,
    /// Contrast in `[0, 1]`.
    pub contrast: f64,
    /// Saturation in `[0, 1]`.
    pub saturation: f64,
    /// Composition labels from the pixel analysis.
    pub composition_descriptors: Vec<String>,
    /// Look labels from the pixel analysis.
    pub visual_style_descriptors: Vec<String>,
    /// Text supplied with the reference.
    pub metadata: ReferenceMetadata,
}

/// Richer language returned by an enhancer. `None` fields leave the numeric result untouched.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Enhancement {
    /// Replacement palette; only valid hex colors are kept.
    pub color_palette: Option<Vec<String>>,
    /// Replacement type treatments.
    pub typography_suggestions: Option<Vec<String>>,
    /// Replacement mood labels.
    pub mood_descriptors: Option<Vec<String>>,
    /// Replacement look labels.
    pub visual_style_descriptors: Option<Vec<String>>,
    /// Notable elements to carry into generated creatives.
    pub key_elements: Option<Vec<String>>,
}

/// External text/vision capability that turns numeric signals into style language.
///
/// Implementations may block; the analyzer runs them on a worker thread and abandons the call
/// once its timeout elapses.
pub trait StyleEnhancer: Send + Sync + 'static {
    /// Describe `signals`. Any error leaves the numeric analysis as it was.
    fn enhance(&self, signals: &StyleSignals) -> AdcraftResult<Enhancement>;
}

/// Run `enhancer` with a hard deadline. Errors, panics and timeouts all yield `None`.
pub(crate) fn enhance_with_timeout(
    enhancer: &Arc<dyn StyleEnhancer>,
    signals: StyleSignals,
    timeout: Duration,
) -> Option<Enhancement> {
    let (tx, rx) = sync_channel(1);
    let worker = Arc::clone(enhancer);
    let spawned = std::thread::Builder::new()
        .name("adcraft-enhance".to_owned())
        .spawn(move || {
            let _ = tx.send(worker.enhance(&signals));
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not start style enhancer");
        return None;
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(enhancement)) => Some(enhancement),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "style enhancer failed; keeping numeric analysis");
            None
        }
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "style enhancer timed out; keeping numeric analysis"
            );
            None
        }
        Err(RecvTimeoutError::Disconnected) => {
            tracing::warn!("style enhancer exited without a result; keeping numeric analysis");
            None
        }
    }
}

/// Merge `enhancement` into `analysis`.
///
/// Non-empty lists replace the numeric ones. The palette is replaced only when the enhancement
/// supplies at least one valid hex color; entries are normalized to uppercase `#RRGGBB`.
pub(crate) fn apply_enhancement(analysis: &mut StyleAnalysis, enhancement: Enhancement) {
    fn replace(target: &mut Vec<String>, source: Option<Vec<String>>) {
        if let Some(v) = source.filter(|v| !v.is_empty()) {
            *target = v;
        }
    }

    if let Some(palette) = enhancement.color_palette {
        let parsed: Vec<String> = palette
            .iter()
            .filter_map(|h| Rgb8::from_hex(h).ok())
            .map(Rgb8::to_hex)
            .collect();
        if !parsed.is_empty() {
            analysis.color_palette = parsed;
        }
    }
    replace(
        &mut analysis.typography_suggestions,
        enhancement.typography_suggestions,
    );
    replace(&mut analysis.mood_descriptors, enhancement.mood_descriptors);
    replace(
        &mut analysis.visual_style_descriptors,
        enhancement.visual_style_descriptors,
    );
    replace(&mut analysis.key_elements, enhancement.key_elements);
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/enhance.rs"]
mod tests;
