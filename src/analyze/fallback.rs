use crate::analyze::profile::{AnalysisSource, ReferenceMetadata, StyleAnalysis};

/// Confidence of a metadata-only analysis before any keyword matched.
pub const FALLBACK_BASE_CONFIDENCE: f64 = 0.3;
/// Ceiling for metadata-only analyses; pixel analysis always starts at or above it.
pub const FALLBACK_MAX_CONFIDENCE: f64 = 0.5;

const MOOD_KEYWORDS: &[(&str, &str)] = &[
    ("luxury", "sophisticated"),
    ("elegant", "sophisticated"),
    ("premium", "sophisticated"),
    ("fun", "playful"),
    ("playful", "playful"),
    ("kid", "playful"),
    ("calm", "calm"),
    ("wellness", "calm"),
    ("spa", "calm"),
    ("minimal", "calm"),
    ("bold", "energetic"),
    ("sport", "energetic"),
    ("fitness", "energetic"),
    ("summer", "warm"),
    ("cozy", "warm"),
    ("autumn", "warm"),
    ("winter", "cool"),
    ("tech", "modern"),
];

const STYLE_KEYWORDS: &[(&str, &str)] = &[
    ("minimal", "minimalist"),
    ("minimalist", "minimalist"),
    ("clean", "minimalist"),
    ("vintage", "retro"),
    ("retro", "retro"),
    ("neon", "vibrant and bold"),
    ("colorful", "vibrant and bold"),
    ("dark", "dark and moody"),
    ("night", "dark and moody"),
    ("bright", "bright and airy"),
    ("pastel", "bright and airy"),
    ("luxury", "premium"),
    ("premium", "premium"),
    ("fun", "playful"),
    ("kid", "playful"),
];

const COLOR_KEYWORDS: &[(&str, &str)] = &[
    ("red", "#E53935"),
    ("orange", "#FB8C00"),
    ("yellow", "#FDD835"),
    ("green", "#43A047"),
    ("teal", "#00897B"),
    ("blue", "#1E88E5"),
    ("purple", "#8E24AA"),
    ("pink", "#D81B60"),
    ("gold", "#D4AF37"),
    ("black", "#212121"),
    ("white", "#FAFAFA"),
];

/// Heuristic style profile from reference text alone.
///
/// Keywords are matched as whole words (an `s` plural also matches) across title, description and
/// tags. Confidence starts at 0.3 and gains 0.05 per signal group that matched (mood, style,
/// color, platform), so it never exceeds 0.5.
pub fn metadata_fallback(meta: &ReferenceMetadata) -> StyleAnalysis {
    let words = tokenize(meta);
    let platform = meta.platform.as_deref().map(str::to_ascii_lowercase);

    let mood = lookup(&words, MOOD_KEYWORDS);
    let style = lookup(&words, STYLE_KEYWORDS);
    let palette = lookup(&words, COLOR_KEYWORDS);

    let mut composition = Vec::new();
    match platform.as_deref() {
        Some("instagram") | Some("facebook") => composition.push("square format".to_owned()),
        Some("tiktok") | Some("story") | Some("reels") => {
            composition.push("portrait orientation".to_owned())
        }
        Some("youtube") | Some("linkedin") => {
            composition.push("landscape orientation".to_owned())
        }
        _ => {}
    }

    let mut confidence = FALLBACK_BASE_CONFIDENCE;
    for matched in [
        !mood.is_empty(),
        !style.is_empty(),
        !palette.is_empty(),
        !composition.is_empty(),
    ] {
        if matched {
            confidence += 0.05;
        }
    }

    let typography = typography_for(&style);
    let key_elements: Vec<String> = meta
        .tags
        .iter()
        .map(|t| t.trim().trim_start_matches('#').to_owned())
        .filter(|t| !t.is_empty())
        .take(5)
        .collect();

    StyleAnalysis {
        color_palette: palette,
        typography_suggestions: typography,
        composition_descriptors: composition,
        mood_descriptors: or_default(mood, "neutral"),
        visual_style_descriptors: or_default(style, "general purpose"),
        key_elements,
        confidence: confidence.min(FALLBACK_MAX_CONFIDENCE),
        source: AnalysisSource::Metadata,
        metrics: None,
    }
}

fn tokenize(meta: &ReferenceMetadata) -> Vec<String> {
    let mut text = String::new();
    for part in [meta.title.as_str(), meta.description.as_str()]
        .into_iter()
        .chain(meta.tags.iter().map(String::as_str))
    {
        text.push(' ');
        text.push_str(part);
    }
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Values whose keyword appears in `words`, deduplicated in table order.
fn lookup(words: &[String], table: &[(&str, &str)]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for &(keyword, value) in table {
        let hit = words
            .iter()
            .any(|w| w == keyword || w.strip_suffix('s') == Some(keyword));
        if hit && !out.iter().any(|v| v == value) {
            out.push(value.to_owned());
        }
    }
    out
}

fn typography_for(style: &[String]) -> Vec<String> {
    let has = |s: &str| style.iter().any(|v| v == s);
    let mut out = Vec::new();
    if has("premium") {
        out.push("elegant serif headlines");
    }
    if has("playful") {
        out.push("rounded display type");
    }
    if has("retro") {
        out.push("vintage slab serif");
    }
    if has("minimalist") {
        out.push("clean geometric type with generous letter spacing");
    }
    if out.is_empty() {
        out.push("modern sans-serif");
    }
    out.into_iter().map(str::to_owned).collect()
}

fn or_default(v: Vec<String>, default: &str) -> Vec<String> {
    if v.is_empty() {
        vec![default.to_owned()]
    } else {
        v
    }
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/fallback.rs"]
mod tests;
