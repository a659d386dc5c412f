use super::*;

fn meta(title: &str, description: &str, tags: &[&str], platform: Option<&str>) -> ReferenceMetadata {
    ReferenceMetadata {
        title: title.to_owned(),
        description: description.to_owned(),
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        platform: platform.map(str::to_owned),
    }
}

#[test]
fn empty_metadata_yields_defaults_at_base_confidence() {
    let a = metadata_fallback(&ReferenceMetadata::default());
    assert_eq!(a.confidence, FALLBACK_BASE_CONFIDENCE);
    assert_eq!(a.mood_descriptors, vec!["neutral"]);
    assert_eq!(a.visual_style_descriptors, vec!["general purpose"]);
    assert_eq!(a.typography_suggestions, vec!["modern sans-serif"]);
    assert!(a.color_palette.is_empty());
    assert!(a.composition_descriptors.is_empty());
    assert!(a.is_fallback());
    assert!(a.metrics.is_none());
}

#[test]
fn keywords_map_to_descriptors_and_colors() {
    let a = metadata_fallback(&meta(
        "Luxury summer drop",
        "Minimal gold and white packshots",
        &["#fashion", "#beachwear"],
        Some("Instagram"),
    ));
    assert_eq!(a.mood_descriptors, vec!["sophisticated", "calm", "warm"]);
    assert_eq!(a.visual_style_descriptors, vec!["minimalist", "premium"]);
    assert_eq!(a.color_palette, vec!["#D4AF37", "#FAFAFA"]);
    assert_eq!(a.composition_descriptors, vec!["square format"]);
    assert_eq!(
        a.typography_suggestions,
        vec![
            "elegant serif headlines",
            "clean geometric type with generous letter spacing"
        ]
    );
    assert_eq!(a.key_elements, vec!["fashion", "beachwear"]);
    assert!((a.confidence - 0.5).abs() < 1e-12);
    assert!(a.confidence <= FALLBACK_MAX_CONFIDENCE);
}

#[test]
fn matches_whole_words_and_plurals_only() {
    let a = metadata_fallback(&meta("Redesign for kids", "", &[], None));
    assert!(a.color_palette.is_empty(), "'redesign' must not match 'red'");
    assert_eq!(a.mood_descriptors, vec!["playful"]);
    assert_eq!(a.visual_style_descriptors, vec!["playful"]);
    assert_eq!(a.typography_suggestions, vec!["rounded display type"]);
}

#[test]
fn unknown_platform_adds_nothing() {
    let a = metadata_fallback(&meta("", "", &[], Some("fax")));
    assert!(a.composition_descriptors.is_empty());
    assert_eq!(a.confidence, FALLBACK_BASE_CONFIDENCE);
}
