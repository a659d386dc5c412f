use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AdcraftError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(AdcraftError::decode("x").to_string().contains("decode error:"));
    assert!(AdcraftError::fetch("x").to_string().contains("fetch error:"));
    assert!(AdcraftError::render("x").to_string().contains("render error:"));
    assert!(
        AdcraftError::storage("x")
            .to_string()
            .contains("storage error:")
    );
    assert!(
        AdcraftError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AdcraftError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
