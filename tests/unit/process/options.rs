use super::*;

#[test]
fn defaults_match_sprite_export_conventions() {
    let opts = ProcessorOptions::default();
    assert!(opts.only_visible_layers);
    assert!(!opts.include_background_layer);
    assert!(opts.merge_duplicate_frames);
    assert!(!opts.premultiply_alpha);
    assert_eq!(opts.layout, AtlasLayout::Square);
    assert!(!opts.threading.parallel);
}

#[test]
fn json_overrides_only_named_fields() {
    let opts = ProcessorOptions::from_json_str(
        r#"{ "layout": "Horizontal", "border_padding": 1, "threading": { "parallel": true } }"#,
    )
    .unwrap();
    assert_eq!(opts.layout, AtlasLayout::Horizontal);
    assert_eq!(opts.border_padding, 1);
    assert!(opts.threading.parallel);
    assert_eq!(opts.threading.threads, None);
    assert!(opts.merge_duplicate_frames);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ProcessorOptions::from_json_str("{ spacing: }").unwrap_err();
    assert!(matches!(err, SpriteforgeError::Serde(_)));
}
