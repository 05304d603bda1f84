//! Settings documents are the configuration surface; hand-edited or stale
//! files must degrade gracefully instead of failing to load.

use framery::{
    BackgroundKind, EditorSettings, FrameType, GestureDelta, GestureTarget, LayoutPolicy,
    ScreenshotPatch, SettingsStore, Size, apply_gesture, compute_layout,
};

#[test]
fn empty_document_yields_defaults() {
    let settings: EditorSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, EditorSettings::default());
    settings.validate().unwrap();
}

#[test]
fn unknown_frame_kind_degrades_to_none() {
    let settings: EditorSettings = serde_json::from_str(
        r##"{
            "frame": {
                "enabled": true,
                "kind": "vhs-tape",
                "width_px": 4.0,
                "theme": "light",
                "color": "#000",
                "padding_px": null,
                "title": null
            }
        }"##,
    )
    .unwrap();
    assert_eq!(settings.frame.kind, FrameType::None);
    // A frame that degraded to none contributes no geometry.
    let layout = compute_layout(
        Size::new(1600.0, 900.0),
        Size::new(1920.0, 1080.0),
        Size::new(1920.0, 1080.0),
        &settings.canvas,
        &settings.screenshot,
        &settings.frame,
        LayoutPolicy::Responsive,
    );
    assert_eq!(layout.framed_w, layout.image_scaled_w);
}

#[test]
fn background_variants_roundtrip() {
    let mut settings = EditorSettings::default();
    settings.background.kind = BackgroundKind::Image {
        source: "bg/paper.jpg".to_string(),
        opacity: 0.9,
        blur_px: 6.0,
    };
    let text = serde_json::to_string(&settings).unwrap();
    let back: EditorSettings = serde_json::from_str(&text).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn gesture_drives_store_and_next_layout() {
    let mut store = SettingsStore::default();
    let layout = compute_layout(
        Size::new(1600.0, 900.0),
        Size::new(1920.0, 1080.0),
        Size::new(1920.0, 1080.0),
        store.canvas(),
        store.screenshot(),
        store.frame(),
        LayoutPolicy::Responsive,
    );

    apply_gesture(
        &mut store,
        &GestureTarget::MainImage,
        &GestureDelta::drag(60.0, 0.0),
        &layout,
    )
    .unwrap();

    let moved = compute_layout(
        Size::new(1600.0, 900.0),
        Size::new(1920.0, 1080.0),
        Size::new(1920.0, 1080.0),
        store.canvas(),
        store.screenshot(),
        store.frame(),
        LayoutPolicy::Responsive,
    );
    assert_eq!(moved.group_center_x, layout.group_center_x + 60.0);
    // Only position changed; sizing is untouched.
    assert_eq!(moved.image_scaled_w, layout.image_scaled_w);
}

#[test]
fn patches_parse_from_partial_json() {
    let mut store = SettingsStore::default();
    let patch: ScreenshotPatch = serde_json::from_str(r#"{"scale": 1.5}"#).unwrap();
    store.patch_screenshot(patch).unwrap();
    assert_eq!(store.screenshot().scale, 1.5);

    let bad: ScreenshotPatch = serde_json::from_str(r#"{"scale": 42.0}"#).unwrap();
    assert!(store.patch_screenshot(bad).is_err());
    assert_eq!(store.screenshot().scale, 1.5);
}
