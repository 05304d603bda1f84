use crate::{
    error::{FrameryError, FrameryResult},
    frame_policy::{FrameTheme, FrameType},
    model::{
        BackgroundSpec, CanvasSpec, EditorSettings, FrameSpec, ImageOverlay, ImageTransform,
        NoiseSpec, PatternSpec, Perspective3dSpec, ShadowSide, ShadowSpec, TextOverlay,
    },
};

/// Owns the editor settings and mediates every mutation.
///
/// The core reads settings by value and never writes them; gestures and UI
/// controls land here as partial patches. Each patch is applied to a copy,
/// validated, and only then committed, so the store never holds an invalid
/// state and a rejected patch leaves everything untouched.
#[derive(Clone, Debug, Default)]
pub struct SettingsStore {
    settings: EditorSettings,
}

macro_rules! apply_fields {
    ($target:expr, $patch:expr, { $($field:ident),* $(,)? }) => {
        $(
            if let Some(v) = $patch.$field {
                $target.$field = v;
            }
        )*
    };
}

/// Partial update for the screenshot transform group.
#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ScreenshotPatch {
    pub scale: Option<f64>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub rotation_deg: Option<f64>,
    pub corner_radius_px: Option<f64>,
    pub opacity: Option<f64>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FramePatch {
    pub enabled: Option<bool>,
    pub kind: Option<FrameType>,
    pub width_px: Option<f64>,
    pub theme: Option<FrameTheme>,
    pub color: Option<String>,
    /// `Some(None)` clears the padding override.
    pub padding_px: Option<Option<f64>>,
    pub title: Option<Option<String>>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ShadowPatch {
    pub enabled: Option<bool>,
    pub elevation_px: Option<f64>,
    pub side: Option<ShadowSide>,
    pub softness_px: Option<f64>,
    pub color: Option<String>,
    pub intensity: Option<f64>,
    pub offset_x: Option<Option<f64>>,
    pub offset_y: Option<Option<f64>>,
}

#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct CanvasPatch {
    pub container_width: Option<f64>,
    pub container_height: Option<f64>,
    pub padding: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PerspectivePatch {
    pub perspective_px: Option<f64>,
    pub rotate_x_deg: Option<f64>,
    pub rotate_y_deg: Option<f64>,
    pub rotate_z_deg: Option<f64>,
    pub translate_x_pct: Option<f64>,
    pub translate_y_pct: Option<f64>,
    pub scale: Option<f64>,
}

impl SettingsStore {
    pub fn new(settings: EditorSettings) -> FrameryResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn canvas(&self) -> &CanvasSpec {
        &self.settings.canvas
    }

    pub fn screenshot(&self) -> &ImageTransform {
        &self.settings.screenshot
    }

    pub fn frame(&self) -> &FrameSpec {
        &self.settings.frame
    }

    pub fn shadow(&self) -> &ShadowSpec {
        &self.settings.shadow
    }

    pub fn background(&self) -> &BackgroundSpec {
        &self.settings.background
    }

    pub fn perspective(&self) -> &Perspective3dSpec {
        &self.settings.perspective
    }

    fn commit(&mut self, candidate: EditorSettings) -> FrameryResult<()> {
        candidate.validate()?;
        self.settings = candidate;
        Ok(())
    }

    pub fn patch_screenshot(&mut self, patch: ScreenshotPatch) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        apply_fields!(next.screenshot, patch, {
            scale, offset_x, offset_y, rotation_deg, corner_radius_px, opacity,
        });
        self.commit(next)
    }

    pub fn patch_frame(&mut self, patch: FramePatch) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        apply_fields!(next.frame, patch, {
            enabled, kind, width_px, theme, color, padding_px, title,
        });
        self.commit(next)
    }

    pub fn patch_shadow(&mut self, patch: ShadowPatch) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        apply_fields!(next.shadow, patch, {
            enabled, elevation_px, side, softness_px, color, intensity, offset_x, offset_y,
        });
        self.commit(next)
    }

    pub fn patch_canvas(&mut self, patch: CanvasPatch) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        apply_fields!(next.canvas, patch, { container_width, container_height, padding });
        self.commit(next)
    }

    pub fn patch_perspective(&mut self, patch: PerspectivePatch) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        apply_fields!(next.perspective, patch, {
            perspective_px, rotate_x_deg, rotate_y_deg, rotate_z_deg,
            translate_x_pct, translate_y_pct, scale,
        });
        self.commit(next)
    }

    pub fn set_background(&mut self, background: BackgroundSpec) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        next.background = background;
        self.commit(next)
    }

    pub fn set_pattern(&mut self, pattern: PatternSpec) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        next.pattern = pattern;
        self.commit(next)
    }

    pub fn set_noise(&mut self, noise: NoiseSpec) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        next.noise = noise;
        self.commit(next)
    }

    pub fn add_text_overlay(&mut self, overlay: TextOverlay) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        next.text_overlays.push(overlay);
        self.commit(next)
    }

    pub fn add_image_overlay(&mut self, overlay: ImageOverlay) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        next.image_overlays.push(overlay);
        self.commit(next)
    }

    pub fn update_text_overlay(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut TextOverlay),
    ) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        let overlay = next
            .text_overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| FrameryError::validation(format!("unknown text overlay '{id}'")))?;
        update(overlay);
        self.commit(next)
    }

    pub fn update_image_overlay(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut ImageOverlay),
    ) -> FrameryResult<()> {
        let mut next = self.settings.clone();
        let overlay = next
            .image_overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| FrameryError::validation(format!("unknown image overlay '{id}'")))?;
        update(overlay);
        self.commit(next)
    }

    /// Returns whether an overlay with that id existed.
    pub fn remove_overlay(&mut self, id: &str) -> bool {
        let texts = self.settings.text_overlays.len();
        let images = self.settings.image_overlays.len();
        self.settings.text_overlays.retain(|o| o.id != id);
        self.settings.image_overlays.retain(|o| o.id != id);
        texts != self.settings.text_overlays.len() || images != self.settings.image_overlays.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_updates_only_named_fields() {
        let mut store = SettingsStore::default();
        store
            .patch_screenshot(ScreenshotPatch {
                offset_x: Some(42.0),
                ..ScreenshotPatch::default()
            })
            .unwrap();
        assert_eq!(store.screenshot().offset_x, 42.0);
        assert_eq!(store.screenshot().scale, 1.0);
    }

    #[test]
    fn rejected_patch_leaves_state_untouched() {
        let mut store = SettingsStore::default();
        let before = store.settings().clone();
        let err = store.patch_screenshot(ScreenshotPatch {
            scale: Some(99.0),
            ..ScreenshotPatch::default()
        });
        assert!(err.is_err());
        assert_eq!(store.settings(), &before);
    }

    #[test]
    fn frame_patch_can_clear_title() {
        let mut store = SettingsStore::default();
        store
            .patch_frame(FramePatch {
                enabled: Some(true),
                kind: Some(FrameType::WindowMac),
                title: Some(Some("shot".to_string())),
                ..FramePatch::default()
            })
            .unwrap();
        assert_eq!(store.frame().title.as_deref(), Some("shot"));

        store
            .patch_frame(FramePatch {
                title: Some(None),
                ..FramePatch::default()
            })
            .unwrap();
        assert_eq!(store.frame().title, None);
    }

    #[test]
    fn overlay_lifecycle() {
        let mut store = SettingsStore::default();
        store
            .add_text_overlay(TextOverlay {
                id: "t0".to_string(),
                text: "hi".to_string(),
                x_pct: 50.0,
                y_pct: 50.0,
                font_size_px: 24.0,
                font_family: "Inter".to_string(),
                color: "#000".to_string(),
                opacity: 1.0,
                visible: true,
                shadow: None,
            })
            .unwrap();

        store
            .update_text_overlay("t0", |o| o.text = "bye".to_string())
            .unwrap();
        assert_eq!(store.settings().text_overlays[0].text, "bye");

        assert!(store.update_text_overlay("missing", |_| {}).is_err());
        assert!(store.remove_overlay("t0"));
        assert!(!store.remove_overlay("t0"));
    }

    #[test]
    fn patch_deserializes_from_loose_json() {
        let patch: ScreenshotPatch =
            serde_json::from_str(r#"{ "offset_x": 10.5 }"#).unwrap();
        assert_eq!(patch.offset_x, Some(10.5));
        assert_eq!(patch.scale, None);
    }
}
