use crate::{
    error::{FrameryError, FrameryResult},
    frame_policy::{FrameTheme, FrameType},
};

/// Smallest and largest allowed screenshot scale (fraction of the content box).
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 2.0;
/// Gesture floors for overlay resizing.
pub const MIN_FONT_SIZE_PX: f64 = 8.0;
pub const MIN_OVERLAY_SIZE_PX: f64 = 20.0;

/// Design-target canvas: output dimensions plus the uniform content inset.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasSpec {
    pub container_width: f64,
    pub container_height: f64,
    pub padding: f64,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            container_width: 1920.0,
            container_height: 1080.0,
            padding: 40.0,
        }
    }
}

impl CanvasSpec {
    pub fn from_preset(preset: &AspectPreset, padding: f64) -> Self {
        Self {
            container_width: f64::from(preset.width),
            container_height: f64::from(preset.height),
            padding,
        }
    }
}

/// A named output-size preset (social formats and standards).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AspectPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const ASPECT_PRESETS: [AspectPreset; 8] = [
    AspectPreset { id: "instagram-square", name: "Instagram Square", width: 1080, height: 1080 },
    AspectPreset { id: "instagram-portrait", name: "Instagram Portrait", width: 1080, height: 1350 },
    AspectPreset { id: "instagram-story", name: "Instagram Story", width: 1080, height: 1920 },
    AspectPreset { id: "facebook-post", name: "Facebook Post", width: 1200, height: 630 },
    AspectPreset { id: "twitter-post", name: "Twitter/X Post", width: 1200, height: 675 },
    AspectPreset { id: "youtube-thumbnail", name: "YouTube Thumbnail", width: 1280, height: 720 },
    AspectPreset { id: "square", name: "Square", width: 1080, height: 1080 },
    AspectPreset { id: "widescreen", name: "Widescreen", width: 1920, height: 1080 },
];

impl AspectPreset {
    pub fn all() -> &'static [Self] {
        &ASPECT_PRESETS
    }

    pub fn lookup(id: &str) -> Option<&'static Self> {
        ASPECT_PRESETS.iter().find(|p| p.id == id)
    }
}

/// User-controlled placement of the main screenshot.
///
/// `offset_x`/`offset_y` displace the image group's center from the canvas
/// center; mutated only through [`crate::SettingsStore`] patches or the
/// interaction controller.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub rotation_deg: f64,
    pub corner_radius_px: f64,
    pub opacity: f64,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation_deg: 0.0,
            corner_radius_px: 12.0,
            opacity: 1.0,
        }
    }
}

/// Chrome drawn around the image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameSpec {
    pub enabled: bool,
    pub kind: FrameType,
    pub width_px: f64,
    pub theme: FrameTheme,
    /// CSS color used by border-style frames (solid, dotted).
    pub color: String,
    pub padding_px: Option<f64>,
    pub title: Option<String>,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: FrameType::None,
            width_px: 4.0,
            theme: FrameTheme::Light,
            color: "#1a1a1a".to_string(),
            padding_px: None,
            title: None,
        }
    }
}

impl FrameSpec {
    /// Whether any chrome is drawn at all.
    pub fn shows(&self) -> bool {
        self.enabled && self.kind != FrameType::None
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowSide {
    #[default]
    Bottom,
    Right,
    BottomRight,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShadowSpec {
    pub enabled: bool,
    pub elevation_px: f64,
    pub side: ShadowSide,
    pub softness_px: f64,
    pub color: String,
    pub intensity: f64,
    /// Explicit offsets override the side-derived ones when both are set.
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
}

impl Default for ShadowSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            elevation_px: 20.0,
            side: ShadowSide::Bottom,
            softness_px: 40.0,
            color: "rgba(0, 0, 0, 0.35)".to_string(),
            intensity: 0.6,
            offset_x: None,
            offset_y: None,
        }
    }
}

/// CSS-3D perspective applied to the framed group in the preview overlay.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Perspective3dSpec {
    pub perspective_px: f64,
    pub rotate_x_deg: f64,
    pub rotate_y_deg: f64,
    pub rotate_z_deg: f64,
    pub translate_x_pct: f64,
    pub translate_y_pct: f64,
    pub scale: f64,
}

impl Default for Perspective3dSpec {
    fn default() -> Self {
        Self {
            perspective_px: 1000.0,
            rotate_x_deg: 0.0,
            rotate_y_deg: 0.0,
            rotate_z_deg: 0.0,
            translate_x_pct: 0.0,
            translate_y_pct: 0.0,
            scale: 1.0,
        }
    }
}

impl Perspective3dSpec {
    pub fn is_active(&self) -> bool {
        self.rotate_x_deg != 0.0
            || self.rotate_y_deg != 0.0
            || self.rotate_z_deg != 0.0
            || self.translate_x_pct != 0.0
            || self.translate_y_pct != 0.0
            || self.scale != 1.0
    }
}

/// What fills the canvas behind everything else.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackgroundKind {
    Solid { color: String },
    Gradient { css: String },
    Image { source: String, opacity: f64, blur_px: f64 },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundSpec {
    #[serde(flatten)]
    pub kind: BackgroundKind,
    pub corner_radius_px: f64,
    /// Grain intensity over the background, 0..=100.
    pub noise: f64,
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Solid {
                color: "#ffffff".to_string(),
            },
            corner_radius_px: 0.0,
            noise: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Dots,
    Grid,
    Diagonal,
}

/// Decorative repeating texture drawn between background and image group.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PatternSpec {
    pub enabled: bool,
    pub kind: PatternKind,
    pub scale: f64,
    pub spacing_px: f64,
    pub color: String,
    pub opacity: f64,
}

impl Default for PatternSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: PatternKind::Dots,
            scale: 1.0,
            spacing_px: 24.0,
            color: "#00000022".to_string(),
            opacity: 0.5,
        }
    }
}

/// Film-grain layer over the whole canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseSpec {
    pub enabled: bool,
    pub opacity: f64,
    /// Seed for the deterministic grain texture.
    pub seed: u64,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            opacity: 0.15,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextShadow {
    pub color: String,
    pub blur_px: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// A positioned text entity, independent of the image group.
///
/// Position is stored in percent of the canvas (image overlays use absolute
/// pixels; the asymmetry is deliberate and load-bearing for gestures).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextOverlay {
    pub id: String,
    pub text: String,
    pub x_pct: f64,
    pub y_pct: f64,
    pub font_size_px: f64,
    pub font_family: String,
    pub color: String,
    pub opacity: f64,
    pub visible: bool,
    pub shadow: Option<TextShadow>,
}

/// A positioned image entity; position is the overlay's center in canvas px.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageOverlay {
    pub id: String,
    pub source: String,
    pub x_px: f64,
    pub y_px: f64,
    pub size_px: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub visible: bool,
}

/// The full editor state for one composition.
///
/// Plain serializable data; the layout engine and the composers read it by
/// value and never mutate it. All mutation flows through
/// [`crate::SettingsStore`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub canvas: CanvasSpec,
    pub screenshot: ImageTransform,
    pub frame: FrameSpec,
    pub shadow: ShadowSpec,
    pub background: BackgroundSpec,
    pub pattern: PatternSpec,
    pub noise: NoiseSpec,
    pub perspective: Perspective3dSpec,
    pub text_overlays: Vec<TextOverlay>,
    pub image_overlays: Vec<ImageOverlay>,
}

impl EditorSettings {
    pub fn validate(&self) -> FrameryResult<()> {
        if self.canvas.container_width <= 0.0 || self.canvas.container_height <= 0.0 {
            return Err(FrameryError::validation(
                "canvas container dimensions must be > 0",
            ));
        }
        if self.canvas.padding < 0.0 {
            return Err(FrameryError::validation("canvas padding must be >= 0"));
        }
        let min_side = self.canvas.container_width.min(self.canvas.container_height);
        if self.canvas.padding * 2.0 >= min_side {
            return Err(FrameryError::validation(
                "canvas padding must leave room for content (padding*2 < min side)",
            ));
        }
        if !(MIN_SCALE..=MAX_SCALE).contains(&self.screenshot.scale) {
            return Err(FrameryError::validation(format!(
                "screenshot scale must be within [{MIN_SCALE}, {MAX_SCALE}]"
            )));
        }
        if !(0.0..=1.0).contains(&self.screenshot.opacity) {
            return Err(FrameryError::validation(
                "screenshot opacity must be within [0, 1]",
            ));
        }
        if self.screenshot.corner_radius_px < 0.0 {
            return Err(FrameryError::validation(
                "screenshot corner radius must be >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.shadow.intensity) {
            return Err(FrameryError::validation(
                "shadow intensity must be within [0, 1]",
            ));
        }
        if self.shadow.softness_px < 0.0 {
            return Err(FrameryError::validation("shadow softness must be >= 0"));
        }
        if !(0.0..=100.0).contains(&self.background.noise) {
            return Err(FrameryError::validation(
                "background noise must be within [0, 100]",
            ));
        }
        if self.perspective.perspective_px <= 0.0 {
            return Err(FrameryError::validation("perspective must be > 0 px"));
        }

        let mut seen = std::collections::BTreeSet::new();
        for overlay in &self.text_overlays {
            if overlay.id.trim().is_empty() {
                return Err(FrameryError::validation("text overlay id must be non-empty"));
            }
            if !seen.insert(overlay.id.as_str()) {
                return Err(FrameryError::validation(format!(
                    "duplicate overlay id '{}'",
                    overlay.id
                )));
            }
            if overlay.font_size_px <= 0.0 {
                return Err(FrameryError::validation(format!(
                    "text overlay '{}' font size must be > 0",
                    overlay.id
                )));
            }
        }
        for overlay in &self.image_overlays {
            if overlay.id.trim().is_empty() {
                return Err(FrameryError::validation(
                    "image overlay id must be non-empty",
                ));
            }
            if !seen.insert(overlay.id.as_str()) {
                return Err(FrameryError::validation(format!(
                    "duplicate overlay id '{}'",
                    overlay.id
                )));
            }
            if overlay.size_px <= 0.0 {
                return Err(FrameryError::validation(format!(
                    "image overlay '{}' size must be > 0",
                    overlay.id
                )));
            }
        }

        Ok(())
    }
}
