use crate::{
    error::{FrameryError, FrameryResult},
    layout::DerivedLayout,
    model::{MAX_SCALE, MIN_FONT_SIZE_PX, MIN_OVERLAY_SIZE_PX, MIN_SCALE},
    store::{ScreenshotPatch, SettingsStore},
};

/// What a drag/transform gesture was aimed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureTarget {
    MainImage,
    Text(String),
    Image(String),
}

/// An explicit gesture payload.
///
/// Renderers report what the user did as deltas rather than letting the
/// controller read positions back off rendered nodes; this keeps the
/// controller independent of any particular backend's node API.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureDelta {
    pub dx: f64,
    pub dy: f64,
    pub dscale: f64,
    pub drotation_deg: f64,
}

impl Default for GestureDelta {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            dscale: 1.0,
            drotation_deg: 0.0,
        }
    }
}

impl GestureDelta {
    pub fn drag(dx: f64, dy: f64) -> Self {
        Self { dx, dy, ..Self::default() }
    }

    pub fn zoom(dscale: f64) -> Self {
        Self { dscale, ..Self::default() }
    }
}

/// Fold a gesture back into the settings store.
///
/// The layout of the pass the gesture happened on is needed to convert
/// canvas-pixel drags into the stored units: text overlays keep percentage
/// positions, image overlays keep absolute pixels. Scale and size changes
/// are clamped to the model's floors, mirroring the transform-handle
/// bounds in the editor.
#[tracing::instrument(level = "debug", skip(store, layout))]
pub fn apply_gesture(
    store: &mut SettingsStore,
    target: &GestureTarget,
    delta: &GestureDelta,
    layout: &DerivedLayout,
) -> FrameryResult<()> {
    if !(delta.dx.is_finite()
        && delta.dy.is_finite()
        && delta.dscale.is_finite()
        && delta.drotation_deg.is_finite())
    {
        return Err(FrameryError::validation("gesture delta must be finite"));
    }

    match target {
        GestureTarget::MainImage => {
            let current = *store.screenshot();
            store.patch_screenshot(ScreenshotPatch {
                offset_x: Some(current.offset_x + delta.dx),
                offset_y: Some(current.offset_y + delta.dy),
                scale: Some((current.scale * delta.dscale).clamp(MIN_SCALE, MAX_SCALE)),
                rotation_deg: Some(current.rotation_deg + delta.drotation_deg),
                ..ScreenshotPatch::default()
            })
        }
        GestureTarget::Text(id) => {
            if layout.canvas_w <= 0.0 || layout.canvas_h <= 0.0 {
                return Err(FrameryError::validation(
                    "cannot convert text drag without a canvas",
                ));
            }
            store.update_text_overlay(id, |overlay| {
                overlay.x_pct += delta.dx / layout.canvas_w * 100.0;
                overlay.y_pct += delta.dy / layout.canvas_h * 100.0;
                overlay.font_size_px =
                    (overlay.font_size_px * delta.dscale.abs()).round().max(MIN_FONT_SIZE_PX);
            })
        }
        GestureTarget::Image(id) => store.update_image_overlay(id, |overlay| {
            overlay.x_px += delta.dx;
            overlay.y_px += delta.dy;
            overlay.size_px =
                (overlay.size_px * delta.dscale.abs()).round().max(MIN_OVERLAY_SIZE_PX);
            overlay.rotation_deg += delta.drotation_deg;
        }),
    }
}
