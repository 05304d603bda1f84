use kurbo::Rect;

use crate::{
    frame_policy::{FrameGeometry, frame_geometry},
    layout::DerivedLayout,
    model::{EditorSettings, FrameSpec, Perspective3dSpec},
    shadow::{ShadowParams, project_shadow},
};

/// The perspective-preview variant of the composer.
///
/// While any 3D transform is active the framed image leaves the 2D scene
/// graph and renders in a CSS-transformed overlay. Both paths read the same
/// [`DerivedLayout`] numbers; this struct carries them plus the transform
/// so the host can position a DOM node without recomputing anything.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Stage3d {
    /// Canvas size the overlay is clipped to.
    pub canvas_w: f64,
    pub canvas_h: f64,
    /// Untransformed placement of the framed group, canvas coordinates.
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Group-local placement of the inner image.
    pub image_left: f64,
    pub image_top: f64,
    pub image_width: f64,
    pub image_height: f64,
    pub perspective_px: f64,
    pub transform: Transform3d,
    pub frame: FrameSpec,
    pub chrome: FrameGeometry,
    pub shadow: Option<ShadowParams>,
}

/// The transform components applied to the group, in CSS application order.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Transform3d {
    pub translate_x_pct: f64,
    pub translate_y_pct: f64,
    pub scale: f64,
    pub rotate_x_deg: f64,
    pub rotate_y_deg: f64,
    /// Includes the screenshot's own 2D rotation so the two paths agree.
    pub rotate_z_deg: f64,
}

impl Transform3d {
    fn new(p: &Perspective3dSpec, screenshot_rotation_deg: f64) -> Self {
        Self {
            translate_x_pct: p.translate_x_pct,
            translate_y_pct: p.translate_y_pct,
            scale: p.scale,
            rotate_x_deg: p.rotate_x_deg,
            rotate_y_deg: p.rotate_y_deg,
            rotate_z_deg: p.rotate_z_deg + screenshot_rotation_deg,
        }
    }
}

impl Stage3d {
    /// Untransformed group rectangle; must match the 2D composer's group
    /// rect exactly (tested), or the preview jumps when perspective toggles.
    pub fn group_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }

    /// The CSS `transform` property value for the group node.
    pub fn css_transform(&self) -> String {
        let t = &self.transform;
        format!(
            "translate({}%, {}%) scale({}) rotateX({}deg) rotateY({}deg) rotateZ({}deg)",
            t.translate_x_pct, t.translate_y_pct, t.scale, t.rotate_x_deg, t.rotate_y_deg,
            t.rotate_z_deg
        )
    }

    /// The CSS `filter: drop-shadow(...)` value, when a shadow is on.
    pub fn css_drop_shadow(&self) -> Option<String> {
        self.shadow.map(|s| {
            format!(
                "drop-shadow({}px {}px {}px rgba({}, {}, {}, {}))",
                s.offset_x, s.offset_y, s.blur, s.color.r, s.color.g, s.color.b, s.opacity
            )
        })
    }
}

/// Build the 3D overlay description, or `None` while perspective is idle.
pub fn compose_stage3d(settings: &EditorSettings, layout: &DerivedLayout) -> Option<Stage3d> {
    if !settings.perspective.is_active() {
        return None;
    }

    let (image_left, image_top) = layout.image_local_origin();

    Some(Stage3d {
        canvas_w: layout.canvas_w,
        canvas_h: layout.canvas_h,
        left: layout.group_center_x - layout.framed_w / 2.0,
        top: layout.group_center_y - layout.framed_h / 2.0,
        width: layout.framed_w,
        height: layout.framed_h,
        image_left,
        image_top,
        image_width: layout.image_scaled_w,
        image_height: layout.image_scaled_h,
        perspective_px: settings.perspective.perspective_px,
        transform: Transform3d::new(&settings.perspective, settings.screenshot.rotation_deg),
        frame: settings.frame.clone(),
        chrome: frame_geometry(&settings.frame),
        shadow: project_shadow(&settings.shadow),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutPolicy, compute_layout};
    use kurbo::Size;

    fn layout_of(settings: &EditorSettings) -> DerivedLayout {
        compute_layout(
            Size::new(1600.0, 900.0),
            Size::new(1920.0, 1080.0),
            Size::new(1920.0, 1080.0),
            &settings.canvas,
            &settings.screenshot,
            &settings.frame,
            LayoutPolicy::Responsive,
        )
    }

    #[test]
    fn idle_perspective_builds_nothing() {
        let settings = EditorSettings::default();
        let layout = layout_of(&settings);
        assert_eq!(compose_stage3d(&settings, &layout), None);
    }

    #[test]
    fn group_rect_and_image_placement_mirror_the_layout() {
        let mut settings = EditorSettings::default();
        settings.perspective.rotate_x_deg = 15.0;
        settings.screenshot.rotation_deg = 5.0;
        let layout = layout_of(&settings);

        let stage = compose_stage3d(&settings, &layout).unwrap();
        let rect = stage.group_rect();
        assert!((rect.center().x - layout.group_center_x).abs() < 1e-9);
        assert!((rect.center().y - layout.group_center_y).abs() < 1e-9);
        assert_eq!(rect.width(), layout.framed_w);
        assert_eq!((stage.image_left, stage.image_top), layout.image_local_origin());
        assert_eq!(stage.transform.rotate_z_deg, 5.0);
    }

    #[test]
    fn css_transform_lists_components_in_order() {
        let mut settings = EditorSettings::default();
        settings.perspective.rotate_y_deg = 30.0;
        settings.perspective.translate_x_pct = 10.0;
        let layout = layout_of(&settings);
        let css = compose_stage3d(&settings, &layout).unwrap().css_transform();
        assert_eq!(
            css,
            "translate(10%, 0%) scale(1) rotateX(0deg) rotateY(30deg) rotateZ(0deg)"
        );
    }

    #[test]
    fn drop_shadow_uses_projected_params() {
        let mut settings = EditorSettings::default();
        settings.perspective.scale = 1.2;
        let layout = layout_of(&settings);
        let stage = compose_stage3d(&settings, &layout).unwrap();
        let css = stage.css_drop_shadow().unwrap();
        assert!(css.starts_with("drop-shadow(0px 20px 40px rgba("));
    }
}
