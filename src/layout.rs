use kurbo::Size;

use crate::{
    frame_policy::{FrameGeometry, frame_geometry},
    model::{CanvasSpec, FrameSpec, ImageTransform, MAX_SCALE, MIN_SCALE},
};

/// Viewport headroom allowed beyond the container on desktop.
pub const VIEWPORT_HEADROOM: f64 = 1.1;
/// Unconditional canvas floor on desktop, in px.
pub const MIN_CANVAS_PX: f64 = 300.0;
/// Viewports narrower than this are treated as mobile.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;
/// On mobile, padding may not exceed this fraction of the smaller dimension.
pub const MOBILE_PADDING_FRACTION: f64 = 0.1;
/// Shrink applied to the fitted image when chrome needs room (responsive policy).
pub const FRAME_CONTRACTION: f64 = 0.88;

/// Container sizing constants for [`fit_container`].
const SIDE_PANELS_WIDTH_PX: f64 = 640.0;
const DESKTOP_H_ALLOWANCE_PX: f64 = 48.0;
const MOBILE_H_ALLOWANCE_PX: f64 = 32.0;
const DESKTOP_V_ALLOWANCE_PX: f64 = 200.0;
const MOBILE_V_ALLOWANCE_PX: f64 = 140.0;
const MIN_AVAILABLE_PX: f64 = 320.0;
const MAX_CONTAINER_W_PX: f64 = 3000.0;
const MAX_CONTAINER_H_PX: f64 = 1500.0;

/// Which revision of the sizing rules to apply.
///
/// The two observed rule sets disagree on the canvas floor and on frame
/// contraction; both ship as named presets and the caller selects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPolicy {
    /// Unconditional 300 px canvas floor, padding applied verbatim, no
    /// frame contraction.
    Legacy,
    /// Desktop behaves like `Legacy` plus frame contraction; mobile drops
    /// the floor and the viewport headroom and clamps padding instead.
    #[default]
    Responsive,
}

impl LayoutPolicy {
    fn is_mobile(self, viewport: Size) -> bool {
        self == Self::Responsive && viewport.width < MOBILE_BREAKPOINT_PX
    }

    fn headroom(self, viewport: Size) -> f64 {
        if self.is_mobile(viewport) { 1.0 } else { VIEWPORT_HEADROOM }
    }

    fn contraction(self, frame: &FrameSpec) -> f64 {
        if self == Self::Responsive && frame.shows() {
            FRAME_CONTRACTION
        } else {
            1.0
        }
    }
}

/// Every rectangle the renderers need, derived in one place.
///
/// Recomputed on each relevant state change and never persisted. Both
/// composer variants read these numbers verbatim; nothing downstream may
/// rederive them. All fields are finite and non-negative (centers and the
/// image origin may be negative when the user drags off-canvas).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DerivedLayout {
    pub canvas_w: f64,
    pub canvas_h: f64,
    pub content_w: f64,
    pub content_h: f64,
    pub image_scaled_w: f64,
    pub image_scaled_h: f64,
    pub frame_offset: f64,
    pub window_padding: f64,
    pub window_header: f64,
    pub eclipse_border: f64,
    pub framed_w: f64,
    pub framed_h: f64,
    pub group_center_x: f64,
    pub group_center_y: f64,
    /// Canvas coordinates of the inner image's top-left corner.
    pub image_x: f64,
    pub image_y: f64,
}

impl DerivedLayout {
    /// Minimal well-formed layout used when inputs are unusable.
    ///
    /// A 1x1 canvas with a zero-size image: downstream renderers draw
    /// nothing rather than dividing by zero or seeing NaN.
    pub fn degenerate() -> Self {
        Self {
            canvas_w: 1.0,
            canvas_h: 1.0,
            group_center_x: 0.5,
            group_center_y: 0.5,
            ..Self::default()
        }
    }

    /// Group-local position of the inner image (chrome insets applied).
    ///
    /// The eclipse ring spans half its thickness on each side, so it
    /// contributes `eclipse_border / 2` here while counting once in the
    /// framed size.
    pub fn image_local_origin(&self) -> (f64, f64) {
        (
            self.frame_offset + self.window_padding + self.eclipse_border / 2.0,
            self.frame_offset + self.window_padding + self.eclipse_border / 2.0 + self.window_header,
        )
    }
}

fn usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Derive the full layout for one composition pass.
///
/// Pure and deterministic: identical inputs produce identical outputs, so
/// redundant recomputation (resize events, editor re-renders, export) is
/// harmless and the interactive preview and the export raster cannot
/// drift apart.
///
/// `container` is the on-screen container for the canvas (usually
/// [`fit_container`] of the design target); `canvas` supplies the content
/// inset. Degenerate inputs (zero-size image, empty container or viewport,
/// NaN anywhere) yield [`DerivedLayout::degenerate`] instead of an error.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compute_layout(
    image: Size,
    container: Size,
    viewport: Size,
    canvas: &CanvasSpec,
    screenshot: &ImageTransform,
    frame: &FrameSpec,
    policy: LayoutPolicy,
) -> DerivedLayout {
    if !usable(image.width)
        || !usable(image.height)
        || !usable(container.width)
        || !usable(container.height)
        || !usable(viewport.width)
        || !usable(viewport.height)
    {
        return DerivedLayout::degenerate();
    }

    let image_aspect = image.width / image.height;
    let canvas_aspect = container.width / container.height;
    let mobile = policy.is_mobile(viewport);
    let headroom = policy.headroom(viewport);

    let avail_w = (viewport.width * headroom).min(container.width);
    let avail_h = (viewport.height * headroom).min(container.height);

    let padding = finite_or_zero(canvas.padding).max(0.0);
    let applied_padding = if mobile {
        padding.min(MOBILE_PADDING_FRACTION * avail_w.min(avail_h))
    } else {
        padding
    };

    // Size the canvas along the limiting axis, preserving the container
    // aspect ratio.
    let (mut canvas_w, mut canvas_h) = if avail_w / avail_h > canvas_aspect {
        let h = avail_h - applied_padding * 2.0;
        (h * canvas_aspect, h)
    } else {
        let w = avail_w - applied_padding * 2.0;
        (w, w / canvas_aspect)
    };

    if !mobile {
        canvas_w = canvas_w.max(MIN_CANVAS_PX);
        canvas_h = canvas_h.max(MIN_CANVAS_PX);
    }
    // Keep divisors alive even when padding ate the whole viewport.
    canvas_w = canvas_w.max(1.0);
    canvas_h = canvas_h.max(1.0);

    let content_w = (canvas_w - applied_padding * 2.0).max(0.0);
    let content_h = (canvas_h - applied_padding * 2.0).max(0.0);

    let scale = finite_or_zero(screenshot.scale).clamp(MIN_SCALE, MAX_SCALE);
    let contraction = policy.contraction(frame);

    let (mut image_scaled_w, mut image_scaled_h) = if content_w <= 0.0 || content_h <= 0.0 {
        (0.0, 0.0)
    } else if content_w / content_h > image_aspect {
        let h = content_h * scale;
        (h * image_aspect, h)
    } else {
        let w = content_w * scale;
        (w, w / image_aspect)
    };
    image_scaled_w *= contraction;
    image_scaled_h *= contraction;

    let FrameGeometry {
        frame_offset,
        window_padding,
        window_header,
        eclipse_border,
        radius_scale: _,
    } = frame_geometry(frame);

    let framed_w = image_scaled_w + frame_offset * 2.0 + window_padding * 2.0 + eclipse_border;
    let framed_h = image_scaled_h
        + frame_offset * 2.0
        + window_padding * 2.0
        + window_header
        + eclipse_border;

    let group_center_x = canvas_w / 2.0 + finite_or_zero(screenshot.offset_x);
    let group_center_y = canvas_h / 2.0 + finite_or_zero(screenshot.offset_y);
    let image_x =
        group_center_x - framed_w / 2.0 + frame_offset + window_padding + eclipse_border / 2.0;
    let image_y = group_center_y - framed_h / 2.0
        + frame_offset
        + window_padding
        + eclipse_border / 2.0
        + window_header;

    DerivedLayout {
        canvas_w,
        canvas_h,
        content_w,
        content_h,
        image_scaled_w,
        image_scaled_h,
        frame_offset,
        window_padding,
        window_header,
        eclipse_border,
        framed_w,
        framed_h,
        group_center_x,
        group_center_y,
        image_x,
        image_y,
    }
}

/// Fit a design-target size into the viewport's working area.
///
/// Reserves room for the editor's side panels and header/footer (none on
/// mobile), never upscales past the design target, and caps the result so
/// oversized monitors do not produce oversized canvases.
pub fn fit_container(target: Size, viewport: Size) -> Size {
    if !usable(target.width) || !usable(target.height) {
        return Size::new(1.0, 1.0);
    }
    if !usable(viewport.width) || !usable(viewport.height) {
        return target;
    }

    let mobile = viewport.width < MOBILE_BREAKPOINT_PX;
    let side_panels = if mobile { 0.0 } else { SIDE_PANELS_WIDTH_PX };
    let h_allowance = if mobile { MOBILE_H_ALLOWANCE_PX } else { DESKTOP_H_ALLOWANCE_PX };
    let v_allowance = if mobile { MOBILE_V_ALLOWANCE_PX } else { DESKTOP_V_ALLOWANCE_PX };
    let headroom = if mobile { 1.0 } else { VIEWPORT_HEADROOM };

    let avail_w = (viewport.width - side_panels - h_allowance).max(MIN_AVAILABLE_PX);
    let avail_h = (viewport.height - v_allowance).max(MIN_AVAILABLE_PX);

    let max_w = (avail_w * headroom).min(MAX_CONTAINER_W_PX);
    let max_h = (avail_h * headroom).min(MAX_CONTAINER_H_PX);

    let scale = (max_w / target.width)
        .min(max_h / target.height)
        .min(1.0);
    Size::new(target.width * scale, target.height * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_policy::FrameType;

    fn layout_for(
        image: (f64, f64),
        frame: &FrameSpec,
        policy: LayoutPolicy,
    ) -> DerivedLayout {
        compute_layout(
            Size::new(image.0, image.1),
            Size::new(1920.0, 1080.0),
            Size::new(1920.0, 1080.0),
            &CanvasSpec::default(),
            &ImageTransform::default(),
            frame,
            policy,
        )
    }

    fn mac_frame() -> FrameSpec {
        FrameSpec {
            enabled: true,
            kind: FrameType::WindowMac,
            ..FrameSpec::default()
        }
    }

    #[test]
    fn identical_inputs_yield_identical_layouts() {
        let a = layout_for((1600.0, 900.0), &mac_frame(), LayoutPolicy::Responsive);
        let b = layout_for((1600.0, 900.0), &mac_frame(), LayoutPolicy::Responsive);
        assert_eq!(a, b);
    }

    #[test]
    fn hd_screenshot_in_hd_container() {
        let l = layout_for((1600.0, 900.0), &FrameSpec::default(), LayoutPolicy::Legacy);

        assert_eq!(l.canvas_w, 1840.0);
        assert!((l.canvas_h - 1840.0 * 1080.0 / 1920.0).abs() < 1e-9);
        assert_eq!(l.content_w, 1760.0);

        let aspect = l.image_scaled_w / l.image_scaled_h;
        assert!((aspect - 1600.0 / 900.0).abs() < 1e-9);

        // No frame: the framed box is exactly the image box.
        assert_eq!(l.frame_offset, 0.0);
        assert_eq!(l.window_header, 0.0);
        assert_eq!(l.framed_w, l.image_scaled_w);
        assert_eq!(l.framed_h, l.image_scaled_h);
    }

    #[test]
    fn no_frame_baseline_holds_across_scales() {
        for scale in [0.1, 0.5, 1.0, 1.7, 2.0] {
            let screenshot = ImageTransform {
                scale,
                offset_x: 33.0,
                offset_y: -12.0,
                ..ImageTransform::default()
            };
            let l = compute_layout(
                Size::new(800.0, 600.0),
                Size::new(1280.0, 720.0),
                Size::new(1440.0, 900.0),
                &CanvasSpec::default(),
                &screenshot,
                &FrameSpec::default(),
                LayoutPolicy::Legacy,
            );
            assert_eq!(l.framed_w, l.image_scaled_w);
            assert_eq!(l.framed_h, l.image_scaled_h);
        }
    }

    #[test]
    fn window_chrome_adds_header_once_and_contracts_image() {
        let bare = layout_for((1600.0, 900.0), &FrameSpec::default(), LayoutPolicy::Responsive);
        let framed = layout_for((1600.0, 900.0), &mac_frame(), LayoutPolicy::Responsive);

        assert_eq!(framed.window_header, 40.0);
        assert_eq!(framed.window_padding, 20.0);
        assert!((framed.image_scaled_w - bare.image_scaled_w * FRAME_CONTRACTION).abs() < 1e-9);
        assert_eq!(
            framed.framed_h,
            framed.image_scaled_h + framed.window_padding * 2.0 + framed.window_header
        );
        assert_eq!(
            framed.framed_w,
            framed.image_scaled_w + framed.window_padding * 2.0
        );
    }

    #[test]
    fn legacy_policy_never_contracts() {
        let bare = layout_for((1600.0, 900.0), &FrameSpec::default(), LayoutPolicy::Legacy);
        let framed = layout_for((1600.0, 900.0), &mac_frame(), LayoutPolicy::Legacy);
        assert_eq!(framed.image_scaled_w, bare.image_scaled_w);
    }

    #[test]
    fn group_center_tracks_offset_and_image_sits_inside_chrome() {
        let screenshot = ImageTransform {
            offset_x: 100.0,
            offset_y: -50.0,
            ..ImageTransform::default()
        };
        let l = compute_layout(
            Size::new(1600.0, 900.0),
            Size::new(1920.0, 1080.0),
            Size::new(1920.0, 1080.0),
            &CanvasSpec::default(),
            &screenshot,
            &mac_frame(),
            LayoutPolicy::Responsive,
        );
        assert_eq!(l.group_center_x, l.canvas_w / 2.0 + 100.0);
        assert_eq!(l.group_center_y, l.canvas_h / 2.0 - 50.0);
        assert_eq!(
            l.image_x,
            l.group_center_x - l.framed_w / 2.0 + l.window_padding
        );
        assert_eq!(
            l.image_y,
            l.group_center_y - l.framed_h / 2.0 + l.window_padding + l.window_header
        );
        assert_eq!(l.image_local_origin(), (20.0, 60.0));
    }

    #[test]
    fn degenerate_inputs_do_not_produce_nan() {
        let cases = [
            Size::new(0.0, 900.0),
            Size::new(1600.0, 0.0),
            Size::new(f64::NAN, 900.0),
            Size::new(-100.0, 900.0),
        ];
        for image in cases {
            let l = compute_layout(
                image,
                Size::new(1920.0, 1080.0),
                Size::new(1920.0, 1080.0),
                &CanvasSpec::default(),
                &ImageTransform::default(),
                &FrameSpec::default(),
                LayoutPolicy::Responsive,
            );
            assert_eq!(l, DerivedLayout::degenerate());
        }

        let l = compute_layout(
            Size::new(1600.0, 900.0),
            Size::new(1920.0, 0.0),
            Size::new(1920.0, 1080.0),
            &CanvasSpec::default(),
            &ImageTransform::default(),
            &FrameSpec::default(),
            LayoutPolicy::Responsive,
        );
        assert_eq!(l, DerivedLayout::degenerate());
    }

    #[test]
    fn every_output_is_finite_and_sizes_non_negative() {
        let extremes = [
            (1.0, 10000.0),
            (10000.0, 1.0),
            (1.0, 1.0),
            (9999.0, 10001.0),
        ];
        for (w, h) in extremes {
            for policy in [LayoutPolicy::Legacy, LayoutPolicy::Responsive] {
                let l = compute_layout(
                    Size::new(w, h),
                    Size::new(320.0, 480.0),
                    Size::new(320.0, 480.0),
                    &CanvasSpec {
                        container_width: 320.0,
                        container_height: 480.0,
                        padding: 150.0,
                    },
                    &ImageTransform::default(),
                    &mac_frame(),
                    policy,
                );
                for v in [
                    l.canvas_w,
                    l.canvas_h,
                    l.content_w,
                    l.content_h,
                    l.image_scaled_w,
                    l.image_scaled_h,
                    l.framed_w,
                    l.framed_h,
                ] {
                    assert!(v.is_finite() && v >= 0.0, "bad value {v} for {w}x{h}");
                }
                assert!(l.group_center_x.is_finite() && l.group_center_y.is_finite());
            }
        }
    }

    #[test]
    fn mobile_clamps_padding_instead_of_flooring_canvas() {
        let l = compute_layout(
            Size::new(1600.0, 900.0),
            Size::new(360.0, 640.0),
            Size::new(360.0, 640.0),
            &CanvasSpec {
                container_width: 360.0,
                container_height: 640.0,
                padding: 150.0,
            },
            &ImageTransform::default(),
            &FrameSpec::default(),
            LayoutPolicy::Responsive,
        );
        // Padding collapses to 10% of the smaller available dimension, so
        // the content box survives on a phone-sized viewport.
        assert!(l.content_w > 0.0 && l.content_h > 0.0);
        assert!(l.canvas_w <= 360.0);

        // The same inputs under the legacy rules stretch to the floor.
        let legacy = compute_layout(
            Size::new(1600.0, 900.0),
            Size::new(360.0, 640.0),
            Size::new(360.0, 640.0),
            &CanvasSpec {
                container_width: 360.0,
                container_height: 640.0,
                padding: 150.0,
            },
            &ImageTransform::default(),
            &FrameSpec::default(),
            LayoutPolicy::Legacy,
        );
        assert!(legacy.canvas_w >= MIN_CANVAS_PX);
    }

    #[test]
    fn eclipse_ring_thickness_is_counted_once() {
        let frame = FrameSpec {
            enabled: true,
            kind: FrameType::Eclipse,
            width_px: 10.0,
            ..FrameSpec::default()
        };
        let l = layout_for((1600.0, 900.0), &frame, LayoutPolicy::Legacy);
        assert_eq!(l.eclipse_border, 12.0);
        assert_eq!(l.framed_w, l.image_scaled_w + 12.0);
        assert_eq!(l.framed_h, l.image_scaled_h + 12.0);

        // The ring spans half its thickness per side; the image stays
        // centered in the framed box.
        assert!((l.image_x - (l.group_center_x - l.image_scaled_w / 2.0)).abs() < 1e-9);
        assert!((l.image_y - (l.group_center_y - l.image_scaled_h / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn fit_container_respects_viewport_and_never_upscales() {
        let fitted = fit_container(Size::new(1920.0, 1080.0), Size::new(2560.0, 1440.0));
        assert!(fitted.width <= 1920.0);
        assert!((fitted.width / fitted.height - 1920.0 / 1080.0).abs() < 1e-9);

        let phone = fit_container(Size::new(1920.0, 1080.0), Size::new(390.0, 844.0));
        assert!(phone.width <= 390.0);
        assert!(phone.width >= 1.0);
    }
}
