//! Framery is a deterministic layout and compositing engine for screenshot
//! mockups: frames, shadows, gradients, overlays, and CPU rasterization.
//!
//! # Pipeline overview
//!
//! 1. **Settings**: [`EditorSettings`] describes one composition (canvas,
//!    screenshot transform, frame, shadow, background, overlays).
//! 2. **Layout**: [`compute_layout`] derives every pixel rectangle
//!    ([`DerivedLayout`]) from the settings plus image/container/viewport
//!    sizes. Pure and total — degenerate inputs produce a degenerate
//!    layout, never a panic or a NaN.
//! 3. **Compose**: [`compose_scene`] builds a backend-agnostic
//!    [`ScenePlan`]; [`compose_stage3d`] builds the CSS-perspective
//!    overlay. Both consume the same layout numbers and neither recomputes
//!    geometry, which is what keeps the interactive preview and the export
//!    pixel-identical.
//! 4. **Render**: [`CpuRenderer`] executes a plan into premultiplied RGBA8
//!    ([`FrameRgba`]); [`encode_frame`] produces PNG/JPEG bytes.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: layout and composition are pure and
//!   stable for a given input; textures are seeded, never time-based.
//! - **No IO in the core**: decoding is front-loaded in
//!   [`PreparedImageStore`]; missing images drop out of the composite
//!   instead of blocking it.
//! - **Premultiplied RGBA8** end-to-end in the renderer.
//!
//! For a standalone walkthrough of the architecture, see [`crate::guide`].
#![forbid(unsafe_code)]

mod assets;
mod color;
mod composite;
mod error;
mod export;
mod frame_policy;
mod gradient;
mod interact;
mod layout;
mod model;
mod render_cpu;
mod scene;
mod shadow;
mod stage3d;
mod store;
mod texture;

/// High-level, standalone documentation for framery's concepts.
pub mod guide;

pub use kurbo::{Affine, BezPath, Point, Rect, RoundedRectRadii, Size, Vec2};

pub use assets::{ImageSlot, PreparedImage, PreparedImageStore, decode_image};
pub use color::{Rgba, css_color_or, parse_css_color};
pub use composite::{alpha_mask, colorize_mask, gaussian_blur, offset_mask, over_in_place};
pub use error::{FrameryError, FrameryResult};
pub use export::{ExportFormat, encode_frame};
pub use frame_policy::{
    FrameGeometry, FrameTheme, FrameType, frame_geometry, image_corner_radii,
};
pub use gradient::{GradientStop, LinearGradient, parse_linear_gradient};
pub use interact::{GestureDelta, GestureTarget, apply_gesture};
pub use layout::{
    DerivedLayout, FRAME_CONTRACTION, LayoutPolicy, MIN_CANVAS_PX, MOBILE_BREAKPOINT_PX,
    compute_layout, fit_container,
};
pub use model::{
    ASPECT_PRESETS, AspectPreset, BackgroundKind, BackgroundSpec, CanvasSpec, EditorSettings,
    FrameSpec, ImageOverlay, ImageTransform, NoiseSpec, PatternKind, PatternSpec,
    Perspective3dSpec, ShadowSide, ShadowSpec, TextOverlay, TextShadow,
};
pub use render_cpu::{CpuRenderer, FrameRgba, RenderSettings};
pub use scene::{
    DrawOp, ImageFit, LayerKind, Paint, SceneLayer, ScenePlan, Stage, TextAlign, compose_scene,
};
pub use shadow::{ShadowParams, project_shadow};
pub use stage3d::{Stage3d, Transform3d, compose_stage3d};
pub use store::{
    CanvasPatch, FramePatch, PerspectivePatch, ScreenshotPatch, SettingsStore, ShadowPatch,
};
pub use texture::{gradient_rgba8_premul, noise_rgba8_premul, pattern_rgba8_premul};
