//! # Framery guide
//!
//! This module is a standalone walkthrough of framery's architecture and
//! public API. If you are looking for copy/paste commands, start with the
//! repository `README.md`; if you are implementing new features, start
//! here.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`EditorSettings`](crate::EditorSettings): the composition state
//!   (canvas, screenshot transform, frame, shadow, background, overlays)
//! - [`DerivedLayout`](crate::DerivedLayout): every rectangle the renderers
//!   need, derived in one place by [`compute_layout`](crate::compute_layout)
//! - [`ScenePlan`](crate::ScenePlan): backend-agnostic draw ops for one pass
//! - [`Stage3d`](crate::Stage3d): the CSS-perspective variant of the same
//!   geometry
//! - [`CpuRenderer`](crate::CpuRenderer): executes a plan into pixels
//! - [`PreparedImageStore`](crate::PreparedImageStore): the only place
//!   external IO is allowed
//!
//! The pipeline is explicitly staged:
//!
//! 1. Derive geometry: [`compute_layout`](crate::compute_layout)
//! 2. Compose: [`compose_scene`](crate::compose_scene) (and
//!    [`compose_stage3d`](crate::compose_stage3d) while perspective is on)
//! 3. Render: [`CpuRenderer::render`](crate::CpuRenderer::render)
//! 4. Encode: [`encode_frame`](crate::encode_frame)
//!
//! ---
//!
//! ## One layout, every backend
//!
//! The single most important invariant: **geometry is derived once**. The
//! interactive 2D scene graph and the CSS-3D perspective overlay read the
//! same [`DerivedLayout`](crate::DerivedLayout) fields; neither recomputes
//! a size or an offset on its own. Any drift between the two rendering
//! paths shows up to the user as the image jumping when perspective
//! toggles, so the parity is covered by integration tests rather than
//! convention.
//!
//! [`compute_layout`](crate::compute_layout) is a pure function: no IO, no
//! clock, no global state. Degenerate inputs (a zero-height image, an
//! unmeasured container) return
//! [`DerivedLayout::degenerate`](crate::DerivedLayout::degenerate) instead
//! of panicking, and every size it emits is finite and non-negative.
//!
//! ## Frame policy
//!
//! Each frame style contributes numbers — border offset, inner padding,
//! header height, ring thickness — through
//! [`frame_geometry`](crate::frame_geometry), a total function over the
//! closed [`FrameType`](crate::FrameType) set. Unknown frame names coming
//! from stale settings documents deserialize to `FrameType::None` with a
//! logged warning; nothing throws. How chrome *looks* (traffic lights,
//! ruler ticks, mirror echoes) lives in the scene composer, parameterized
//! entirely by those numbers plus the frame's color/title/width fields.
//!
//! ## "No IO in the renderer" (and why)
//!
//! Decoding happens up front through
//! [`decode_image`](crate::decode_image) into a
//! [`PreparedImageStore`](crate::PreparedImageStore); images are
//! premultiplied at ingest. Slots load independently and may complete in
//! any order — the composer renders whatever subset is ready on each pass,
//! so a slow overlay download never blocks the screenshot from appearing.
//!
//! ## Building and rendering a scene
//!
//! ```rust,no_run
//! use framery::{
//!     CpuRenderer, EditorSettings, ImageSlot, LayoutPolicy, PreparedImage,
//!     PreparedImageStore, RenderSettings, Size, Stage, compose_scene, compute_layout,
//! };
//!
//! # fn main() -> framery::FrameryResult<()> {
//! let settings = EditorSettings::default();
//! let mut assets = PreparedImageStore::new();
//! assets.insert(
//!     ImageSlot::Screenshot,
//!     PreparedImage::from_rgba8(2, 2, vec![255u8; 16])?,
//! );
//!
//! let layout = compute_layout(
//!     assets.screenshot_size().unwrap_or(Size::new(1.0, 1.0)),
//!     Size::new(1920.0, 1080.0),
//!     Size::new(1920.0, 1080.0),
//!     &settings.canvas,
//!     &settings.screenshot,
//!     &settings.frame,
//!     LayoutPolicy::Responsive,
//! );
//!
//! let stage = Stage::new(compose_scene(&settings, &layout, &assets)?);
//! let mut renderer = CpuRenderer::new(RenderSettings::default());
//! let frame = renderer.render(&stage, &assets, 1.0)?;
//! assert!(frame.premultiplied);
//! # Ok(())
//! # }
//! ```
//!
//! Note that [`Stage`](crate::Stage) is an explicit handle: scene
//! construction returns it and the exporter takes it as an argument. There
//! is no module-level "current stage" to reach for, which keeps multiple
//! stages (editor preview and a high-resolution export pass) alive at
//! once without interference.
//!
//! ## Gestures
//!
//! Renderers report user interaction as explicit payloads —
//! [`GestureDelta`](crate::GestureDelta) with dx/dy/dscale/drotation —
//! rather than exposing their node graphs.
//! [`apply_gesture`](crate::apply_gesture) folds a delta back into the
//! [`SettingsStore`](crate::SettingsStore), converting units with the
//! current layout (text overlays store percentages, image overlays store
//! pixels), clamping scale and size floors, and validating before commit.
//! The next pass recomputes layout from the updated settings; nothing else
//! carries state between frames.
//!
//! ## Policy presets
//!
//! Two observed revisions of the sizing rules disagree about small
//! viewports: one stretches every canvas to a 300 px floor, the other
//! skips the floor on mobile and clamps padding instead. Both ship as
//! [`LayoutPolicy`](crate::LayoutPolicy) presets (`Legacy`, `Responsive`)
//! and the caller chooses; `Responsive` is the default and also applies
//! the frame contraction factor that reserves room for chrome.
