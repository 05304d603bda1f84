use kurbo::{
    Affine, BezPath, Circle, Point, Rect, RoundedRect, RoundedRectRadii, Shape, Stroke,
    StrokeOpts,
};

use crate::{
    assets::{ImageSlot, PreparedImageStore},
    color::{Rgba, css_color_or, parse_css_color},
    error::FrameryResult,
    frame_policy::{
        self, FrameTheme, FrameType, GLASSY_RADIUS_BUMP_PX, MAC_HEADER_RADIUS_PX,
        PHOTOGRAPH_RADIUS_PX, WINDOWS_HEADER_RADIUS_PX, image_corner_radii,
    },
    gradient::{LinearGradient, parse_linear_gradient},
    layout::DerivedLayout,
    model::{BackgroundKind, EditorSettings, FrameSpec, PatternSpec},
    shadow::{ShadowParams, project_shadow},
};

/// Fixed grain seed for the background's own noise overlay (the standalone
/// noise layer carries a user seed instead).
const BACKGROUND_NOISE_SEED: u64 = 1;

/// How an image op maps its source onto the destination rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFit {
    /// Center-crop the source to the destination aspect ratio.
    Cover,
    /// Distort the source to the destination rectangle.
    Stretch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Center,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Gradient(LinearGradient),
}

/// One draw operation in canvas coordinates.
///
/// `transform` positions the op (group rotation, overlay rotation); the
/// geometry inside is already laid out by the layout engine, so renderers
/// execute these verbatim and never rederive sizes.
#[derive(Clone, Debug)]
pub enum DrawOp {
    Shape {
        path: BezPath,
        transform: Affine,
        paint: Paint,
        opacity: f32,
        shadow: Option<ShadowParams>,
    },
    Image {
        slot: ImageSlot,
        dest: Rect,
        radii: RoundedRectRadii,
        fit: ImageFit,
        transform: Affine,
        opacity: f32,
        flip_x: bool,
        flip_y: bool,
        blur_px: f64,
        shadow: Option<ShadowParams>,
    },
    Text {
        text: String,
        origin: Point,
        box_width: Option<f64>,
        align: TextAlign,
        font_size: f64,
        font_family: String,
        color: Rgba,
        transform: Affine,
        opacity: f32,
        shadow: Option<ShadowParams>,
    },
    /// Repeating decorative texture over the whole canvas.
    Pattern {
        spec: PatternSpec,
        opacity: f32,
    },
    /// Deterministic film grain over the whole canvas.
    Noise {
        seed: u64,
        opacity: f32,
    },
}

/// Ordering identity of a layer; layers render back-to-front as listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Background,
    Pattern,
    Noise,
    MainGroup,
    TextOverlays,
    ImageOverlays,
}

#[derive(Clone, Debug)]
pub struct SceneLayer {
    pub kind: LayerKind,
    pub ops: Vec<DrawOp>,
}

/// Backend-agnostic plan for one frame: background → pattern → noise →
/// image group → text overlays → image overlays.
#[derive(Clone, Debug)]
pub struct ScenePlan {
    pub width: f64,
    pub height: f64,
    pub layers: Vec<SceneLayer>,
}

impl ScenePlan {
    pub fn layer(&self, kind: LayerKind) -> Option<&SceneLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }
}

/// Explicit handle to a renderable scene, threaded to export.
///
/// Construction returns this handle instead of stashing the active surface
/// in module state, so exporters and tests can hold several stages at once.
#[derive(Clone, Debug)]
pub struct Stage {
    plan: ScenePlan,
}

impl Stage {
    pub fn new(plan: ScenePlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &ScenePlan {
        &self.plan
    }

    /// Output pixel dimensions at an export scale factor, floored at 1x1.
    pub fn pixel_size(&self, scale: f64) -> (u32, u32) {
        let s = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        (
            (self.plan.width * s).round().max(1.0) as u32,
            (self.plan.height * s).round().max(1.0) as u32,
        )
    }
}

/// Compile settings + layout + prepared images into a scene plan.
///
/// Missing images contribute nothing (their ops are skipped, never an
/// error); when the 3D perspective is active the main group is left empty
/// because the [`crate::stage3d::Stage3d`] overlay owns the framed image.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compose_scene(
    settings: &EditorSettings,
    layout: &DerivedLayout,
    assets: &PreparedImageStore,
) -> FrameryResult<ScenePlan> {
    settings.validate()?;

    let canvas = Rect::new(0.0, 0.0, layout.canvas_w, layout.canvas_h);
    let mut layers = Vec::with_capacity(6);

    layers.push(SceneLayer {
        kind: LayerKind::Background,
        ops: background_ops(settings, canvas, assets),
    });

    let mut pattern_ops = Vec::new();
    if settings.pattern.enabled {
        pattern_ops.push(DrawOp::Pattern {
            spec: settings.pattern.clone(),
            opacity: settings.pattern.opacity.clamp(0.0, 1.0) as f32,
        });
    }
    layers.push(SceneLayer {
        kind: LayerKind::Pattern,
        ops: pattern_ops,
    });

    let mut noise_ops = Vec::new();
    if settings.noise.enabled && settings.noise.opacity > 0.0 {
        noise_ops.push(DrawOp::Noise {
            seed: settings.noise.seed,
            opacity: settings.noise.opacity.clamp(0.0, 1.0) as f32,
        });
    }
    layers.push(SceneLayer {
        kind: LayerKind::Noise,
        ops: noise_ops,
    });

    layers.push(SceneLayer {
        kind: LayerKind::MainGroup,
        ops: main_group_ops(settings, layout, assets),
    });

    layers.push(SceneLayer {
        kind: LayerKind::TextOverlays,
        ops: text_overlay_ops(settings, layout),
    });

    layers.push(SceneLayer {
        kind: LayerKind::ImageOverlays,
        ops: image_overlay_ops(settings, assets),
    });

    Ok(ScenePlan {
        width: layout.canvas_w,
        height: layout.canvas_h,
        layers,
    })
}

fn background_ops(
    settings: &EditorSettings,
    canvas: Rect,
    assets: &PreparedImageStore,
) -> Vec<DrawOp> {
    let bg = &settings.background;
    let radii = RoundedRectRadii::from_single_radius(bg.corner_radius_px.max(0.0));
    let mut ops = Vec::new();

    match &bg.kind {
        BackgroundKind::Solid { color } => {
            ops.push(DrawOp::Shape {
                path: RoundedRect::from_rect(canvas, radii).to_path(0.1),
                transform: Affine::IDENTITY,
                paint: Paint::Solid(css_color_or(color, Rgba::WHITE)),
                opacity: 1.0,
                shadow: None,
            });
        }
        BackgroundKind::Gradient { css } => {
            let paint = match parse_linear_gradient(css, canvas.width(), canvas.height()) {
                Some(gradient) => Paint::Gradient(gradient),
                None => {
                    tracing::warn!("background gradient did not parse, using flat fill");
                    Paint::Solid(Rgba::WHITE)
                }
            };
            ops.push(DrawOp::Shape {
                path: RoundedRect::from_rect(canvas, radii).to_path(0.1),
                transform: Affine::IDENTITY,
                paint,
                opacity: 1.0,
                shadow: None,
            });
        }
        BackgroundKind::Image { source: _, opacity, blur_px } => {
            if assets.is_ready(&ImageSlot::Background) {
                ops.push(DrawOp::Image {
                    slot: ImageSlot::Background,
                    dest: canvas,
                    radii,
                    fit: ImageFit::Cover,
                    transform: Affine::IDENTITY,
                    opacity: opacity.clamp(0.0, 1.0) as f32,
                    flip_x: false,
                    flip_y: false,
                    blur_px: blur_px.max(0.0),
                    shadow: None,
                });
            }
        }
    }

    if bg.noise > 0.0 {
        ops.push(DrawOp::Noise {
            seed: BACKGROUND_NOISE_SEED,
            opacity: (bg.noise / 100.0).clamp(0.0, 1.0) as f32,
        });
    }

    ops
}

fn main_group_ops(
    settings: &EditorSettings,
    layout: &DerivedLayout,
    assets: &PreparedImageStore,
) -> Vec<DrawOp> {
    // The 3D overlay owns the framed image while perspective is active, and
    // without a loaded screenshot there is nothing to frame.
    if settings.perspective.is_active() || !assets.is_ready(&ImageSlot::Screenshot) {
        return Vec::new();
    }

    let group_center = Point::new(layout.group_center_x, layout.group_center_y);
    let group_transform = Affine::rotate_about(
        settings.screenshot.rotation_deg.to_radians(),
        group_center,
    );
    let group_rect = Rect::new(
        layout.group_center_x - layout.framed_w / 2.0,
        layout.group_center_y - layout.framed_h / 2.0,
        layout.group_center_x + layout.framed_w / 2.0,
        layout.group_center_y + layout.framed_h / 2.0,
    );
    let shadow = project_shadow(&settings.shadow);

    let (mut ops, above) = frame_chrome_ops(
        &settings.frame,
        layout,
        group_rect,
        group_transform,
        settings.screenshot.corner_radius_px,
        shadow,
    );

    let (local_x, local_y) = layout.image_local_origin();
    let image_rect = Rect::new(
        group_rect.x0 + local_x,
        group_rect.y0 + local_y,
        group_rect.x0 + local_x + layout.image_scaled_w,
        group_rect.y0 + local_y + layout.image_scaled_h,
    );
    // The backmost op carries the drop shadow for the whole unit; applying
    // it again to the image would darken the chrome behind it.
    let image_shadow = if ops.is_empty() { shadow } else { None };
    ops.push(DrawOp::Image {
        slot: ImageSlot::Screenshot,
        dest: image_rect,
        radii: image_corner_radii(&settings.frame, settings.screenshot.corner_radius_px),
        fit: ImageFit::Stretch,
        transform: group_transform,
        opacity: settings.screenshot.opacity.clamp(0.0, 1.0) as f32,
        flip_x: false,
        flip_y: false,
        blur_px: 0.0,
        shadow: image_shadow,
    });
    ops.extend(above);
    ops
}

/// Chrome draw ops for one frame type, split into (behind image, above
/// image). Parameterized entirely by the policy table's numbers plus the
/// frame's color/title/width fields.
fn frame_chrome_ops(
    frame: &FrameSpec,
    layout: &DerivedLayout,
    group_rect: Rect,
    transform: Affine,
    screenshot_radius: f64,
    shadow: Option<ShadowParams>,
) -> (Vec<DrawOp>, Vec<DrawOp>) {
    let mut behind = Vec::new();
    let mut above = Vec::new();
    if !frame.shows() {
        return (behind, above);
    }

    let dark = frame.theme == FrameTheme::Dark;
    let frame_color = css_color_or(&frame.color, Rgba::BLACK);
    let width = frame.width_px.max(0.0);

    match frame.kind {
        FrameType::None => {}

        FrameType::Solid => {
            let radii =
                RoundedRectRadii::from_single_radius(screenshot_radius + layout.frame_offset);
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(group_rect, radii).to_path(0.1),
                transform,
                paint: Paint::Solid(frame_color),
                opacity: 1.0,
                shadow,
            });
        }

        FrameType::Glassy => {
            let fill = if dark {
                Rgba::new(20, 20, 20, 217)
            } else {
                Rgba::new(255, 255, 255, 64)
            };
            let radii = RoundedRectRadii::from_single_radius(
                screenshot_radius + GLASSY_RADIUS_BUMP_PX,
            );
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(group_rect, radii).to_path(0.1),
                transform,
                paint: Paint::Solid(fill),
                opacity: 1.0,
                shadow,
            });
        }

        FrameType::WindowMac => {
            let header = Rect::new(
                group_rect.x0,
                group_rect.y0,
                group_rect.x1,
                group_rect.y0 + layout.window_header,
            );
            let body = Rect::new(group_rect.x0, header.y1, group_rect.x1, group_rect.y1);
            let chrome_fill = if dark {
                Rgba::new(61, 61, 61, 255)
            } else {
                Rgba::new(232, 232, 232, 255)
            };
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(
                    header,
                    RoundedRectRadii::new(MAC_HEADER_RADIUS_PX, MAC_HEADER_RADIUS_PX, 0.0, 0.0),
                )
                .to_path(0.1),
                transform,
                paint: Paint::Solid(chrome_fill),
                opacity: 1.0,
                shadow,
            });
            // Window padding shows the chrome color around the image.
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(
                    body,
                    RoundedRectRadii::new(
                        0.0,
                        0.0,
                        screenshot_radius + layout.window_padding,
                        screenshot_radius + layout.window_padding,
                    ),
                )
                .to_path(0.1),
                transform,
                paint: Paint::Solid(chrome_fill),
                opacity: 1.0,
                shadow: None,
            });
            for (i, color) in [
                Rgba::new(255, 95, 87, 255),
                Rgba::new(254, 188, 46, 255),
                Rgba::new(40, 200, 64, 255),
            ]
            .into_iter()
            .enumerate()
            {
                let center = Point::new(
                    group_rect.x0 + 24.0 + 24.0 * i as f64,
                    group_rect.y0 + layout.window_header / 2.0 + 6.0,
                );
                behind.push(DrawOp::Shape {
                    path: Circle::new(center, 7.0).to_path(0.1),
                    transform,
                    paint: Paint::Solid(color),
                    opacity: 1.0,
                    shadow: None,
                });
            }
            if let Some(title) = frame.title.as_deref().filter(|t| !t.is_empty()) {
                behind.push(title_op(
                    title,
                    Point::new(group_rect.x0, group_rect.y0 + layout.window_header / 2.0),
                    Some(group_rect.width()),
                    TextAlign::Center,
                    14.0,
                    "system-ui, -apple-system, sans-serif",
                    if dark { Rgba::WHITE } else { Rgba::new(77, 77, 77, 255) },
                    transform,
                ));
            }
        }

        FrameType::WindowWindows => {
            let header = Rect::new(
                group_rect.x0,
                group_rect.y0,
                group_rect.x1,
                group_rect.y0 + layout.window_header,
            );
            let body = Rect::new(group_rect.x0, header.y1, group_rect.x1, group_rect.y1);
            let chrome_fill = if dark {
                Rgba::new(45, 45, 45, 255)
            } else {
                Rgba::new(243, 243, 243, 255)
            };
            let ink = if dark { Rgba::WHITE } else { Rgba::new(26, 26, 26, 255) };
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(
                    header,
                    RoundedRectRadii::new(
                        WINDOWS_HEADER_RADIUS_PX,
                        WINDOWS_HEADER_RADIUS_PX,
                        0.0,
                        0.0,
                    ),
                )
                .to_path(0.1),
                transform,
                paint: Paint::Solid(chrome_fill),
                opacity: 1.0,
                shadow,
            });
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(
                    body,
                    RoundedRectRadii::new(
                        0.0,
                        0.0,
                        screenshot_radius + layout.window_padding,
                        screenshot_radius + layout.window_padding,
                    ),
                )
                .to_path(0.1),
                transform,
                paint: Paint::Solid(chrome_fill),
                opacity: 1.0,
                shadow: None,
            });
            behind.push(DrawOp::Shape {
                path: windows_caption_glyphs(group_rect),
                transform,
                paint: Paint::Solid(ink),
                opacity: 1.0,
                shadow: None,
            });
            if let Some(title) = frame.title.as_deref().filter(|t| !t.is_empty()) {
                behind.push(title_op(
                    title,
                    Point::new(
                        group_rect.x0 + 16.0,
                        group_rect.y0 + layout.window_header / 2.0,
                    ),
                    Some(group_rect.width() - 150.0),
                    TextAlign::Start,
                    13.0,
                    "Segoe UI, system-ui, sans-serif",
                    ink,
                    transform,
                ));
            }
        }

        FrameType::Photograph => {
            let mut paper_shadow = shadow;
            if paper_shadow.is_none() {
                // The print always floats a little even with shadows off.
                paper_shadow = Some(ShadowParams {
                    color: Rgba::BLACK,
                    blur: 12.0,
                    offset_x: 0.0,
                    offset_y: 4.0,
                    opacity: 0.15,
                });
            }
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(
                    group_rect,
                    RoundedRectRadii::from_single_radius(PHOTOGRAPH_RADIUS_PX),
                )
                .to_path(0.1),
                transform,
                paint: Paint::Solid(Rgba::new(255, 254, 249, 255)),
                opacity: 1.0,
                shadow: paper_shadow,
            });
            if let Some(title) = frame.title.as_deref().filter(|t| !t.is_empty()) {
                behind.push(title_op(
                    title,
                    Point::new(
                        group_rect.x0,
                        group_rect.y0 + layout.window_header / 2.0,
                    ),
                    Some(group_rect.width()),
                    TextAlign::Center,
                    18.0,
                    "Caveat, cursive",
                    Rgba::new(44, 44, 44, 255),
                    transform,
                ));
            }
        }

        FrameType::Eclipse => {
            // A stroked border cannot sit entirely outside the image, so the
            // ring is a filled outer shape with the image hole subtracted.
            let outer_radii = RoundedRectRadii::from_single_radius(
                screenshot_radius + layout.eclipse_border,
            );
            let inner_rect = Rect::new(
                group_rect.x0 + layout.eclipse_border / 2.0,
                group_rect.y0 + layout.eclipse_border / 2.0,
                group_rect.x1 - layout.eclipse_border / 2.0,
                group_rect.y1 - layout.eclipse_border / 2.0,
            );
            let mut ring = RoundedRect::from_rect(group_rect, outer_radii).to_path(0.1);
            let hole = RoundedRect::from_rect(
                inner_rect,
                RoundedRectRadii::from_single_radius(screenshot_radius),
            )
            .to_path(0.1)
            .reverse_subpaths();
            for el in hole.elements() {
                ring.push(*el);
            }
            behind.push(DrawOp::Shape {
                path: ring,
                transform,
                paint: Paint::Solid(frame_color),
                opacity: 1.0,
                shadow,
            });
        }

        FrameType::Ruler => {
            let radii =
                RoundedRectRadii::from_single_radius(screenshot_radius + layout.frame_offset);
            behind.push(DrawOp::Shape {
                path: RoundedRect::from_rect(group_rect, radii).to_path(0.1),
                transform,
                paint: Paint::Solid(frame_color),
                opacity: 1.0,
                shadow,
            });
            above.push(DrawOp::Shape {
                path: ruler_ticks(group_rect),
                transform,
                paint: Paint::Solid(if dark { Rgba::WHITE } else { Rgba::new(26, 26, 26, 255) }),
                opacity: 0.85,
                shadow: None,
            });
        }

        FrameType::InfiniteMirror => {
            // Echoes render outermost-first so each nested rectangle sits on
            // top of the previous, fading toward the image.
            for k in (1..=frame_policy::MIRROR_ECHOES).rev() {
                let grow = frame_policy::MIRROR_STEP_PX * k as f64;
                let echo = group_rect.inflate(grow, grow);
                let opacity = frame_policy::MIRROR_BASE_OPACITY
                    * frame_policy::MIRROR_OPACITY_FALLOFF.powi(k as i32 - 1);
                behind.push(DrawOp::Shape {
                    path: RoundedRect::from_rect(
                        echo,
                        RoundedRectRadii::from_single_radius(screenshot_radius),
                    )
                    .to_path(0.1),
                    transform,
                    paint: Paint::Solid(frame_color),
                    opacity,
                    shadow: None,
                });
            }
        }

        FrameType::Stack => {
            for (dx, dy) in frame_policy::STACK_SHEET_OFFSETS_PX {
                let sheet = Rect::new(
                    group_rect.x0 + dx,
                    group_rect.y0 + dy,
                    group_rect.x1 + dx,
                    group_rect.y1 + dy,
                );
                behind.push(DrawOp::Shape {
                    path: RoundedRect::from_rect(
                        sheet,
                        RoundedRectRadii::from_single_radius(screenshot_radius),
                    )
                    .to_path(0.1),
                    transform,
                    paint: Paint::Solid(Rgba::WHITE),
                    opacity: 1.0,
                    shadow: shadow.filter(|_| dx == frame_policy::STACK_SHEET_OFFSETS_PX[0].0),
                });
            }
        }

        FrameType::Dotted => {
            let radii = RoundedRectRadii::from_single_radius(screenshot_radius + width);
            let ring = RoundedRect::from_rect(group_rect, radii).to_path(0.1);
            let style = Stroke::new(width.max(1.0))
                .with_dashes(0.0, [width.max(1.0) * 2.0, width.max(1.0) * 2.0]);
            behind.push(DrawOp::Shape {
                path: kurbo::stroke(ring, &style, &StrokeOpts::default(), 0.1),
                transform,
                paint: Paint::Solid(frame_color),
                opacity: 1.0,
                shadow,
            });
        }

        FrameType::Focus => {
            let style = Stroke::new(width.max(1.0));
            above.push(DrawOp::Shape {
                path: kurbo::stroke(
                    focus_brackets(group_rect),
                    &style,
                    &StrokeOpts::default(),
                    0.1,
                ),
                transform,
                paint: Paint::Solid(frame_color),
                opacity: 1.0,
                shadow: None,
            });
        }
    }

    (behind, above)
}

#[allow(clippy::too_many_arguments)]
fn title_op(
    text: &str,
    origin: Point,
    box_width: Option<f64>,
    align: TextAlign,
    font_size: f64,
    family: &str,
    color: Rgba,
    transform: Affine,
) -> DrawOp {
    DrawOp::Text {
        text: text.to_string(),
        origin,
        box_width,
        align,
        font_size,
        font_family: family.to_string(),
        color,
        transform,
        opacity: 1.0,
        shadow: None,
    }
}

/// Minimize / maximize / close glyphs laid out from the right edge.
fn windows_caption_glyphs(group_rect: Rect) -> BezPath {
    let y_mid = group_rect.y0 + 14.0;
    let right = group_rect.x1;

    let mut lines = BezPath::new();
    // Minimize.
    lines.move_to((right - 100.0, y_mid));
    lines.line_to((right - 88.0, y_mid));
    // Close.
    lines.move_to((right - 40.0, y_mid - 4.0));
    lines.line_to((right - 28.0, y_mid + 8.0));
    lines.move_to((right - 28.0, y_mid - 4.0));
    lines.line_to((right - 40.0, y_mid + 8.0));
    let mut path = kurbo::stroke(lines, &Stroke::new(1.0), &StrokeOpts::default(), 0.1);

    // Maximize square.
    let square = Rect::new(right - 70.0, y_mid - 4.0, right - 58.0, y_mid + 8.0);
    let outline = kurbo::stroke(
        square.to_path(0.1),
        &Stroke::new(1.0),
        &StrokeOpts::default(),
        0.1,
    );
    for el in outline.elements() {
        path.push(*el);
    }
    path
}

/// Tick marks along the top and left edges at a fixed pitch; the pitch and
/// the long-tick interval are policy constants, not functions of width.
fn ruler_ticks(group_rect: Rect) -> BezPath {
    let mut path = BezPath::new();
    let pitch = frame_policy::RULER_TICK_PITCH_PX;
    let tick_w = 1.0;

    let mut i = 0usize;
    let mut x = group_rect.x0 + pitch;
    while x < group_rect.x1 {
        let len = if (i + 1) % frame_policy::RULER_MAJOR_EVERY == 0 {
            frame_policy::RULER_MAJOR_TICK_LEN_PX
        } else {
            frame_policy::RULER_TICK_LEN_PX
        };
        push_rect(&mut path, Rect::new(x, group_rect.y0, x + tick_w, group_rect.y0 + len));
        x += pitch;
        i += 1;
    }

    let mut j = 0usize;
    let mut y = group_rect.y0 + pitch;
    while y < group_rect.y1 {
        let len = if (j + 1) % frame_policy::RULER_MAJOR_EVERY == 0 {
            frame_policy::RULER_MAJOR_TICK_LEN_PX
        } else {
            frame_policy::RULER_TICK_LEN_PX
        };
        push_rect(&mut path, Rect::new(group_rect.x0, y, group_rect.x0 + len, y + tick_w));
        y += pitch;
        j += 1;
    }
    path
}

fn focus_brackets(group_rect: Rect) -> BezPath {
    let arm = frame_policy::FOCUS_ARM_PX;
    let r = group_rect;
    let mut path = BezPath::new();
    // Top-left.
    path.move_to((r.x0, r.y0 + arm));
    path.line_to((r.x0, r.y0));
    path.line_to((r.x0 + arm, r.y0));
    // Top-right.
    path.move_to((r.x1 - arm, r.y0));
    path.line_to((r.x1, r.y0));
    path.line_to((r.x1, r.y0 + arm));
    // Bottom-right.
    path.move_to((r.x1, r.y1 - arm));
    path.line_to((r.x1, r.y1));
    path.line_to((r.x1 - arm, r.y1));
    // Bottom-left.
    path.move_to((r.x0 + arm, r.y1));
    path.line_to((r.x0, r.y1));
    path.line_to((r.x0, r.y1 - arm));
    path
}

fn push_rect(path: &mut BezPath, r: Rect) {
    path.move_to((r.x0, r.y0));
    path.line_to((r.x1, r.y0));
    path.line_to((r.x1, r.y1));
    path.line_to((r.x0, r.y1));
    path.close_path();
}

fn text_overlay_ops(settings: &EditorSettings, layout: &DerivedLayout) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    for overlay in &settings.text_overlays {
        if !overlay.visible {
            continue;
        }
        let origin = Point::new(
            overlay.x_pct / 100.0 * layout.canvas_w,
            overlay.y_pct / 100.0 * layout.canvas_h,
        );
        let shadow = overlay.shadow.as_ref().and_then(|s| {
            let color = parse_css_color(&s.color)?;
            Some(ShadowParams {
                color: color.opaque(),
                blur: s.blur_px.max(0.0),
                offset_x: s.offset_x,
                offset_y: s.offset_y,
                opacity: f32::from(color.a) / 255.0,
            })
        });
        ops.push(DrawOp::Text {
            text: overlay.text.clone(),
            origin,
            box_width: None,
            align: TextAlign::Start,
            font_size: overlay.font_size_px,
            font_family: overlay.font_family.clone(),
            color: css_color_or(&overlay.color, Rgba::BLACK),
            transform: Affine::IDENTITY,
            opacity: overlay.opacity.clamp(0.0, 1.0) as f32,
            shadow,
        });
    }
    ops
}

fn image_overlay_ops(settings: &EditorSettings, assets: &PreparedImageStore) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    for overlay in &settings.image_overlays {
        if !overlay.visible {
            continue;
        }
        let slot = ImageSlot::Overlay(overlay.id.clone());
        if !assets.is_ready(&slot) {
            // Loads complete out of order; render whatever subset is ready.
            continue;
        }
        let half = overlay.size_px / 2.0;
        let center = Point::new(overlay.x_px, overlay.y_px);
        ops.push(DrawOp::Image {
            slot,
            dest: Rect::new(
                center.x - half,
                center.y - half,
                center.x + half,
                center.y + half,
            ),
            radii: RoundedRectRadii::from_single_radius(0.0),
            fit: ImageFit::Stretch,
            transform: Affine::rotate_about(overlay.rotation_deg.to_radians(), center),
            opacity: overlay.opacity.clamp(0.0, 1.0) as f32,
            flip_x: overlay.flip_x,
            flip_y: overlay.flip_y,
            blur_px: 0.0,
            shadow: None,
        });
    }
    ops
}
