use std::collections::BTreeMap;

use kurbo::{Affine, Rect, RoundedRect, Shape};

use crate::{
    assets::{ImageSlot, PreparedImage, PreparedImageStore},
    composite,
    error::{FrameryError, FrameryResult},
    scene::{DrawOp, ImageFit, Paint, ScenePlan, Stage},
    shadow::ShadowParams,
    texture,
};

/// Renderer configuration; `clear_rgba` flattens the canvas over a straight
/// alpha color before any layer draws.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    pub clear_rgba: Option<[u8; 4]>,
}

/// Rendered pixels, premultiplied RGBA8 end-to-end.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Executes a [`ScenePlan`] on the CPU via `vello_cpu`.
///
/// Each op renders into its own scratch surface and is composited over the
/// target, so per-op opacity, blur and drop shadows stay independent of
/// draw order inside the op. Ops whose image slot has not loaded are
/// skipped; text ops are carried in the plan for host renderers and skipped
/// here.
pub struct CpuRenderer {
    settings: RenderSettings,
    image_cache: BTreeMap<ImageSlot, (usize, vello_cpu::Image)>,
}

impl CpuRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            image_cache: BTreeMap::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render(
        &mut self,
        stage: &Stage,
        assets: &PreparedImageStore,
        scale: f64,
    ) -> FrameryResult<FrameRgba> {
        let plan = stage.plan();
        let (pw, ph) = stage.pixel_size(scale);
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        let w16: u16 = pw
            .try_into()
            .map_err(|_| FrameryError::render("render width exceeds u16"))?;
        let h16: u16 = ph
            .try_into()
            .map_err(|_| FrameryError::render("render height exceeds u16"))?;

        let mut target = vello_cpu::Pixmap::new(w16, h16);
        let clear = self
            .settings
            .clear_rgba
            .map(|[r, g, b, a]| premul_rgba8(r, g, b, a))
            .unwrap_or([0, 0, 0, 0]);
        fill_pixmap(&mut target, clear);

        let mut scratch = vello_cpu::Pixmap::new(w16, h16);

        for layer in &plan.layers {
            for op in &layer.ops {
                self.render_op(op, plan, assets, scale, pw, ph, &mut target, &mut scratch)?;
            }
        }

        Ok(FrameRgba {
            width: pw,
            height: ph,
            data: target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn render_op(
        &mut self,
        op: &DrawOp,
        plan: &ScenePlan,
        assets: &PreparedImageStore,
        scale: f64,
        pw: u32,
        ph: u32,
        target: &mut vello_cpu::Pixmap,
        scratch: &mut vello_cpu::Pixmap,
    ) -> FrameryResult<()> {
        match op {
            DrawOp::Pattern { spec, opacity } => {
                let buf = texture::pattern_rgba8_premul(spec, pw, ph);
                composite::over_in_place(target.data_as_u8_slice_mut(), &buf, *opacity)
            }
            DrawOp::Noise { seed, opacity } => {
                let buf = texture::noise_rgba8_premul(pw, ph, *seed);
                composite::over_in_place(target.data_as_u8_slice_mut(), &buf, *opacity)
            }
            DrawOp::Text { .. } => {
                tracing::debug!("text op carried for host renderers, skipped on cpu");
                Ok(())
            }
            DrawOp::Shape { opacity, shadow, .. } => {
                fill_pixmap(scratch, [0, 0, 0, 0]);
                self.draw_into_scratch(op, plan, assets, scale, scratch)?;
                self.composite_scratch(target, scratch, pw, ph, scale, *opacity, *shadow, 0.0)
            }
            DrawOp::Image { slot, opacity, shadow, blur_px, .. } => {
                if !assets.is_ready(slot) {
                    // Loads resolve independently; absent slots draw nothing.
                    tracing::debug!(?slot, "image slot not ready, skipping op");
                    return Ok(());
                }
                fill_pixmap(scratch, [0, 0, 0, 0]);
                self.draw_into_scratch(op, plan, assets, scale, scratch)?;
                self.composite_scratch(
                    target, scratch, pw, ph, scale, *opacity, *shadow, *blur_px,
                )
            }
        }
    }

    /// Blur the scratch surface if asked, lay the shadow silhouette under
    /// it, then composite the op over the target at its opacity.
    #[allow(clippy::too_many_arguments)]
    fn composite_scratch(
        &self,
        target: &mut vello_cpu::Pixmap,
        scratch: &mut vello_cpu::Pixmap,
        pw: u32,
        ph: u32,
        scale: f64,
        opacity: f32,
        shadow: Option<ShadowParams>,
        blur_px: f64,
    ) -> FrameryResult<()> {
        if blur_px > 0.0 {
            let radius = blur_radius(blur_px, scale);
            if radius > 0 {
                let blurred = composite::gaussian_blur(
                    scratch.data_as_u8_slice(),
                    pw,
                    ph,
                    4,
                    radius,
                    radius as f32 / 2.0,
                )?;
                scratch.data_as_u8_slice_mut().copy_from_slice(&blurred);
            }
        }

        if let Some(shadow) = shadow {
            let mut mask = composite::alpha_mask(scratch.data_as_u8_slice());
            let radius = blur_radius(shadow.blur, scale);
            if radius > 0 {
                mask = composite::gaussian_blur(&mask, pw, ph, 1, radius, radius as f32 / 2.0)?;
            }
            let dx = (shadow.offset_x * scale).round() as i32;
            let dy = (shadow.offset_y * scale).round() as i32;
            if dx != 0 || dy != 0 {
                mask = composite::offset_mask(&mask, pw, ph, dx, dy);
            }
            let shadow_rgba = composite::colorize_mask(&mask, shadow.color);
            composite::over_in_place(
                target.data_as_u8_slice_mut(),
                &shadow_rgba,
                shadow.opacity,
            )?;
        }

        composite::over_in_place(
            target.data_as_u8_slice_mut(),
            scratch.data_as_u8_slice(),
            opacity,
        )
    }

    fn draw_into_scratch(
        &mut self,
        op: &DrawOp,
        plan: &ScenePlan,
        assets: &PreparedImageStore,
        scale: f64,
        scratch: &mut vello_cpu::Pixmap,
    ) -> FrameryResult<()> {
        let mut ctx = vello_cpu::RenderContext::new(scratch.width(), scratch.height());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let pixel = Affine::scale(scale);

        match op {
            DrawOp::Shape { path, transform, paint, .. } => {
                ctx.set_transform(affine_to_cpu(pixel * *transform));
                match paint {
                    Paint::Solid(c) => {
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                    }
                    Paint::Gradient(gradient) => {
                        // Evaluated at canvas-unit resolution and anchored at
                        // the origin, so one texel spans one user-space unit.
                        let gw = plan.width.ceil().max(1.0) as u32;
                        let gh = plan.height.ceil().max(1.0) as u32;
                        let buf = texture::gradient_rgba8_premul(gradient, gw, gh);
                        ctx.set_paint(image_from_premul(&buf, gw, gh)?);
                    }
                }
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            DrawOp::Image {
                slot,
                dest,
                radii,
                fit,
                transform,
                flip_x,
                flip_y,
                ..
            } => {
                let Some(prepared) = assets.get(slot) else {
                    return Ok(());
                };
                if dest.width() <= 0.0 || dest.height() <= 0.0 {
                    return Ok(());
                }
                let paint = self.image_paint_for(slot, prepared)?;

                let iw = f64::from(prepared.width);
                let ih = f64::from(prepared.height);
                let crop = match fit {
                    ImageFit::Stretch => Rect::new(0.0, 0.0, iw, ih),
                    ImageFit::Cover => cover_crop(iw, ih, dest.width(), dest.height()),
                };
                if crop.width() <= 0.0 || crop.height() <= 0.0 {
                    return Ok(());
                }

                // Map source pixels onto the destination rect, with optional
                // mirroring about the destination center.
                let mut local = Affine::translate((dest.x0, dest.y0))
                    * Affine::scale_non_uniform(
                        dest.width() / crop.width(),
                        dest.height() / crop.height(),
                    )
                    * Affine::translate((-crop.x0, -crop.y0));
                if *flip_x || *flip_y {
                    let center = dest.center();
                    local = Affine::translate(center.to_vec2())
                        * Affine::scale_non_uniform(
                            if *flip_x { -1.0 } else { 1.0 },
                            if *flip_y { -1.0 } else { 1.0 },
                        )
                        * Affine::translate(-center.to_vec2())
                        * local;
                }

                ctx.set_transform(affine_to_cpu(pixel * *transform));
                ctx.set_paint_transform(affine_to_cpu(local));
                ctx.set_paint(paint);
                ctx.fill_path(&bezpath_to_cpu(
                    &RoundedRect::from_rect(*dest, *radii).to_path(0.1),
                ));
            }
            DrawOp::Pattern { .. } | DrawOp::Noise { .. } | DrawOp::Text { .. } => {
                return Err(FrameryError::render(
                    "buffer-composited op routed to the vector path",
                ));
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(scratch);
        Ok(())
    }

    fn image_paint_for(
        &mut self,
        slot: &ImageSlot,
        prepared: &PreparedImage,
    ) -> FrameryResult<vello_cpu::Image> {
        let identity = std::sync::Arc::as_ptr(&prepared.rgba8_premul) as usize;
        if let Some((cached_identity, paint)) = self.image_cache.get(slot)
            && *cached_identity == identity
        {
            return Ok(paint.clone());
        }

        let paint = image_from_premul(
            prepared.rgba8_premul.as_slice(),
            prepared.width,
            prepared.height,
        )?;
        self.image_cache
            .insert(slot.clone(), (identity, paint.clone()));
        Ok(paint)
    }
}

/// Center-crop of an `iw`×`ih` source matching the destination aspect.
fn cover_crop(iw: f64, ih: f64, dest_w: f64, dest_h: f64) -> Rect {
    if ih <= 0.0 || dest_w <= 0.0 || dest_h <= 0.0 {
        return Rect::new(0.0, 0.0, iw, ih);
    }
    let image_ratio = iw / ih;
    let dest_ratio = dest_w / dest_h;
    if image_ratio > dest_ratio {
        let crop_w = ih * dest_ratio;
        let x = (iw - crop_w) / 2.0;
        Rect::new(x, 0.0, x + crop_w, ih)
    } else {
        let crop_h = iw / dest_ratio;
        let y = (ih - crop_h) / 2.0;
        Rect::new(0.0, y, iw, y + crop_h)
    }
}

/// CSS-style blur length to a kernel radius at the output scale, capped the
/// same way the offscreen blur pass caps it.
fn blur_radius(blur_px: f64, scale: f64) -> u32 {
    ((blur_px * scale) / 2.0).round().clamp(0.0, 256.0) as u32
}

fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let premul = |c: u8| -> u8 { ((u16::from(c) * u16::from(a) + 127) / 255) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn fill_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn image_from_premul(rgba8_premul: &[u8], width: u32, height: u32) -> FrameryResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FrameryError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrameryError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FrameryError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(
            vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities),
        )),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let to_cpu = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(to_cpu(p1), to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(to_cpu(p1), to_cpu(p2), to_cpu(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
