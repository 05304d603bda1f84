//! Buffer-level compositing: premultiplied source-over, separable gaussian
//! blur, and the mask plumbing the shadow passes are built from.
//!
//! Every op renders into its own scratch surface and is composited over the
//! target; a drop shadow is the op's alpha silhouette, blurred, colorized,
//! offset, and composited underneath first.

use crate::{
    color::Rgba,
    error::{FrameryError, FrameryResult},
};

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = mul_div255(u16::from(src[3]), op).saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> FrameryResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FrameryError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Extract the alpha channel of a premultiplied RGBA8 buffer.
pub fn alpha_mask(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).map(|px| px[3]).collect()
}

/// Translate a single-channel mask by whole pixels, zero-filling.
pub fn offset_mask(mask: &[u8], width: u32, height: u32, dx: i32, dy: i32) -> Vec<u8> {
    let w = width as i64;
    let h = height as i64;
    let mut out = vec![0u8; mask.len()];
    for y in 0..h {
        let sy = y - i64::from(dy);
        if sy < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x - i64::from(dx);
            if sx < 0 || sx >= w {
                continue;
            }
            out[(y * w + x) as usize] = mask[(sy * w + sx) as usize];
        }
    }
    out
}

/// Turn a coverage mask into a premultiplied shadow fill.
pub fn colorize_mask(mask: &[u8], color: Rgba) -> Vec<u8> {
    let mut out = Vec::with_capacity(mask.len() * 4);
    for &m in mask {
        let a = mul_div255(u16::from(m), u16::from(color.a));
        out.extend_from_slice(&[
            mul_div255(u16::from(color.r), u16::from(a)),
            mul_div255(u16::from(color.g), u16::from(a)),
            mul_div255(u16::from(color.b), u16::from(a)),
            a,
        ]);
    }
    out
}

/// Separable gaussian blur over an interleaved buffer with `channels`
/// components per pixel (1 for masks, 4 for premultiplied RGBA).
pub fn gaussian_blur(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    radius: u32,
    sigma: f32,
) -> FrameryResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| FrameryError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(FrameryError::render(
            "gaussian_blur expects src matching width*height*channels",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    blur_pass(src, &mut tmp, width, height, channels, &kernel, Axis::X);
    blur_pass(&tmp, &mut out, width, height, channels, &kernel, Axis::Y);
    Ok(out)
}

enum Axis {
    X,
    Y,
}

fn blur_pass(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    channels: usize,
    kernel: &[u32],
    axis: Axis,
) {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let d = ki as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::X => ((x + d).clamp(0, w - 1), y),
                    Axis::Y => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * channels;
                for (c, slot) in acc.iter_mut().enumerate().take(channels) {
                    *slot += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * channels;
            for c in 0..channels {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FrameryResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FrameryError::render("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(FrameryError::render("gaussian kernel sum is zero"));
    }

    // Q16 fixed point, renormalized so rows sum exactly to 1.0 and constant
    // regions stay byte-stable through the blur.
    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn q16_to_u8(acc: u64) -> u8 {
    (((acc + 32768) >> 16).min(255)) as u8
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn mask_offset_clips_at_edges() {
        let mask = vec![
            0, 0, 0, //
            0, 255, 0, //
            0, 0, 0,
        ];
        let shifted = offset_mask(&mask, 3, 3, 1, 1);
        assert_eq!(shifted[2 * 3 + 2], 255);
        assert_eq!(shifted.iter().filter(|&&v| v != 0).count(), 1);

        let gone = offset_mask(&mask, 3, 3, 5, 0);
        assert!(gone.iter().all(|&v| v == 0));
    }

    #[test]
    fn colorize_scales_color_by_coverage() {
        let out = colorize_mask(&[0, 128, 255], Rgba::new(255, 0, 0, 255));
        assert_eq!(&out[0..4], &[0, 0, 0, 0]);
        assert_eq!(out[4 + 3], 128);
        assert_eq!(&out[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn blur_radius_0_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let out = gaussian_blur(&src, 1, 2, 4, 0, 1.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn blur_constant_mask_is_identity() {
        let src = vec![40u8; 5 * 4];
        let out = gaussian_blur(&src, 5, 4, 1, 3, 2.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn blur_spreads_energy_from_single_pixel() {
        let (w, h) = (5u32, 5u32);
        let mut src = vec![0u8; (w * h) as usize];
        src[(2 * w + 2) as usize] = 255;

        let out = gaussian_blur(&src, w, h, 1, 2, 1.2).unwrap();

        let nonzero = out.iter().filter(|&&v| v != 0).count();
        assert!(nonzero > 1);
        let sum: u32 = out.iter().map(|&v| u32::from(v)).sum();
        assert!((sum as i32 - 255).abs() <= 4);
    }

    #[test]
    fn blur_rejects_bad_lengths() {
        assert!(gaussian_blur(&[0u8; 7], 2, 2, 1, 1, 1.0).is_err());
    }
}
