use std::io::Cursor;

use anyhow::Context as _;

use crate::{
    error::{FrameryError, FrameryResult},
    render_cpu::FrameRgba,
};

/// Raster container for an exported frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg { quality: u8 },
}

impl ExportFormat {
    /// Pick a format from a file extension; unknown extensions get PNG.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg { quality: 90 },
            _ => Self::Png,
        }
    }
}

/// Encode a rendered frame.
///
/// Premultiplied input is converted back to straight alpha before encoding;
/// JPEG flattens alpha by dropping it (the canvas is normally opaque by the
/// time it reaches export).
pub fn encode_frame(frame: &FrameRgba, format: ExportFormat) -> FrameryResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_in_place(&mut data);
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| FrameryError::render("frame byte length does not match dimensions"))?;

    let mut out = Vec::new();
    match format {
        ExportFormat::Png => {
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
                .context("encode png")?;
        }
        ExportFormat::Jpeg { quality } => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            let mut cursor = Cursor::new(&mut out);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut cursor,
                quality.clamp(1, 100),
            );
            rgb.write_with_encoder(encoder).context("encode jpeg")?;
        }
    }
    Ok(out)
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(premultiplied: bool) -> FrameRgba {
        FrameRgba {
            width: 2,
            height: 1,
            data: vec![100, 50, 25, 128, 255, 255, 255, 255],
            premultiplied,
        }
    }

    #[test]
    fn png_roundtrips_dimensions() {
        let bytes = encode_frame(&frame(true), ExportFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 1));
    }

    #[test]
    fn jpeg_encodes_without_alpha() {
        let bytes = encode_frame(&frame(true), ExportFormat::Jpeg { quality: 80 }).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color().channel_count(), 3);
    }

    #[test]
    fn bad_length_is_an_error() {
        let broken = FrameRgba {
            width: 10,
            height: 10,
            data: vec![0u8; 3],
            premultiplied: false,
        };
        assert!(encode_frame(&broken, ExportFormat::Png).is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_extension("PNG"), ExportFormat::Png);
        assert_eq!(
            ExportFormat::from_extension("jpg"),
            ExportFormat::Jpeg { quality: 90 }
        );
        assert_eq!(ExportFormat::from_extension("webp"), ExportFormat::Png);
    }
}
