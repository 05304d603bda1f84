use std::{collections::BTreeMap, sync::Arc};

use anyhow::Context as _;

use crate::error::FrameryResult;

/// Which visual slot a prepared image fills.
///
/// Each slot loads independently and may become ready in any order; the
/// composer renders whatever subset is present on each pass.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum ImageSlot {
    Screenshot,
    Background,
    Overlay(String),
}

/// A decoded image, premultiplied at ingest.
///
/// Renderers never touch undecoded bytes; IO and decoding are front-loaded
/// here so everything downstream stays pure.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn intrinsic_size(&self) -> kurbo::Size {
        kurbo::Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Build from raw straight-alpha RGBA8 (test and host-integration hook).
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> FrameryResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(crate::FrameryError::validation(
                "rgba byte length must be width*height*4",
            ));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }
}

/// Prepared images keyed by slot; the renderer's only source of pixels.
#[derive(Debug, Default)]
pub struct PreparedImageStore {
    slots: BTreeMap<ImageSlot, PreparedImage>,
}

impl PreparedImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: ImageSlot, image: PreparedImage) {
        self.slots.insert(slot, image);
    }

    /// Drop a slot (load failed or the source was removed); rendering simply
    /// omits it afterwards.
    pub fn remove(&mut self, slot: &ImageSlot) -> Option<PreparedImage> {
        self.slots.remove(slot)
    }

    pub fn get(&self, slot: &ImageSlot) -> Option<&PreparedImage> {
        self.slots.get(slot)
    }

    pub fn is_ready(&self, slot: &ImageSlot) -> bool {
        self.slots.contains_key(slot)
    }

    /// Intrinsic size of the main screenshot, when loaded.
    pub fn screenshot_size(&self) -> Option<kurbo::Size> {
        self.get(&ImageSlot::Screenshot).map(PreparedImage::intrinsic_size)
    }
}

/// Decode an encoded image (PNG/JPEG/WebP/...) and premultiply.
pub fn decode_image(bytes: &[u8]) -> FrameryResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
