/// Straight-alpha RGBA8 color as carried by the scene IR.
///
/// Settings store colors as CSS strings; they are resolved here at compose
/// time so renderers never see unparsed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    pub fn with_opacity(self, opacity: f32) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: ((f32::from(self.a) * o).round() as i32).clamp(0, 255) as u8,
            ..self
        }
    }

    /// Premultiplied RGBA8 bytes (the crate-wide pixel contract).
    pub fn to_premul8(self) -> [u8; 4] {
        let premul = |c: u8| -> u8 {
            ((u16::from(c) * u16::from(self.a) + 127) / 255) as u8
        };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

/// Parse a CSS color string (`#fff`, `rgb(..)`, `rgba(..)`, named colors).
///
/// Returns `None` for unparseable input; callers fall back to a safe
/// default and log the drop.
pub fn parse_css_color(s: &str) -> Option<Rgba> {
    let c = csscolorparser::parse(s.trim()).ok()?;
    let [r, g, b, a] = c.to_rgba8();
    Some(Rgba::new(r, g, b, a))
}

/// Like [`parse_css_color`] but substitutes `fallback` (and warns) on failure.
pub fn css_color_or(s: &str, fallback: Rgba) -> Rgba {
    match parse_css_color(s) {
        Some(c) => c,
        None => {
            tracing::warn!(color = s, "unparseable css color, using fallback");
            fallback
        }
    }
}
