use kurbo::RoundedRectRadii;

use crate::model::FrameSpec;

/// Closed set of frame chrome styles.
///
/// The wire form is kebab-case; unknown names resolve to [`FrameType::None`]
/// instead of failing, so stale or hand-edited settings documents degrade
/// gracefully. The fallback is logged at the deserialization boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameType {
    #[default]
    None,
    Solid,
    Glassy,
    WindowMac,
    WindowWindows,
    Photograph,
    Eclipse,
    Ruler,
    InfiniteMirror,
    Stack,
    Dotted,
    Focus,
}

impl FrameType {
    pub const ALL: [Self; 12] = [
        Self::None,
        Self::Solid,
        Self::Glassy,
        Self::WindowMac,
        Self::WindowWindows,
        Self::Photograph,
        Self::Eclipse,
        Self::Ruler,
        Self::InfiniteMirror,
        Self::Stack,
        Self::Dotted,
        Self::Focus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Glassy => "glassy",
            Self::WindowMac => "window-mac",
            Self::WindowWindows => "window-windows",
            Self::Photograph => "photograph",
            Self::Eclipse => "eclipse",
            Self::Ruler => "ruler",
            Self::InfiniteMirror => "infinite-mirror",
            Self::Stack => "stack",
            Self::Dotted => "dotted",
            Self::Focus => "focus",
        }
    }

    /// Total mapping from names to variants; anything unrecognized is `None`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "solid" => Self::Solid,
            "glassy" => Self::Glassy,
            "window-mac" => Self::WindowMac,
            "window-windows" => Self::WindowWindows,
            "photograph" => Self::Photograph,
            "eclipse" => Self::Eclipse,
            "ruler" => Self::Ruler,
            "infinite-mirror" => Self::InfiniteMirror,
            "stack" => Self::Stack,
            "dotted" => Self::Dotted,
            "focus" => Self::Focus,
            other => {
                tracing::warn!(frame_type = other, "unknown frame type, treating as none");
                Self::None
            }
        }
    }

    /// Whether the chrome has a title bar above the image.
    pub fn has_header(self) -> bool {
        matches!(
            self,
            Self::WindowMac | Self::WindowWindows | Self::Photograph
        )
    }
}

impl serde::Serialize for FrameType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for FrameType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_name(&s))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameTheme {
    #[default]
    Light,
    Dark,
}

/// Title-bar height of the macOS-style window chrome.
pub const MAC_HEADER_PX: f64 = 40.0;
/// Title-bar height of the Windows-style window chrome.
pub const WINDOWS_HEADER_PX: f64 = 28.0;
/// Caption area reserved above the print for the photograph frame.
pub const PHOTOGRAPH_HEADER_PX: f64 = 60.0;
/// Inner padding between window chrome and the image when none is configured.
pub const DEFAULT_WINDOW_PADDING_PX: f64 = 20.0;
/// Extra corner rounding the glassy frame adds on top of the image radius.
pub const GLASSY_RADIUS_BUMP_PX: f64 = 12.0;
/// Ruler tick spacing; not derived from frame width.
pub const RULER_TICK_PITCH_PX: f64 = 10.0;
/// Every n-th ruler tick is drawn long.
pub const RULER_MAJOR_EVERY: usize = 5;
pub const RULER_TICK_LEN_PX: f64 = 6.0;
pub const RULER_MAJOR_TICK_LEN_PX: f64 = 12.0;
/// The ruler frame tightens the image corner radius.
pub const RULER_RADIUS_SCALE: f64 = 0.8;
/// Nested echo count for the infinite-mirror frame.
pub const MIRROR_ECHOES: usize = 4;
/// Inset step between successive mirror echoes.
pub const MIRROR_STEP_PX: f64 = 12.0;
pub const MIRROR_BASE_OPACITY: f32 = 0.45;
pub const MIRROR_OPACITY_FALLOFF: f32 = 0.55;
/// Offsets of the two sheets drawn behind a stacked image.
pub const STACK_SHEET_OFFSETS_PX: [(f64, f64); 2] = [(6.0, 6.0), (3.0, 3.0)];
/// Arm length of the focus frame's corner brackets.
pub const FOCUS_ARM_PX: f64 = 24.0;
/// Corner radius of the photograph paper sheet.
pub const PHOTOGRAPH_RADIUS_PX: f64 = 3.0;
pub const MAC_HEADER_RADIUS_PX: f64 = 12.0;
pub const WINDOWS_HEADER_RADIUS_PX: f64 = 8.0;

/// Geometry contributions of one frame type, consumed by the layout engine.
///
/// Everything a renderer needs beyond these numbers (fills, tick marks,
/// traffic lights) is derived in the scene composer from the same spec.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameGeometry {
    /// Symmetric border thickness added on every side.
    pub frame_offset: f64,
    /// Inner padding between chrome and image (window and photograph frames).
    pub window_padding: f64,
    /// Header height above the image; added once, not symmetric.
    pub window_header: f64,
    /// Ring thickness of the eclipse frame.
    pub eclipse_border: f64,
    /// Multiplier applied to the image corner radius under this frame.
    pub radius_scale: f64,
}

impl FrameGeometry {
    pub const ZERO: Self = Self {
        frame_offset: 0.0,
        window_padding: 0.0,
        window_header: 0.0,
        eclipse_border: 0.0,
        radius_scale: 1.0,
    };
}

/// Total lookup from frame spec to geometry contributions.
///
/// Disabled frames and [`FrameType::None`] contribute nothing; no variant
/// errors. Frame width is clamped at zero so a malformed negative width
/// cannot produce negative boxes downstream.
pub fn frame_geometry(frame: &FrameSpec) -> FrameGeometry {
    if !frame.enabled || frame.kind == FrameType::None {
        return FrameGeometry::ZERO;
    }
    let width = frame.width_px.max(0.0);
    let padding = frame.padding_px.unwrap_or(DEFAULT_WINDOW_PADDING_PX).max(0.0);

    match frame.kind {
        FrameType::None => FrameGeometry::ZERO,
        FrameType::Solid | FrameType::Glassy | FrameType::Dotted => FrameGeometry {
            frame_offset: width,
            ..FrameGeometry::ZERO
        },
        FrameType::Ruler => FrameGeometry {
            frame_offset: width + 2.0,
            radius_scale: RULER_RADIUS_SCALE,
            ..FrameGeometry::ZERO
        },
        FrameType::WindowMac => FrameGeometry {
            window_padding: padding,
            window_header: MAC_HEADER_PX,
            ..FrameGeometry::ZERO
        },
        FrameType::WindowWindows => FrameGeometry {
            window_padding: padding,
            window_header: WINDOWS_HEADER_PX,
            ..FrameGeometry::ZERO
        },
        FrameType::Photograph => FrameGeometry {
            window_padding: DEFAULT_WINDOW_PADDING_PX,
            window_header: PHOTOGRAPH_HEADER_PX,
            ..FrameGeometry::ZERO
        },
        FrameType::Eclipse => FrameGeometry {
            eclipse_border: width + 2.0,
            ..FrameGeometry::ZERO
        },
        FrameType::InfiniteMirror | FrameType::Stack | FrameType::Focus => FrameGeometry::ZERO,
    }
}

/// Per-corner radii of the inner image under a given frame.
///
/// Window chrome squares the top corners where the header meets the image
/// and keeps the full radius at the bottom; the ruler frame tightens the
/// radius everywhere.
pub fn image_corner_radii(frame: &FrameSpec, radius: f64) -> RoundedRectRadii {
    let r = radius.max(0.0);
    if !frame.enabled {
        return RoundedRectRadii::from_single_radius(r);
    }
    match frame.kind {
        FrameType::WindowMac | FrameType::WindowWindows => RoundedRectRadii::new(0.0, 0.0, r, r),
        FrameType::Ruler => RoundedRectRadii::from_single_radius(r * RULER_RADIUS_SCALE),
        _ => RoundedRectRadii::from_single_radius(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FrameSpec;

    fn spec(kind: FrameType) -> FrameSpec {
        FrameSpec {
            enabled: true,
            kind,
            width_px: 4.0,
            ..FrameSpec::default()
        }
    }

    #[test]
    fn lookup_is_total_over_all_variants() {
        for kind in FrameType::ALL {
            let g = frame_geometry(&spec(kind));
            assert!(g.frame_offset >= 0.0);
            assert!(g.window_padding >= 0.0);
            assert!(g.window_header >= 0.0);
            assert!(g.eclipse_border >= 0.0);
            assert!(g.radius_scale > 0.0);
        }
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert_eq!(FrameType::from_name("holographic"), FrameType::None);
        assert_eq!(FrameType::from_name(" Window-Mac "), FrameType::WindowMac);
    }

    #[test]
    fn name_roundtrip() {
        for kind in FrameType::ALL {
            assert_eq!(FrameType::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn disabled_frame_contributes_nothing() {
        let mut s = spec(FrameType::WindowMac);
        s.enabled = false;
        assert_eq!(frame_geometry(&s), FrameGeometry::ZERO);
    }

    #[test]
    fn header_heights_are_distinct_per_chrome() {
        assert_eq!(frame_geometry(&spec(FrameType::WindowMac)).window_header, 40.0);
        assert_eq!(
            frame_geometry(&spec(FrameType::WindowWindows)).window_header,
            28.0
        );
        assert_eq!(
            frame_geometry(&spec(FrameType::Photograph)).window_header,
            60.0
        );
    }

    #[test]
    fn window_chrome_squares_top_corners_only() {
        let radii = image_corner_radii(&spec(FrameType::WindowMac), 10.0);
        assert_eq!(radii.top_left, 0.0);
        assert_eq!(radii.top_right, 0.0);
        assert_eq!(radii.bottom_right, 10.0);
        assert_eq!(radii.bottom_left, 10.0);
    }

    #[test]
    fn negative_width_is_clamped() {
        let mut s = spec(FrameType::Solid);
        s.width_px = -5.0;
        assert_eq!(frame_geometry(&s).frame_offset, 0.0);
    }

    #[test]
    fn serde_accepts_unknown_frame_name() {
        let kind: FrameType = serde_json::from_str("\"wobbly\"").unwrap();
        assert_eq!(kind, FrameType::None);
        assert_eq!(serde_json::to_string(&FrameType::Eclipse).unwrap(), "\"eclipse\"");
    }
}
