use crate::{
    color::{Rgba, css_color_or},
    model::{ShadowSide, ShadowSpec},
};

/// 45-degree diagonal decomposition of the elevation.
const DIAGONAL: f64 = 0.707;

/// Concrete drop-shadow parameters any renderer can consume directly.
///
/// `color` is always fully opaque; translucency travels only through
/// `opacity`, so renderers that apply opacity as a layer multiplier cannot
/// double-apply an alpha baked into the color.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShadowParams {
    pub color: Rgba,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f32,
}

/// Convert the abstract shadow configuration into offset/blur/color.
///
/// Returns `None` when the shadow is disabled (the empty contribution).
/// Explicit offsets take priority over the side-derived ones.
pub fn project_shadow(shadow: &ShadowSpec) -> Option<ShadowParams> {
    if !shadow.enabled {
        return None;
    }

    let (offset_x, offset_y) = match (shadow.offset_x, shadow.offset_y) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            let e = shadow.elevation_px;
            match shadow.side {
                ShadowSide::Bottom => (0.0, e),
                ShadowSide::Right => (e, 0.0),
                ShadowSide::BottomRight => (e * DIAGONAL, e * DIAGONAL),
            }
        }
    };

    let color = css_color_or(&shadow.color, Rgba::BLACK).opaque();

    Some(ShadowParams {
        color,
        blur: shadow.softness_px.max(0.0),
        offset_x,
        offset_y,
        opacity: shadow.intensity.clamp(0.0, 1.0) as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(side: ShadowSide) -> ShadowSpec {
        ShadowSpec {
            enabled: true,
            elevation_px: 10.0,
            side,
            softness_px: 24.0,
            color: "rgba(0, 0, 0, 0.5)".to_string(),
            intensity: 0.8,
            offset_x: None,
            offset_y: None,
        }
    }

    #[test]
    fn disabled_shadow_contributes_nothing() {
        let mut s = spec(ShadowSide::Bottom);
        s.enabled = false;
        assert_eq!(project_shadow(&s), None);
    }

    #[test]
    fn side_derived_offsets() {
        let bottom = project_shadow(&spec(ShadowSide::Bottom)).unwrap();
        assert_eq!((bottom.offset_x, bottom.offset_y), (0.0, 10.0));

        let right = project_shadow(&spec(ShadowSide::Right)).unwrap();
        assert_eq!((right.offset_x, right.offset_y), (10.0, 0.0));

        let diag = project_shadow(&spec(ShadowSide::BottomRight)).unwrap();
        assert!((diag.offset_x - 7.07).abs() < 1e-9);
        assert!((diag.offset_y - 7.07).abs() < 1e-9);
    }

    #[test]
    fn explicit_offsets_win() {
        let mut s = spec(ShadowSide::Bottom);
        s.offset_x = Some(-3.0);
        s.offset_y = Some(4.0);
        let p = project_shadow(&s).unwrap();
        assert_eq!((p.offset_x, p.offset_y), (-3.0, 4.0));
    }

    #[test]
    fn color_alpha_is_hoisted_into_opacity() {
        let p = project_shadow(&spec(ShadowSide::Bottom)).unwrap();
        assert_eq!(p.color.a, 255);
        assert!((p.opacity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn intensity_is_clamped() {
        let mut s = spec(ShadowSide::Bottom);
        s.intensity = 3.0;
        assert_eq!(project_shadow(&s).unwrap().opacity, 1.0);
    }
}
