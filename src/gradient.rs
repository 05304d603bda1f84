use kurbo::Point;

use crate::color::{Rgba, parse_css_color};

/// One resolved color stop; `position` is a fraction along the gradient line.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: Rgba,
}

/// A CSS linear gradient resolved against a target rectangle.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    /// Color at fraction `t` along the gradient line, with stops clamped at
    /// the ends. Used by the CPU renderer to evaluate fills.
    pub fn sample(&self, t: f64) -> Rgba {
        let Some(first) = self.stops.first() else {
            return Rgba::BLACK;
        };
        let last = self.stops.last().unwrap_or(first);
        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.position && t <= b.position {
                let span = b.position - a.position;
                let f = if span <= 0.0 { 0.0 } else { (t - a.position) / span };
                return lerp_rgba(a.color, b.color, f);
            }
        }
        last.color
    }
}

fn lerp_rgba(a: Rgba, b: Rgba, t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| -> u8 {
        (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8
    };
    Rgba::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

/// Parse a CSS `linear-gradient(...)` description against a `width`×`height`
/// rectangle.
///
/// Angle directions are resolved as the line through the rectangle's center
/// at that angle, spanning the diagonal; `to <side>` keywords map to
/// axis-aligned lines. Stops without an explicit percentage distribute
/// evenly over `[0, 1]`. Returns `None` (not an error) when no color stop
/// parses — the caller falls back to a flat fill.
pub fn parse_linear_gradient(css: &str, width: f64, height: f64) -> Option<LinearGradient> {
    let css = css.trim();
    let open = css.find("linear-gradient(")?;
    let inner = &css[open + "linear-gradient(".len()..];
    let close = inner.rfind(')')?;
    let content = &inner[..close];

    let segments = split_top_level(content);
    if segments.is_empty() {
        return None;
    }

    let mut start = Point::new(0.0, 0.0);
    let mut end = Point::new(width, 0.0);
    let mut stop_segments: &[String] = &segments;

    let first = segments[0].trim();
    if let Some(angle) = parse_angle_deg(first) {
        let rad = angle.to_radians();
        let length = (width * width + height * height).sqrt();
        let center = Point::new(width / 2.0, height / 2.0);
        let half = length / 2.0;
        start = Point::new(center.x - half * rad.cos(), center.y - half * rad.sin());
        end = Point::new(center.x + half * rad.cos(), center.y + half * rad.sin());
        stop_segments = &segments[1..];
    } else if let Some(dir) = first.strip_prefix("to ") {
        match dir.trim() {
            "right" => {
                start = Point::new(0.0, 0.0);
                end = Point::new(width, 0.0);
            }
            "left" => {
                start = Point::new(width, 0.0);
                end = Point::new(0.0, 0.0);
            }
            "bottom" => {
                start = Point::new(0.0, 0.0);
                end = Point::new(0.0, height);
            }
            "top" => {
                start = Point::new(0.0, height);
                end = Point::new(0.0, 0.0);
            }
            other => {
                tracing::warn!(direction = other, "unsupported gradient direction, using default");
            }
        }
        stop_segments = &segments[1..];
    }

    let mut raw = Vec::<(Rgba, Option<f64>)>::new();
    for seg in stop_segments {
        if let Some(stop) = parse_stop(seg) {
            raw.push(stop);
        }
    }
    if raw.is_empty() {
        return None;
    }

    let n = raw.len();
    let stops = raw
        .into_iter()
        .enumerate()
        .map(|(i, (color, explicit))| GradientStop {
            position: explicit.unwrap_or_else(|| {
                if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 }
            }),
            color,
        })
        .collect();

    Some(LinearGradient { start, end, stops })
}

/// Split on commas that are not nested inside parentheses, so
/// `rgb(1, 2, 3) 50%` stays one segment.
fn split_top_level(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out.retain(|s| !s.is_empty());
    out
}

fn parse_angle_deg(s: &str) -> Option<f64> {
    let num = s.strip_suffix("deg")?.trim();
    let v: f64 = num.parse().ok()?;
    v.is_finite().then_some(v)
}

/// A stop is `color [percentage]`; the percentage, when present, is the
/// last whitespace-separated token.
fn parse_stop(seg: &str) -> Option<(Rgba, Option<f64>)> {
    let seg = seg.trim();
    if let Some(idx) = seg.rfind(char::is_whitespace) {
        let (head, tail) = seg.split_at(idx);
        let tail = tail.trim();
        if let Some(pct) = tail.strip_suffix('%')
            && let Ok(v) = pct.parse::<f64>()
            && v.is_finite()
        {
            return parse_css_color(head).map(|c| (c, Some(v / 100.0)));
        }
    }
    parse_css_color(seg).map(|c| (c, None))
}
