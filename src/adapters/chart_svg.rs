//! SVG chart rendering for HTML pages.

use super::chart::{Bounds, ChartSeries, Frame};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 320.0;
const PADDING: f64 = 48.0;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render one or more series as an inline SVG line chart.
///
/// Returns an empty string when no series has points.
pub fn line_chart_svg(title: &str, series: &[ChartSeries]) -> String {
    let Some(bounds) = Bounds::of(series) else {
        return String::new();
    };
    let frame = Frame {
        left: PADDING,
        top: PADDING,
        width: WIDTH - 2.0 * PADDING,
        height: HEIGHT - 2.0 * PADDING,
    };

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" width="100%" role="img">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{WIDTH:.0}" height="{HEIGHT:.0}" fill="white"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="24" text-anchor="middle" font-size="16">{title}</text>"#,
        x = WIDTH / 2.0,
        title = escape(title)
    ));

    // axes
    let bottom = frame.top + frame.height;
    svg.push_str(&format!(
        r##"<line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}" stroke="#333"/><line x1="{l:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="#333"/>"##,
        l = frame.left,
        t = frame.top,
        b = bottom,
        r = frame.left + frame.width
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="{y:.1}" text-anchor="end" font-size="11">{max:.2}</text>"#,
        x = frame.left - 4.0,
        y = frame.top + 4.0,
        max = bounds.max_y
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="{y:.1}" text-anchor="end" font-size="11">{min:.2}</text>"#,
        x = frame.left - 4.0,
        y = bottom,
        min = bounds.min_y
    ));

    for (i, s) in series.iter().enumerate() {
        if s.points.is_empty() {
            continue;
        }
        let (r, g, b) = s.color;
        let coords: Vec<String> = s
            .points
            .iter()
            .map(|&(x, y)| {
                let (px, py) = bounds.project(&frame, x, y);
                format!("{px:.1},{py:.1}")
            })
            .collect();
        let dash = if s.dashed {
            r#" stroke-dasharray="6 4""#
        } else {
            ""
        };
        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="rgb({r},{g},{b})" stroke-width="1.5"{dash} points="{pts}"/>"#,
            pts = coords.join(" ")
        ));

        // legend
        let ly = HEIGHT - 14.0;
        let lx = frame.left + i as f64 * 180.0;
        svg.push_str(&format!(
            r#"<line x1="{lx:.1}" y1="{ly:.1}" x2="{x2:.1}" y2="{ly:.1}" stroke="rgb({r},{g},{b})" stroke-width="2"{dash}/><text x="{tx:.1}" y="{ty:.1}" font-size="11">{label}</text>"#,
            x2 = lx + 20.0,
            tx = lx + 26.0,
            ty = ly + 4.0,
            label = escape(&s.label)
        ));
    }

    svg.push_str("</svg>");
    svg
}
