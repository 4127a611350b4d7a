//! Line charts of daily series rendered as standalone SVG.

use super::html::html_escape;
use crate::Result;
use chrono::NaiveDate;
use core::fmt::Write;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 250.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 30.0;

/// Render `points` (in date order) as an SVG line chart under `title`
pub fn render_svg(title: &str, points: &[(NaiveDate, f64)]) -> Result<String> {
    let mut svg = String::new();

    writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">"
    )?;
    writeln!(svg, "  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>")?;
    writeln!(
        svg,
        "  <text x=\"{}\" y=\"20\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"14\">{}</text>",
        WIDTH / 2.0,
        html_escape(title)
    )?;

    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bottom = MARGIN_TOP + plot_height;

    writeln!(
        svg,
        "  <path d=\"M{MARGIN_LEFT},{MARGIN_TOP} V{bottom} H{}\" fill=\"none\" stroke=\"#444\"/>",
        MARGIN_LEFT + plot_width
    )?;

    if let (Some(&(first, _)), Some(&(last, _))) = (points.first(), points.last()) {
        let max = points.iter().map(|&(_, v)| v).fold(0.0_f64, f64::max);
        let y_max = if max > 0.0 { max } else { 1.0 };

        #[expect(clippy::cast_precision_loss, reason = "a series spans far fewer than 2^52 days")]
        let span = (last - first).num_days().max(1) as f64;

        let mut coords = String::new();
        for &(day, value) in points {
            #[expect(clippy::cast_precision_loss, reason = "a series spans far fewer than 2^52 days")]
            let offset = (day - first).num_days() as f64;
            let x = MARGIN_LEFT + plot_width * offset / span;
            let y = bottom - plot_height * value / y_max;
            write!(coords, "{x:.1},{y:.1} ")?;
        }

        writeln!(svg, "  <polyline points=\"{}\" fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"2\"/>", coords.trim_end())?;

        write_label(&mut svg, MARGIN_LEFT - 5.0, MARGIN_TOP + 5.0, "end", &format_value(y_max))?;
        write_label(&mut svg, MARGIN_LEFT - 5.0, bottom, "end", "0")?;
        write_label(&mut svg, MARGIN_LEFT, bottom + 18.0, "start", &first.format("%Y-%m-%d").to_string())?;
        write_label(&mut svg, MARGIN_LEFT + plot_width, bottom + 18.0, "end", &last.format("%Y-%m-%d").to_string())?;
    }

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

fn write_label(svg: &mut String, x: f64, y: f64, anchor: &str, text: &str) -> Result<()> {
    writeln!(
        svg,
        "  <text x=\"{x}\" y=\"{y}\" text-anchor=\"{anchor}\" font-family=\"sans-serif\" font-size=\"11\">{text}</text>"
    )?;
    Ok(())
}

fn format_value(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_chart_has_title_and_line() {
        let svg = render_svg("Total number of git clones for a/x", &[(day(1), 3.0), (day(2), 0.0), (day(3), 1.0)]).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Total number of git clones for a/x"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("2024-01-03"));
    }

    #[test]
    fn test_chart_scales_to_maximum() {
        let svg = render_svg("t", &[(day(1), 0.0), (day(2), 10.0)]).unwrap();

        // first point on the x axis, second at the top of the plot area
        assert!(svg.contains("60.0,220.0 980.0,30.0"));
        assert!(svg.contains(">10</text>"));
    }

    #[test]
    fn test_chart_single_point() {
        let svg = render_svg("t", &[(day(1), 42.0)]).unwrap();
        assert!(svg.contains("60.0,30.0"));
    }

    #[test]
    fn test_chart_all_zero() {
        let svg = render_svg("t", &[(day(1), 0.0), (day(2), 0.0)]).unwrap();
        assert!(svg.contains("60.0,220.0 980.0,220.0"));
    }

    #[test]
    fn test_chart_without_points_has_no_line() {
        let svg = render_svg("t", &[]).unwrap();
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_chart_escapes_title() {
        let svg = render_svg("<b>&</b>", &[]).unwrap();
        assert!(svg.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }
}
