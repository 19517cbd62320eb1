//! Trend chart rendering
//!
//! Draws a line chart of a trend series (title, axis labels, y ticks,
//! polyline, one marker per point) into an in-memory PNG and embeds it in
//! answer text as a base64 `<img>` tag. Rendering is stateless; every call
//! allocates its own buffer.

use std::io::Cursor;

use ab_glyph::FontRef;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops, DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size,
};

use crate::context::TrendFinding;
use crate::dataset::Value;
use crate::error::{Result, SheetQaError};

const MARGIN_LEFT: i64 = 76;
const MARGIN_RIGHT: i64 = 24;
const MARGIN_TOP: i64 = 44;
const MARGIN_BOTTOM: i64 = 52;
const MARKER_RADIUS: i32 = 4;
const GRID_STEPS: i64 = 4;

const TITLE_SCALE: f32 = 18.0;
const LABEL_SCALE: f32 = 14.0;
const TICK_SCALE: f32 = 11.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);

/// DejaVu Sans, see `assets/fonts/LICENSE`
static FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// A rendered chart together with the labels it was drawn for
#[derive(Debug, Clone)]
pub struct Chart {
    /// PNG-encoded image
    pub png: Vec<u8>,
    /// Chart title
    pub title: String,
    /// X axis label
    pub x_label: String,
    /// Y axis label
    pub y_label: String,
}

impl Chart {
    /// HTML `<img>` tag with the PNG inlined as a data URI
    ///
    /// The title and axis labels travel in the `alt` and `title`
    /// attributes.
    pub fn to_img_tag(&self) -> String {
        format!(
            "<img src=\"data:image/png;base64,{}\" alt=\"{}\" title=\"{} ({} vs {})\"/>",
            STANDARD.encode(&self.png),
            escape_attr(&self.title),
            escape_attr(&self.title),
            escape_attr(&self.y_label),
            escape_attr(&self.x_label)
        )
    }
}

/// Renders a series of (x, y) points to an image
pub trait ChartRenderer: Send + Sync {
    /// Render the series
    ///
    /// # Errors
    ///
    /// Returns `SheetQaError::Chart` if the series cannot be drawn or encoded
    fn render(&self, series: &[(f64, f64)], title: &str, x_label: &str, y_label: &str)
        -> Result<Chart>;
}

/// PNG line-chart renderer backed by the `image` crate
#[derive(Debug, Clone, Copy)]
pub struct PngChartRenderer {
    width: u32,
    height: u32,
}

impl PngChartRenderer {
    /// Create a renderer producing images of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self::new(640, 400)
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(
        &self,
        series: &[(f64, f64)],
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Result<Chart> {
        if series.is_empty() {
            return Err(SheetQaError::Chart("series is empty".to_string()).into());
        }
        if series.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(SheetQaError::Chart("series has non-finite values".to_string()).into());
        }

        let (w, h) = (self.width as i64, self.height as i64);
        let plot_w = w - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = h - MARGIN_TOP - MARGIN_BOTTOM;
        if plot_w <= 0 || plot_h <= 0 {
            return Err(SheetQaError::Chart(format!(
                "image {}x{} is too small to plot",
                self.width, self.height
            ))
            .into());
        }

        let (x_min, x_max) = padded_bounds(series.iter().map(|p| p.0));
        let (y_min, y_max) = padded_bounds(series.iter().map(|p| p.1));
        let to_pixel = |(x, y): (f64, f64)| -> (i64, i64) {
            let px = MARGIN_LEFT + ((x - x_min) / (x_max - x_min) * plot_w as f64).round() as i64;
            let py = MARGIN_TOP + plot_h
                - ((y - y_min) / (y_max - y_min) * plot_h as f64).round() as i64;
            (px, py)
        };

        let font = FontRef::try_from_slice(FONT_DATA)
            .map_err(|e| SheetQaError::Chart(format!("bundled font is invalid: {}", e)))?;
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let (left, top, right, bottom) = (
            MARGIN_LEFT as f32,
            MARGIN_TOP as f32,
            (MARGIN_LEFT + plot_w) as f32,
            (MARGIN_TOP + plot_h) as f32,
        );

        for step in 0..=GRID_STEPS {
            let gy = MARGIN_TOP + plot_h * step / GRID_STEPS;
            draw_line_segment_mut(&mut img, (left, gy as f32), (right, gy as f32), GRID);

            let value = y_max - (y_max - y_min) * step as f64 / GRID_STEPS as f64;
            let tick = tick_label(value);
            let (tw, th) = text_size(TICK_SCALE, &font, &tick);
            draw_text_mut(
                &mut img,
                AXIS,
                (MARGIN_LEFT - 6 - tw as i64) as i32,
                (gy - th as i64 / 2) as i32,
                TICK_SCALE,
                &font,
                &tick,
            );
        }
        draw_line_segment_mut(&mut img, (left, top), (left, bottom), AXIS);
        draw_line_segment_mut(&mut img, (left, bottom), (right, bottom), AXIS);

        let points: Vec<(i64, i64)> = series.iter().copied().map(to_pixel).collect();
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            for offset in [0.0, 1.0] {
                draw_line_segment_mut(
                    &mut img,
                    (a.0 as f32, a.1 as f32 + offset),
                    (b.0 as f32, b.1 as f32 + offset),
                    LINE,
                );
            }
        }
        for &(x, y) in &points {
            draw_filled_circle_mut(&mut img, (x as i32, y as i32), MARKER_RADIUS, LINE);
        }

        let (tw, _) = text_size(TITLE_SCALE, &font, title);
        draw_text_mut(
            &mut img,
            AXIS,
            ((w - tw as i64) / 2).max(0) as i32,
            12,
            TITLE_SCALE,
            &font,
            title,
        );

        let (xw, xh) = text_size(LABEL_SCALE, &font, x_label);
        draw_text_mut(
            &mut img,
            AXIS,
            (MARGIN_LEFT + (plot_w - xw as i64) / 2).max(0) as i32,
            (h - 12 - xh as i64) as i32,
            LABEL_SCALE,
            &font,
            x_label,
        );

        let y_caption = vertical_label(&font, y_label);
        let caption_top = MARGIN_TOP + (plot_h - y_caption.height() as i64) / 2;
        imageops::overlay(&mut img, &y_caption, 8, caption_top.max(0));

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| SheetQaError::Chart(format!("PNG encoding failed: {}", e)))?;

        tracing::debug!("Rendered chart '{}': {} bytes", title, png.len());

        Ok(Chart {
            png,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
        })
    }
}

/// Title used for a trend chart
pub fn chart_title(trend: &TrendFinding) -> String {
    format!(
        "Trend of {} over {}",
        trend.numeric_column, trend.temporal_column
    )
}

/// Render the full series of a trend finding
///
/// # Errors
///
/// Propagates renderer failures
pub fn render_trend(renderer: &dyn ChartRenderer, trend: &TrendFinding) -> Result<Chart> {
    let series = trend_points(trend);
    renderer.render(
        &series,
        &chart_title(trend),
        &trend.temporal_column,
        &trend.numeric_column,
    )
}

/// Map a trend series onto numeric x coordinates
///
/// Numeric time values are used as-is, dates become Unix seconds and
/// anything else is spaced evenly by position.
pub fn trend_points(trend: &TrendFinding) -> Vec<(f64, f64)> {
    let xs: Option<Vec<f64>> = trend.series.iter().map(|(t, _)| axis_value(t)).collect();
    match xs {
        Some(xs) => xs
            .into_iter()
            .zip(trend.series.iter().map(|(_, y)| *y))
            .collect(),
        None => trend
            .series
            .iter()
            .enumerate()
            .map(|(i, (_, y))| (i as f64, *y))
            .collect(),
    }
}

fn axis_value(value: &Value) -> Option<f64> {
    match value {
        Value::DateTime(dt) => Some(dt.and_utc().timestamp() as f64),
        other => other.as_f64(),
    }
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if (max - min).abs() < f64::EPSILON {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - pad, max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Text rotated a quarter turn counter-clockwise, read bottom to top
fn vertical_label(font: &FontRef<'_>, text: &str) -> RgbImage {
    let (tw, th) = text_size(LABEL_SCALE, font, text);
    let mut strip = RgbImage::from_pixel(tw.max(1), th.max(1) + 4, BACKGROUND);
    draw_text_mut(&mut strip, AXIS, 0, 0, LABEL_SCALE, font, text);
    imageops::rotate270(&strip)
}

fn tick_label(value: f64) -> String {
    if value.abs() >= 100.0 || (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn trend() -> TrendFinding {
        TrendFinding {
            temporal_column: "Year".into(),
            numeric_column: "Revenue".into(),
            start: Value::Int(100),
            end: Value::Int(150),
            series: vec![
                (Value::Int(2022), 80.0),
                (Value::Int(2023), 100.0),
                (Value::Int(2024), 150.0),
            ],
        }
    }

    #[test]
    fn test_render_produces_png() {
        let chart = render_trend(&PngChartRenderer::default(), &trend()).unwrap();
        assert_eq!(&chart.png[..8], &PNG_SIGNATURE);
        assert_eq!(chart.title, "Trend of Revenue over Year");
        assert_eq!(chart.x_label, "Year");
        assert_eq!(chart.y_label, "Revenue");
    }

    #[test]
    fn test_marker_drawn_at_each_point() {
        let renderer = PngChartRenderer::new(200, 150);
        let chart = renderer.render(&[(0.0, 0.0), (1.0, 1.0)], "t", "x", "y").unwrap();
        let img = image::load_from_memory(&chart.png).unwrap().to_rgb8();
        let line_pixels = img.pixels().filter(|p| **p == LINE).count();
        assert!(line_pixels > 2 * 9);
    }

    #[test]
    fn test_title_and_labels_are_drawn() {
        let renderer = PngChartRenderer::default();
        let series = [(2023.0, 100.0), (2024.0, 150.0)];
        let labelled = renderer
            .render(&series, "Trend of Revenue over Year", "Year", "Revenue")
            .unwrap();
        let other = renderer
            .render(&series, "completely different", "x", "y")
            .unwrap();
        assert_ne!(labelled.png, other.png);

        let img = image::load_from_memory(&labelled.png).unwrap().to_rgb8();
        let inked = |xs: std::ops::Range<u32>, ys: std::ops::Range<u32>| {
            ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
                .filter(|&(x, y)| {
                    let p = *img.get_pixel(x, y);
                    p != BACKGROUND && p != GRID
                })
                .count()
        };
        // title band, x label band, y label strip
        assert!(inked(MARGIN_LEFT as u32..640, 0..MARGIN_TOP as u32 - 8) > 0);
        assert!(inked(MARGIN_LEFT as u32..640, 400 - 28..400) > 0);
        assert!(inked(0..28, MARGIN_TOP as u32..400 - MARGIN_BOTTOM as u32) > 0);
    }

    #[test]
    fn test_tick_label() {
        assert_eq!(tick_label(150.0), "150");
        assert_eq!(tick_label(1234.56), "1235");
        assert_eq!(tick_label(0.125), "0.13");
    }

    #[test]
    fn test_render_flat_series() {
        let renderer = PngChartRenderer::default();
        assert!(renderer.render(&[(1.0, 5.0), (2.0, 5.0)], "t", "x", "y").is_ok());
    }

    #[test]
    fn test_render_rejects_empty_and_tiny() {
        assert!(PngChartRenderer::default().render(&[], "t", "x", "y").is_err());
        assert!(PngChartRenderer::new(50, 50)
            .render(&[(0.0, 1.0)], "t", "x", "y")
            .is_err());
    }

    #[test]
    fn test_text_axis_spaced_by_position() {
        let mut t = trend();
        t.series = vec![(Value::Text("Q1".into()), 1.0), (Value::Text("Q2".into()), 2.0)];
        assert_eq!(trend_points(&t), vec![(0.0, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_img_tag_embeds_base64_and_title() {
        let chart = render_trend(&PngChartRenderer::default(), &trend()).unwrap();
        let tag = chart.to_img_tag();
        assert!(tag.starts_with("<img src=\"data:image/png;base64,iVBORw0KGgo"));
        assert!(tag.contains("alt=\"Trend of Revenue over Year\""));
    }
}
