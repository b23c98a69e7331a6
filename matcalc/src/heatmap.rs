//! Heatmap rendering
//!
//! Colors each cell by its value, normalised to [0, 1] over the matrix's
//! own min..max range, through plotters' viridis colormap, and appends a
//! legend strip mapping colors back to values. The SVG style draws a real
//! image; the text styles are for clients that only show text.

use std::fmt;
use std::str::FromStr;

use crate::render::NumberFormat;
use matcalc_core::{codes, CalcError, Matrix};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const EPSILON: f64 = 1e-12;
const LEGEND_WIDTH: usize = 24;
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

// SVG layout, in pixels
const CELL: i32 = 56;
const MARGIN: i32 = 20;
const TITLE_HEIGHT: i32 = 36;
const LEGEND_GAP: i32 = 20;
const LEGEND_HEIGHT: i32 = 16;
const LEGEND_STEPS: i32 = 64;
const LABEL_HEIGHT: i32 = 24;
const MIN_PLOT_WIDTH: i32 = 240;

/// Output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeatmapStyle {
    /// 24-bit ANSI background colors
    Ansi,
    /// Shade glyphs, no escape codes
    #[default]
    Plain,
    /// SVG image with a colorbar
    Svg,
}

impl FromStr for HeatmapStyle {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ansi" | "color" => Ok(HeatmapStyle::Ansi),
            "plain" | "text" => Ok(HeatmapStyle::Plain),
            "svg" => Ok(HeatmapStyle::Svg),
            _ => Err(CalcError::new(codes::ARG_TYPE, format!("Unknown heatmap style '{}'", s.trim()))
                .with_suggestion("Use plain, ansi or svg")),
        }
    }
}

impl fmt::Display for HeatmapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeatmapStyle::Ansi => "ansi",
            HeatmapStyle::Plain => "plain",
            HeatmapStyle::Svg => "svg",
        })
    }
}

/// Viridis color for t in [0, 1]; out-of-range and NaN are clamped
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    ViridisRGB.get_color(t as f32)
}

/// Position of `value` within `min..max`; a flat range maps to 0
pub fn normalise(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range.abs() <= EPSILON {
        0.0
    } else {
        ((value - min) / range).clamp(0.0, 1.0)
    }
}

fn shade(t: f64) -> char {
    SHADES[(t * (SHADES.len() - 1) as f64).round() as usize]
}

// Dark text on the bright end of the ramp
fn is_bright(c: RGBColor) -> bool {
    0.299 * c.0 as f64 + 0.587 * c.1 as f64 + 0.114 * c.2 as f64 > 140.0
}

fn draw_error(e: impl fmt::Display) -> CalcError {
    CalcError::internal(format!("heatmap drawing failed: {}", e))
}

/// Heatmap renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct Heatmap {
    style: HeatmapStyle,
    format: NumberFormat,
}

impl Heatmap {
    pub fn new(style: HeatmapStyle, format: NumberFormat) -> Self {
        Self { style, format }
    }

    pub fn style(&self) -> HeatmapStyle {
        self.style
    }

    pub fn render(&self, m: &Matrix, title: &str) -> Result<String, CalcError> {
        match self.style {
            HeatmapStyle::Svg => self.render_svg(m, title),
            HeatmapStyle::Ansi | HeatmapStyle::Plain => Ok(self.render_text(m, title)),
        }
    }

    fn cells(&self, m: &Matrix) -> (Vec<Vec<(String, f64)>>, f64, f64) {
        let (min, max) = m.min_max();
        let cells = m.to_rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| (self.format.format(*v), normalise(*v, min, max)))
                    .collect()
            })
            .collect();
        (cells, min, max)
    }

    fn render_text(&self, m: &Matrix, title: &str) -> String {
        let (cells, min, max) = self.cells(m);
        let width = cells.iter()
            .flatten()
            .map(|(s, _)| s.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(title);
        out.push('\n');

        for row in &cells {
            let line: Vec<String> = row.iter()
                .map(|(text, t)| self.text_cell(text, *t, width))
                .collect();
            out.push_str(&line.join(self.separator()));
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&self.text_legend(min, max));
        out
    }

    fn separator(&self) -> &'static str {
        match self.style {
            HeatmapStyle::Plain => "  ",
            _ => "",
        }
    }

    fn text_cell(&self, text: &str, t: f64, width: usize) -> String {
        match self.style {
            HeatmapStyle::Plain => {
                let s = shade(t);
                format!("{}{} {:>w$}", s, s, text, w = width)
            }
            _ => {
                let c = viridis(t);
                let fg = if is_bright(c) { "30" } else { "97" };
                format!("\x1b[48;2;{};{};{}m\x1b[{}m {:>w$} \x1b[0m", c.0, c.1, c.2, fg, text, w = width)
            }
        }
    }

    fn text_legend(&self, min: f64, max: f64) -> String {
        let bar: String = (0..LEGEND_WIDTH)
            .map(|i| {
                let t = i as f64 / (LEGEND_WIDTH - 1) as f64;
                match self.style {
                    HeatmapStyle::Plain => shade(t).to_string(),
                    _ => {
                        let c = viridis(t);
                        format!("\x1b[48;2;{};{};{}m \x1b[0m", c.0, c.1, c.2)
                    }
                }
            })
            .collect();
        format!("{} {} {}", self.format.format(min), bar, self.format.format(max))
    }

    /// SVG document: title, one square per cell with its value, and a
    /// horizontal colorbar labelled with min and max
    pub fn render_svg(&self, m: &Matrix, title: &str) -> Result<String, CalcError> {
        let (cells, min, max) = self.cells(m);
        let rows = m.rows() as i32;
        let cols = m.cols() as i32;
        let plot_width = (cols * CELL).max(MIN_PLOT_WIDTH);
        let width = plot_width + 2 * MARGIN;
        let grid_top = TITLE_HEIGHT;
        let legend_top = grid_top + rows * CELL + LEGEND_GAP;
        let height = legend_top + LEGEND_HEIGHT + LABEL_HEIGHT + MARGIN;

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width as u32, height as u32)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            let title_style = ("sans-serif", 20).into_font().color(&BLACK);
            root.draw(&Text::new(title.to_string(), (MARGIN, 8), title_style))
                .map_err(draw_error)?;

            for (i, row) in cells.iter().enumerate() {
                for (j, (text, t)) in row.iter().enumerate() {
                    let x0 = MARGIN + j as i32 * CELL;
                    let y0 = grid_top + i as i32 * CELL;
                    let color = viridis(*t);
                    root.draw(&Rectangle::new([(x0, y0), (x0 + CELL, y0 + CELL)], color.filled()))
                        .map_err(draw_error)?;

                    let fg = if is_bright(color) { BLACK } else { WHITE };
                    let label_style = ("sans-serif", 14)
                        .into_font()
                        .color(&fg)
                        .pos(Pos::new(HPos::Center, VPos::Center));
                    root.draw(&Text::new(text.clone(), (x0 + CELL / 2, y0 + CELL / 2), label_style))
                        .map_err(draw_error)?;
                }
            }

            for k in 0..LEGEND_STEPS {
                let x0 = MARGIN + k * plot_width / LEGEND_STEPS;
                let x1 = MARGIN + (k + 1) * plot_width / LEGEND_STEPS;
                let color = viridis(k as f64 / (LEGEND_STEPS - 1) as f64);
                root.draw(&Rectangle::new([(x0, legend_top), (x1, legend_top + LEGEND_HEIGHT)], color.filled()))
                    .map_err(draw_error)?;
            }

            let label_y = legend_top + LEGEND_HEIGHT + 4;
            let min_style = ("sans-serif", 13).into_font().color(&BLACK);
            root.draw(&Text::new(self.format.format(min), (MARGIN, label_y), min_style))
                .map_err(draw_error)?;
            let max_style = ("sans-serif", 13)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Right, VPos::Top));
            root.draw(&Text::new(self.format.format(max), (MARGIN + plot_width, label_y), max_style))
                .map_err(draw_error)?;

            root.present().map_err(draw_error)?;
        }
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcalc_core::parse_matrix;

    #[test]
    fn test_viridis_endpoints() {
        let low = viridis(0.0);
        let high = viridis(1.0);
        assert!(!is_bright(low));
        assert!(is_bright(high));
        assert_ne!(low, high);
        assert_eq!(viridis(-3.0), low);
        assert_eq!(viridis(7.0), high);
        assert_eq!(viridis(f64::NAN), low);
    }

    #[test]
    fn test_normalise() {
        assert_eq!(normalise(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalise(-1.0, -1.0, 3.0), 0.0);
        assert_eq!(normalise(3.0, -1.0, 3.0), 1.0);
        assert_eq!(normalise(2.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_plain_heatmap() {
        let m = matcalc_core::parse_matrix("1 2\n3 5").unwrap();
        let out = Heatmap::default().render(&m, "Matrix A").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Matrix A");
        assert_eq!(lines[1], "   1  ░░ 2");
        assert_eq!(lines[2], "▒▒ 3  ██ 5");
        assert_eq!(lines[3], "");
        assert!(lines[4].starts_with("1  "));
        assert!(lines[4].ends_with("█ 5"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_constant_matrix_does_not_divide_by_zero() {
        let m = parse_matrix("7 7\n7 7").unwrap();
        let out = Heatmap::default().render(&m, "flat").unwrap();
        assert!(out.contains("   7"));
        assert!(!out.contains("NaN"));
    }

    #[test]
    fn test_ansi_heatmap_uses_colormap() {
        let m = parse_matrix("0 1").unwrap();
        let out = Heatmap::new(HeatmapStyle::Ansi, NumberFormat::Shortest).render(&m, "t").unwrap();
        let (low, high) = (viridis(0.0), viridis(1.0));
        assert!(out.contains(&format!("\x1b[48;2;{};{};{}m", low.0, low.1, low.2)));
        assert!(out.contains(&format!("\x1b[48;2;{};{};{}m", high.0, high.1, high.2)));
        assert!(out.contains("\x1b[0m"));
    }

    #[test]
    fn test_svg_heatmap() {
        let m = matcalc_core::parse_matrix("1 2\n3 5").unwrap();
        let svg = Heatmap::new(HeatmapStyle::Svg, NumberFormat::Shortest).render(&m, "Matrix A").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Matrix A"));
        // 4 cells + background + colorbar steps
        assert!(svg.matches("<rect").count() >= 4 + LEGEND_STEPS as usize);
        assert!(svg.contains(">5<"));
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("ANSI".parse::<HeatmapStyle>().unwrap(), HeatmapStyle::Ansi);
        assert_eq!("plain".parse::<HeatmapStyle>().unwrap(), HeatmapStyle::Plain);
        assert_eq!(" svg ".parse::<HeatmapStyle>().unwrap(), HeatmapStyle::Svg);
        let err = "png".parse::<HeatmapStyle>().unwrap_err();
        assert_eq!(err.code, codes::ARG_TYPE);
        assert_eq!(HeatmapStyle::Svg.to_string(), "svg");
    }
}
