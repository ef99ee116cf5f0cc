use std::io::Cursor;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use image::{ImageFormat, RgbImage};
use palette::Srgb;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::chart::{ChartData, ChartSpec};
use crate::color::Palette;
use crate::stats::{gaussian_kde, histogram};

// ---------------------------------------------------------------------------
// Raster export of a ChartSpec
// ---------------------------------------------------------------------------

/// A 6.4 × 4.8 inch figure at 300 DPI.
pub const EXPORT_WIDTH: u32 = 1920;
pub const EXPORT_HEIGHT: u32 = 1440;

const FONT_FAMILY: &str = "sans-serif";
const TITLE_SIZE: u32 = 64;
const AXIS_DESC_SIZE: u32 = 44;
const TICK_LABEL_SIZE: u32 = 34;

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Register the bundled UI font under the family the exporter draws with.
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, epaint_default_fonts::UBUNTU_LIGHT)
                .map_err(|_| "invalid font data".to_string())
        })
        .clone()
        .map_err(|e| anyhow!("loading export font: {e}"))
}

fn rgb(c: Srgb<u8>) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

/// Chart area with caption and label gutters, shared by every chart kind.
fn chart_builder<'a, 'b>(
    root: &'a Canvas<'b>,
    spec: &ChartSpec,
) -> ChartBuilder<'a, 'static, BitMapBackend<'b>> {
    let mut builder = ChartBuilder::on(root);
    builder
        .caption(spec.title(), (FONT_FAMILY, TITLE_SIZE))
        .margin(48)
        .x_label_area_size(140)
        .y_label_area_size(180);
    builder
}

fn draw_histogram(
    root: &Canvas<'_>,
    spec: &ChartSpec,
    values: &[f64],
    bins: u32,
    color: Srgb<u8>,
) -> Result<()> {
    let hist = histogram(values, bins as usize);
    let x_min = hist.edges[0];
    let x_max = hist.edges[hist.edges.len() - 1];
    let y_max = (hist.max_count() as f64 * 1.05).max(1.0);

    let mut chart = chart_builder(root, spec).build_cartesian_2d(x_min..x_max, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc(spec.x_label())
        .y_desc(spec.y_label())
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
        .label_style((FONT_FAMILY, TICK_LABEL_SIZE))
        .draw()?;

    let bars: Vec<[(f64, f64); 2]> = hist
        .edges
        .windows(2)
        .zip(&hist.counts)
        .filter(|&(_, &count)| count > 0)
        .map(|(edge, &count)| [(edge[0], 0.0), (edge[1], count as f64)])
        .collect();
    let fill = rgb(color).filled();
    chart.draw_series(bars.iter().map(|&corners| Rectangle::new(corners, fill)))?;
    chart.draw_series(bars.iter().map(|&corners| Rectangle::new(corners, BLACK.stroke_width(2))))?;
    Ok(())
}

fn draw_density(root: &Canvas<'_>, spec: &ChartSpec, values: &[f64], color: Srgb<u8>) -> Result<()> {
    let curve = gaussian_kde(values);
    let (x_range, y_max) = match &curve {
        Some(c) => (
            c.points[0][0]..c.points[c.points.len() - 1][0],
            (c.max_density() * 1.05).max(f64::MIN_POSITIVE),
        ),
        None => {
            log::warn!(
                "Column '{}' has too little variance for a density estimate",
                spec.column()
            );
            (0.0..1.0, 1.0)
        }
    };

    let mut chart = chart_builder(root, spec).build_cartesian_2d(x_range, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc(spec.x_label())
        .y_desc(spec.y_label())
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
        .label_style((FONT_FAMILY, TICK_LABEL_SIZE))
        .draw()?;

    if let Some(curve) = curve {
        chart.draw_series(LineSeries::new(
            curve.points.iter().map(|p| (p[0], p[1])),
            rgb(color).stroke_width(5),
        ))?;
    }
    Ok(())
}

fn draw_bars(
    root: &Canvas<'_>,
    spec: &ChartSpec,
    levels: &[String],
    counts: &[usize],
    palette: Palette,
) -> Result<()> {
    let n = levels.len();
    let y_max = (counts.iter().copied().max().unwrap_or(0) as f64 * 1.05).max(1.0);

    let mut chart = chart_builder(root, spec)
        .build_cartesian_2d((0usize..n).into_segmented(), 0f64..y_max)?;
    let level_name = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => levels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&level_name)
        .x_desc(spec.x_label())
        .y_desc(spec.y_label())
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
        .label_style((FONT_FAMILY, TICK_LABEL_SIZE))
        .draw()?;

    chart.draw_series(
        counts
            .iter()
            .zip(palette.colors(n))
            .enumerate()
            .map(|(i, (&count, color))| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), count as f64),
                    ],
                    rgb(color).filled(),
                );
                bar.set_margin(0, 0, 24, 24);
                bar
            }),
    )?;
    Ok(())
}

/// Rasterize a chart, with its title and axis labels, at the fixed export
/// resolution.
pub fn render(spec: &ChartSpec) -> Result<RgbImage> {
    ensure_font()?;
    let mut buf = vec![0u8; (EXPORT_WIDTH * EXPORT_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (EXPORT_WIDTH, EXPORT_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)?;
        match spec.data() {
            ChartData::Histogram {
                values,
                bins,
                color,
            } => draw_histogram(&root, spec, values, *bins, *color)?,
            ChartData::Density { values, color } => draw_density(&root, spec, values, *color)?,
            ChartData::Bar {
                levels,
                counts,
                palette,
            } => draw_bars(&root, spec, levels, counts, *palette)?,
        }
        root.present()?;
    }
    RgbImage::from_raw(EXPORT_WIDTH, EXPORT_HEIGHT, buf).context("export buffer has the wrong size")
}

/// Rasterize a chart and encode it as PNG.
pub fn render_png(spec: &ChartSpec) -> Result<Vec<u8>> {
    let img = render(spec)?;
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .with_context(|| format!("encoding {:?} chart as PNG", spec.kind()))?;
    Ok(buf.into_inner())
}

/// Render a chart and write it to `path`.
pub fn save_png(spec: &ChartSpec, path: &Path) -> Result<()> {
    let bytes = render_png(spec)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {:?} chart to {}", spec.kind(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, Rgb};

    use super::*;
    use crate::chart::{
        build_bar, build_density, build_histogram, BarParams, DensityParams, HistogramParams,
    };
    use crate::data::loader::parse_csv;
    use crate::data::model::Table;
    use crate::stats::summarize_categorical;

    fn table() -> Table {
        parse_csv(b"age,gender,flat\n10,M,1\n20,F,1\n30,M,1\n40,M,1\n50,F,1\n").unwrap()
    }

    fn contains(img: &RgbImage, color: Rgb<u8>) -> bool {
        img.pixels().any(|p| *p == color)
    }

    fn pixel(c: Srgb<u8>) -> Rgb<u8> {
        Rgb([c.red, c.green, c.blue])
    }

    #[test]
    fn histogram_png_has_export_size() {
        let spec = build_histogram(&table(), "age", &HistogramParams::default()).unwrap();
        let bytes = render_png(&spec).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), EXPORT_WIDTH);
        assert_eq!(decoded.height(), EXPORT_HEIGHT);
        assert!(contains(&decoded.to_rgb8(), Rgb([0x69, 0xb3, 0xa2])));
    }

    #[test]
    fn title_and_labels_reach_the_image() {
        let table = table();
        let plain = build_histogram(&table, "age", &HistogramParams::default()).unwrap();

        let retitled = HistogramParams {
            title: "Age distribution of respondents".into(),
            ..Default::default()
        };
        let relabelled = HistogramParams {
            x_label: Some("years of age".into()),
            ..Default::default()
        };
        let retitled = build_histogram(&table, "age", &retitled).unwrap();
        let relabelled = build_histogram(&table, "age", &relabelled).unwrap();

        let base = render(&plain).unwrap();
        assert_ne!(base, render(&retitled).unwrap());
        assert_ne!(base, render(&relabelled).unwrap());
    }

    #[test]
    fn bar_y_label_reaches_the_image() {
        let summary = summarize_categorical(&table(), "gender").unwrap();
        let plain = build_bar(&summary, &BarParams::default()).unwrap();
        let params = BarParams {
            y_label: "respondents".into(),
            ..Default::default()
        };
        let relabelled = build_bar(&summary, &params).unwrap();
        assert_ne!(render(&plain).unwrap(), render(&relabelled).unwrap());
    }

    #[test]
    fn density_uses_chosen_color() {
        let params = DensityParams {
            color: "#ff0000".into(),
            ..Default::default()
        };
        let spec = build_density(&table(), "age", &params).unwrap();
        assert!(contains(&render(&spec).unwrap(), Rgb([255, 0, 0])));
    }

    #[test]
    fn flat_density_still_renders_axes() {
        let spec = build_density(&table(), "flat", &DensityParams::default()).unwrap();
        let img = render(&spec).unwrap();
        assert!(contains(&img, Rgb([0, 0, 0])));
        assert!(!contains(&img, Rgb([0x69, 0xb3, 0xa2])));
    }

    #[test]
    fn bars_use_palette() {
        let summary = summarize_categorical(&table(), "gender").unwrap();
        let spec = build_bar(&summary, &BarParams::default()).unwrap();
        let img = render(&spec).unwrap();
        for color in Palette::Magma.colors(2) {
            assert!(contains(&img, pixel(color)));
        }
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let spec = build_histogram(&table(), "age", &HistogramParams::default()).unwrap();
        let path = dir.path().join(spec.kind().export_file_name());

        save_png(&spec, &path).unwrap();

        let written = image::open(&path).unwrap();
        assert_eq!(written.dimensions(), (EXPORT_WIDTH, EXPORT_HEIGHT));
    }
}
