//! Declarative chart descriptions
//!
//! A [`ChartSpec`] holds everything needed to draw one chart: which kind,
//! the data, the labels and the kind-specific styling. The on-screen plot
//! and the PNG exporter both consume the same spec.

use std::ops::RangeInclusive;

use palette::Srgb;

use crate::color::{self, Palette};
use crate::data::model::{CellValue, Table};
use crate::error::{ExploreError, Result};
use crate::stats::CategoricalSummary;

pub const MIN_BINS: u32 = 5;
pub const MAX_BINS: u32 = 150;
pub const BIN_RANGE: RangeInclusive<u32> = MIN_BINS..=MAX_BINS;
pub const DEFAULT_BINS: u32 = 30;
pub const DEFAULT_COLOR: &str = "#69b3a2";

pub const HISTOGRAM_TITLE: &str = "Histogram";
pub const DENSITY_TITLE: &str = "KDE Plot";
pub const BAR_TITLE: &str = "Proportion Bar Plot";
pub const BAR_Y_LABEL: &str = "count";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Histogram,
    Density,
    Bar,
}

impl ChartKind {
    /// File name offered when the chart is saved as an image.
    pub fn export_file_name(self) -> &'static str {
        match self {
            ChartKind::Histogram => "WebApp_HistFig.png",
            ChartKind::Density => "WebApp_KdeFig.png",
            ChartKind::Bar => "WebApp_BarFig.png",
        }
    }
}

// ---------------------------------------------------------------------------
// User-adjustable parameters
// ---------------------------------------------------------------------------

/// Histogram controls. `x_label: None` means "use the column name".
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramParams {
    pub bins: u32,
    pub color: String,
    pub title: String,
    pub x_label: Option<String>,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            color: DEFAULT_COLOR.to_string(),
            title: HISTOGRAM_TITLE.to_string(),
            x_label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityParams {
    pub color: String,
    pub title: String,
    pub x_label: Option<String>,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            title: DENSITY_TITLE.to_string(),
            x_label: None,
        }
    }
}

/// Bar chart controls. The palette is kept as the selector's text so an
/// unknown name is rejected when the chart is built.
#[derive(Debug, Clone, PartialEq)]
pub struct BarParams {
    pub palette: String,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: String,
}

impl Default for BarParams {
    fn default() -> Self {
        Self {
            palette: Palette::default().name().to_string(),
            title: BAR_TITLE.to_string(),
            x_label: None,
            y_label: BAR_Y_LABEL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChartSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Histogram {
        values: Vec<f64>,
        bins: u32,
        color: Srgb<u8>,
    },
    Density {
        values: Vec<f64>,
        color: Srgb<u8>,
    },
    Bar {
        levels: Vec<String>,
        counts: Vec<usize>,
        palette: Palette,
    },
}

/// One fully-configured chart. Built by the `build_*` functions and
/// read-only afterwards.
#[derive(Debug, PartialEq)]
pub struct ChartSpec {
    column: String,
    title: String,
    x_label: String,
    y_label: String,
    data: ChartData,
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self.data {
            ChartData::Histogram { .. } => ChartKind::Histogram,
            ChartData::Density { .. } => ChartKind::Density,
            ChartData::Bar { .. } => ChartKind::Bar,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }
}

fn validate_bins(bins: u32) -> Result<u32> {
    if BIN_RANGE.contains(&bins) {
        Ok(bins)
    } else {
        Err(ExploreError::invalid(
            "bins",
            format!("{bins} is outside {MIN_BINS}..={MAX_BINS}"),
        ))
    }
}

fn x_label_or(label: &Option<String>, column: &str) -> String {
    label.clone().unwrap_or_else(|| column.to_string())
}

/// Finite values of a numerical column.
fn numeric_values(table: &Table, column: &str) -> Result<Vec<f64>> {
    let col = table.require_column(column)?;
    if !col.dtype.is_numerical() {
        return Err(ExploreError::ColumnType {
            column: column.to_string(),
            expected: "numerical",
        });
    }
    let values: Vec<f64> = col
        .values
        .iter()
        .filter_map(CellValue::as_f64)
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(ExploreError::EmptyColumn(column.to_string()));
    }
    Ok(values)
}

pub fn build_histogram(table: &Table, column: &str, params: &HistogramParams) -> Result<ChartSpec> {
    let bins = validate_bins(params.bins)?;
    let color = color::parse_hex(&params.color)?;
    let values = numeric_values(table, column)?;

    Ok(ChartSpec {
        column: column.to_string(),
        title: params.title.clone(),
        x_label: x_label_or(&params.x_label, column),
        y_label: "Count".to_string(),
        data: ChartData::Histogram {
            values,
            bins,
            color,
        },
    })
}

pub fn build_density(table: &Table, column: &str, params: &DensityParams) -> Result<ChartSpec> {
    let color = color::parse_hex(&params.color)?;
    let values = numeric_values(table, column)?;

    Ok(ChartSpec {
        column: column.to_string(),
        title: params.title.clone(),
        x_label: x_label_or(&params.x_label, column),
        y_label: "Density".to_string(),
        data: ChartData::Density { values, color },
    })
}

/// Bar chart of level counts, one bar per level in summary order.
pub fn build_bar(summary: &CategoricalSummary, params: &BarParams) -> Result<ChartSpec> {
    let palette: Palette = params.palette.parse()?;
    let (levels, counts): (Vec<String>, Vec<usize>) = summary
        .levels
        .iter()
        .map(|l| (l.level.to_string(), l.count))
        .unzip();

    Ok(ChartSpec {
        column: summary.column.clone(),
        title: params.title.clone(),
        x_label: x_label_or(&params.x_label, &summary.column),
        y_label: params.y_label.clone(),
        data: ChartData::Bar {
            levels,
            counts,
            palette,
        },
    })
}
