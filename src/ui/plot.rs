use eframe::egui::{self, Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::chart::{
    BarParams, ChartData, ChartSpec, DensityParams, HistogramParams, BIN_RANGE, DEFAULT_COLOR,
};
use crate::color::{self, Palette};
use crate::export;
use crate::pipeline::Analysis;
use crate::state::{NumericalTab, SessionState};
use crate::stats::{gaussian_kde, histogram};
use crate::ui::tables;

const PLOT_HEIGHT: f32 = 360.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render tables, summaries and charts in the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut SessionState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore it  (File → Open…)");
        });
        return;
    };

    let mut export_error = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if state.selections.show_table {
                tables::data_table(ui, table);
            }
            if state.selections.show_info {
                tables::info(ui, table);
            }
            if table.is_empty() {
                ui.label("The dataset has no rows.");
                return;
            }

            match &state.analysis {
                Some(Analysis::Numerical {
                    summary,
                    histogram,
                    density,
                }) => {
                    ui.horizontal(|ui: &mut Ui| {
                        for tab in NumericalTab::ALL {
                            ui.selectable_value(&mut state.numerical_tab, tab, tab.label());
                        }
                    });
                    ui.separator();
                    match state.numerical_tab {
                        NumericalTab::Summary => tables::five_numbers(ui, summary),
                        NumericalTab::Histogram => {
                            histogram_controls(ui, &mut state.selections.histogram, histogram.column());
                            export_error = chart(ui, histogram);
                        }
                        NumericalTab::Density => {
                            density_controls(ui, &mut state.selections.density, density.column());
                            export_error = chart(ui, density);
                        }
                    }
                }
                Some(Analysis::Categorical { summary, bar }) => {
                    tables::level_table(ui, summary);
                    ui.separator();
                    bar_controls(ui, &mut state.selections.bar, bar.column());
                    export_error = chart(ui, bar);
                }
                None => {
                    ui.label("Select a column to summarise.");
                }
            }
        });

    if let Some(e) = export_error {
        state.status_message = Some(e);
    }
}

// ---------------------------------------------------------------------------
// Parameter controls
// ---------------------------------------------------------------------------

fn color_control(ui: &mut Ui, hex: &mut String) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Pick a Color");
        let fallback = color::parse_hex(DEFAULT_COLOR).map(color::to_color32);
        let mut current = color::parse_hex(hex)
            .map(color::to_color32)
            .or(fallback)
            .unwrap_or(Color32::GRAY);
        if ui.color_edit_button_srgba(&mut current).changed() {
            *hex = color::to_hex(color::from_color32(current));
        }
    });
}

fn text_control(ui: &mut Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        ui.text_edit_singleline(value);
    });
}

/// An x-axis title field that shows the column name until edited.
fn x_label_control(ui: &mut Ui, value: &mut Option<String>, column: &str) {
    let mut text = value.clone().unwrap_or_else(|| column.to_string());
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Set x-axis Title");
        if ui.text_edit_singleline(&mut text).changed() {
            *value = Some(text);
        }
    });
}

fn histogram_controls(ui: &mut Ui, params: &mut HistogramParams, column: &str) {
    color_control(ui, &mut params.color);
    ui.add(egui::Slider::new(&mut params.bins, BIN_RANGE).text("Number of bins"));
    text_control(ui, "Set Title", &mut params.title);
    x_label_control(ui, &mut params.x_label, column);
}

fn density_controls(ui: &mut Ui, params: &mut DensityParams, column: &str) {
    color_control(ui, &mut params.color);
    text_control(ui, "Set Title", &mut params.title);
    x_label_control(ui, &mut params.x_label, column);
}

fn bar_controls(ui: &mut Ui, params: &mut BarParams, column: &str) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Select Color Palette");
        egui::ComboBox::from_id_salt("bar_palette")
            .selected_text(params.palette.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for p in Palette::ALL {
                    if ui.selectable_label(params.palette == p.name(), p.name()).clicked() {
                        params.palette = p.name().to_string();
                    }
                }
            });
    });
    text_control(ui, "Set Title", &mut params.title);
    x_label_control(ui, &mut params.x_label, column);
    text_control(ui, "Set y-axis Title", &mut params.y_label);
}

// ---------------------------------------------------------------------------
// Chart rendering
// ---------------------------------------------------------------------------

/// Draw a chart with its download button. Returns an export error, if any.
fn chart(ui: &mut Ui, spec: &ChartSpec) -> Option<String> {
    ui.add_space(8.0);
    ui.vertical_centered(|ui: &mut Ui| ui.strong(spec.title()));

    let plot = Plot::new(("chart", spec.kind()))
        .height(PLOT_HEIGHT)
        .x_axis_label(spec.x_label())
        .y_axis_label(spec.y_label())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);

    match spec.data() {
        ChartData::Histogram {
            values,
            bins,
            color,
        } => {
            let hist = histogram(values, *bins as usize);
            let width = hist.bin_width();
            let fill = color::to_color32(*color);
            let bars: Vec<Bar> = hist
                .bars()
                .map(|(center, count)| {
                    Bar::new(center, count as f64)
                        .width(width)
                        .fill(fill)
                        .stroke(Stroke::new(1.0, Color32::BLACK))
                })
                .collect();
            plot.show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
        }
        ChartData::Density { values, color } => match gaussian_kde(values) {
            Some(curve) => {
                let line = Line::new(PlotPoints::from(curve.points))
                    .color(color::to_color32(*color))
                    .width(2.0);
                plot.show(ui, |plot_ui| plot_ui.line(line));
            }
            None => {
                ui.label("Not enough variation in this column to estimate a density.");
            }
        },
        ChartData::Bar {
            levels,
            counts,
            palette,
        } => {
            let colors = palette.colors(counts.len());
            let bars: Vec<Bar> = levels
                .iter()
                .zip(counts)
                .zip(colors)
                .enumerate()
                .map(|(i, ((level, &count), c))| {
                    Bar::new(i as f64, count as f64)
                        .width(0.8)
                        .name(level)
                        .fill(color::to_color32(c))
                })
                .collect();
            let names = levels.clone();
            plot.x_axis_formatter(move |mark, _range| {
                let i = mark.value.round();
                if (mark.value - i).abs() < 1e-6 && i >= 0.0 {
                    names.get(i as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
        }
    }

    if ui.button("Download image").clicked() {
        return download(spec).err().map(|e| format!("Error: {e:#}"));
    }
    None
}

/// Ask for a destination and write the chart there as PNG.
fn download(spec: &ChartSpec) -> anyhow::Result<()> {
    let target = rfd::FileDialog::new()
        .set_title("Download image")
        .set_file_name(spec.kind().export_file_name())
        .add_filter("PNG image", &["png"])
        .save_file();

    match target {
        Some(path) => export::save_png(spec, &path),
        None => Ok(()),
    }
}
