use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};
use serde::Serialize;

use crate::data::model::Table;
use crate::stats::{CategoricalSummary, NumericalSummary};

// ---------------------------------------------------------------------------
// Tabular displays
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// The full uploaded table with a leading row index.
pub fn data_table(ui: &mut Ui, table: &Table) {
    ui.heading("Uploaded Data");
    egui::ScrollArea::horizontal()
        .id_salt("data_table_scroll")
        .show(ui, |ui: &mut Ui| {
            ui.push_id("data_table", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .max_scroll_height(320.0)
                    .column(Column::auto())
                    .columns(Column::auto().at_least(60.0), table.n_columns())
                    .header(ROW_HEIGHT + 2.0, |mut header| {
                        header.col(|_ui| {});
                        for col in table.columns() {
                            header.col(|ui: &mut Ui| {
                                ui.strong(&col.name);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, table.n_rows(), |mut row| {
                            let r = row.index();
                            row.col(|ui: &mut Ui| {
                                ui.weak(r.to_string());
                            });
                            for c in 0..table.n_columns() {
                                row.col(|ui: &mut Ui| {
                                    if let Some(cell) = table.cell(r, c) {
                                        ui.label(cell.to_string());
                                    }
                                });
                            }
                        });
                    });
            });
        });
    ui.separator();
}

fn metric(ui: &mut Ui, label: &str, value: impl ToString) {
    ui.vertical(|ui: &mut Ui| {
        ui.weak(label);
        ui.heading(value.to_string());
    });
}

/// Column dtypes plus row / column / size metrics.
pub fn info(ui: &mut Ui, table: &Table) {
    ui.heading("Column Data Types");
    egui::Grid::new("dtypes")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Column Name");
            ui.strong("Data Type");
            ui.end_row();
            for col in table.columns() {
                ui.label(&col.name);
                ui.monospace(col.dtype.to_string());
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    ui.heading("Relevant Information");
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Num of Rows", table.n_rows());
        metric(&mut cols[1], "Num of Columns", table.n_columns());
        metric(&mut cols[2], "Size", table.size());
    });
    ui.separator();
}

/// Min, quartiles and max side by side.
pub fn five_numbers(ui: &mut Ui, summary: &NumericalSummary) {
    ui.columns(5, |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(summary.entries()) {
            metric(col, label, value);
        }
    });
    if summary.missing > 0 {
        ui.weak(format!("{} missing values skipped", summary.missing));
    }
    copy_json_button(ui, summary);
}

/// Level / count / proportion table.
pub fn level_table(ui: &mut Ui, summary: &CategoricalSummary) {
    egui::Grid::new("levels")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.strong(&summary.column);
            ui.strong("count");
            ui.strong("proportion");
            ui.end_row();
            for level in &summary.levels {
                ui.label(level.level.to_string());
                ui.label(level.count.to_string());
                ui.label(format!("{:.6}", level.proportion));
                ui.end_row();
            }
        });
    copy_json_button(ui, summary);
}

fn copy_json_button<T: Serialize>(ui: &mut Ui, value: &T) {
    if ui.small_button("Copy as JSON").clicked() {
        match serde_json::to_string_pretty(value) {
            Ok(json) => ui.ctx().copy_text(json),
            Err(e) => log::error!("Failed to serialize summary: {e}"),
        }
    }
}
