use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::classify::ColumnKind;
use crate::state::SessionState;

// ---------------------------------------------------------------------------
// Left side panel – dataset controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading("Dataset");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        if ui.button("Choose a file…").clicked() {
            open_file_dialog(state);
        }
        return;
    }

    ui.checkbox(&mut state.selections.show_table, "Show Data Frame");
    ui.checkbox(&mut state.selections.show_info, "Show Relevant Info");
    ui.separator();

    // ---- Column type selector ----
    ui.strong("Select Data Type");
    egui::ComboBox::from_id_salt("column_kind")
        .selected_text(state.selections.kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ColumnKind::ALL {
                ui.selectable_value(&mut state.selections.kind, kind, kind.label());
            }
        });

    // The option list must follow a kind change made this frame.
    state.refresh();

    // ---- Column selector ----
    ui.strong("Select a Column");
    let columns = state.selectable_columns().to_vec();
    if columns.is_empty() {
        ui.label(format!(
            "No {} columns in this dataset.",
            state.selections.kind.label().to_lowercase()
        ));
        return;
    }

    let current = state.selections.column.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("column")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                if ui.selectable_label(current == col, &col).clicked() {
                    state.select_column(col);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut SessionState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(table)) = (&state.source_name, &state.table) {
            ui.label(format!(
                "{name}: {} rows × {} columns",
                table.n_rows(),
                table.n_columns()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut SessionState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a file")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("TSV", &["tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
