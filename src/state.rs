use std::path::Path;

use crate::data::classify::{classify, ColumnClassification};
use crate::data::loader::load_file;
use crate::data::model::Table;
use crate::pipeline::{self, Analysis, Selections};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Tabs shown for a numerical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericalTab {
    #[default]
    Summary,
    Histogram,
    Density,
}

impl NumericalTab {
    pub const ALL: [NumericalTab; 3] = [
        NumericalTab::Summary,
        NumericalTab::Histogram,
        NumericalTab::Density,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericalTab::Summary => "5 Number Summary",
            NumericalTab::Histogram => "Histogram",
            NumericalTab::Density => "Kernel Density Estimate (KDE)",
        }
    }
}

/// The full state of one explorer window, independent of rendering.
///
/// Widgets edit `selections` directly; [`SessionState::refresh`] then runs
/// a fresh pipeline pass whenever the selections differ from the ones the
/// current analysis was built from.
#[derive(Default)]
pub struct SessionState {
    /// Loaded table (None until the user opens a file).
    pub table: Option<Table>,

    /// File name of the loaded table, for the top bar.
    pub source_name: Option<String>,

    /// Numerical / categorical column lists of `table`.
    pub classification: ColumnClassification,

    pub selections: Selections,

    pub numerical_tab: NumericalTab,

    /// Result of the last successful pass.
    pub analysis: Option<Analysis>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Selections the last pass ran with.
    applied: Option<Selections>,
}

impl SessionState {
    /// Open a file, replacing the current table on success.
    ///
    /// A failed load leaves the previous table and analysis in place.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows x {} columns from {}",
                    table.n_rows(),
                    table.n_columns(),
                    path.display()
                );
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_table(table, name);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded table and reset everything derived from it.
    pub fn set_table(&mut self, table: Table, source_name: String) {
        self.classification = classify(&table);
        self.table = Some(table);
        self.source_name = Some(source_name);
        self.selections.column = None;
        self.analysis = None;
        self.applied = None;
        self.status_message = None;
        self.refresh();
    }

    /// Select a column of the current kind. Axis labels follow the column.
    pub fn select_column(&mut self, column: String) {
        if self.selections.column.as_deref() != Some(column.as_str()) {
            self.selections.histogram.x_label = None;
            self.selections.density.x_label = None;
            self.selections.bar.x_label = None;
            self.selections.column = Some(column);
        }
    }

    /// Column names offered by the column selector.
    pub fn selectable_columns(&self) -> &[String] {
        self.classification.columns(self.selections.kind)
    }

    /// Keep the selected column valid for the selected kind, falling back
    /// to the first column of that kind.
    fn sync_column(&mut self) {
        let options = self.classification.columns(self.selections.kind);
        let valid = self
            .selections
            .column
            .as_ref()
            .is_some_and(|c| options.contains(c));
        if !valid {
            match options.first().cloned() {
                Some(first) => self.select_column(first),
                None => self.selections.column = None,
            }
        }
    }

    /// Recompute the analysis if any selection changed since the last pass.
    ///
    /// On failure the previous analysis stays on screen and the error is
    /// reported through `status_message`. Returns whether a pass ran.
    pub fn refresh(&mut self) -> bool {
        if self.table.is_none() {
            return false;
        }
        self.sync_column();
        if self.applied.as_ref() == Some(&self.selections) {
            return false;
        }
        self.applied = Some(self.selections.clone());

        let Some(table) = &self.table else {
            return false;
        };
        log::debug!(
            "Recomputing {:?} analysis for {:?}",
            self.selections.kind,
            self.selections.column
        );
        match pipeline::run(table, &self.selections) {
            Ok(analysis) => {
                self.analysis = analysis;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Recomputation failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        true
    }
}
