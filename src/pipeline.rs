//! One recomputation pass: selections in, summary and chart specs out.
//!
//! ```text
//!   Table + Selections
//!        │
//!        ├── Numerical ──► summarize_numerical ──► histogram + density specs
//!        │
//!        └── Categorical ► summarize_categorical ► bar spec
//! ```
//!
//! The pass is a pure function of its inputs; the caller decides what to
//! keep on screen when it fails.

use crate::chart::{
    build_bar, build_density, build_histogram, BarParams, ChartSpec, DensityParams,
    HistogramParams,
};
use crate::data::classify::ColumnKind;
use crate::data::model::Table;
use crate::error::Result;
use crate::stats::{summarize_categorical, summarize_numerical, CategoricalSummary, NumericalSummary};

/// Everything the user has chosen in the controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    pub show_table: bool,
    pub show_info: bool,
    pub kind: ColumnKind,
    pub column: Option<String>,
    pub histogram: HistogramParams,
    pub density: DensityParams,
    pub bar: BarParams,
}

/// Derived values for the active branch.
#[derive(Debug)]
pub enum Analysis {
    Numerical {
        summary: NumericalSummary,
        histogram: ChartSpec,
        density: ChartSpec,
    },
    Categorical {
        summary: CategoricalSummary,
        bar: ChartSpec,
    },
}

/// Run the summary and chart builders for the selected column.
///
/// Returns `Ok(None)` when no column is selected.
pub fn run(table: &Table, selections: &Selections) -> Result<Option<Analysis>> {
    let Some(column) = selections.column.as_deref() else {
        return Ok(None);
    };

    let analysis = match selections.kind {
        ColumnKind::Numerical => {
            let summary = summarize_numerical(table, column)?;
            let histogram = build_histogram(table, column, &selections.histogram)?;
            let density = build_density(table, column, &selections.density)?;
            Analysis::Numerical {
                summary,
                histogram,
                density,
            }
        }
        ColumnKind::Categorical => {
            let summary = summarize_categorical(table, column)?;
            let bar = build_bar(&summary, &selections.bar)?;
            Analysis::Categorical { summary, bar }
        }
    };

    Ok(Some(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::data::loader::parse_csv;
    use crate::error::ExploreError;

    fn table() -> Table {
        parse_csv(b"age,gender\n10,M\n20,F\n30,M\n40,M\n50,F\n").unwrap()
    }

    #[test]
    fn no_column_no_analysis() {
        assert!(run(&table(), &Selections::default()).unwrap().is_none());
    }

    #[test]
    fn numerical_branch() {
        let selections = Selections {
            column: Some("age".into()),
            ..Default::default()
        };
        match run(&table(), &selections).unwrap() {
            Some(Analysis::Numerical {
                summary,
                histogram,
                density,
            }) => {
                assert_eq!(summary.p50, 30.0);
                assert_eq!(histogram.kind(), ChartKind::Histogram);
                assert_eq!(density.kind(), ChartKind::Density);
            }
            other => panic!("unexpected analysis {other:?}"),
        }
    }

    #[test]
    fn categorical_branch() {
        let selections = Selections {
            kind: ColumnKind::Categorical,
            column: Some("gender".into()),
            ..Default::default()
        };
        match run(&table(), &selections).unwrap() {
            Some(Analysis::Categorical { summary, bar }) => {
                assert_eq!(summary.levels.len(), 2);
                assert_eq!(bar.kind(), ChartKind::Bar);
            }
            other => panic!("unexpected analysis {other:?}"),
        }
    }

    #[test]
    fn bad_parameter_aborts_pass() {
        let mut selections = Selections {
            column: Some("age".into()),
            ..Default::default()
        };
        selections.histogram.bins = 151;
        assert!(matches!(
            run(&table(), &selections),
            Err(ExploreError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn repeated_passes_leave_table_unchanged() {
        let table = table();
        let categorical = Selections {
            kind: ColumnKind::Categorical,
            column: Some("gender".into()),
            ..Default::default()
        };
        run(&table, &categorical).unwrap();
        run(&table, &categorical).unwrap();
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["age", "gender"]);
    }
}
