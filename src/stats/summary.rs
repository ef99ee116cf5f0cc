//! Descriptive statistics for a single selected column
//!
//! Numerical columns get the five order statistics (min, quartiles, max);
//! categorical columns get a per-level count and proportion table. Both
//! borrow the table and never modify it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{CellValue, Table};
use crate::error::{ExploreError, Result};

/// Five-number summary of a numerical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericalSummary {
    pub column: String,
    /// Number of valid values the statistics were computed from.
    pub count: usize,
    /// Number of missing or non-finite values skipped.
    pub missing: usize,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl NumericalSummary {
    /// `(label, value)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Min", self.min),
            ("25%", self.p25),
            ("50%", self.p50),
            ("75%", self.p75),
            ("Max", self.max),
        ]
    }
}

/// One distinct value of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCount {
    #[serde(serialize_with = "serialize_level")]
    pub level: CellValue,
    pub count: usize,
    pub proportion: f64,
}

fn serialize_level<S: serde::Serializer>(level: &CellValue, s: S) -> Result<S::Ok, S::Error> {
    match level {
        CellValue::Null => s.serialize_none(),
        other => s.serialize_str(&other.to_string()),
    }
}

/// Level table of a categorical column, levels in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub levels: Vec<LevelCount>,
}

impl CategoricalSummary {
    pub fn total(&self) -> usize {
        self.levels.iter().map(|l| l.count).sum()
    }
}

/// Value at fraction `p` of an ascending slice, interpolating linearly
/// between the two closest ranks.
///
/// Returns NaN for an empty slice.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    // Rounding must not carry the result past the upper rank.
    (sorted[lo] + (sorted[hi] - sorted[lo]) * frac).min(sorted[hi])
}

/// Five-number summary of a numerical column, skipping missing values.
pub fn summarize_numerical(table: &Table, column: &str) -> Result<NumericalSummary> {
    let col = table.require_column(column)?;
    if !col.dtype.is_numerical() {
        return Err(ExploreError::ColumnType {
            column: column.to_string(),
            expected: "numerical",
        });
    }

    let mut sorted: Vec<f64> = col
        .values
        .iter()
        .filter_map(CellValue::as_f64)
        .filter(|v| v.is_finite())
        .collect();
    if sorted.is_empty() {
        return Err(ExploreError::EmptyColumn(column.to_string()));
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    Ok(NumericalSummary {
        column: column.to_string(),
        count: n,
        missing: col.values.len() - n,
        min: sorted[0],
        p25: quantile(&sorted, 0.25),
        p50: quantile(&sorted, 0.50),
        p75: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Count and proportion of each distinct value of a categorical column.
///
/// Missing cells are grouped under their own level so that the counts
/// always add up to the table's row count.
pub fn summarize_categorical(table: &Table, column: &str) -> Result<CategoricalSummary> {
    let col = table.require_column(column)?;
    if !col.dtype.is_categorical() {
        return Err(ExploreError::ColumnType {
            column: column.to_string(),
            expected: "categorical",
        });
    }
    if col.values.iter().all(CellValue::is_null) {
        return Err(ExploreError::EmptyColumn(column.to_string()));
    }

    let mut groups: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for value in &col.values {
        *groups.entry(value).or_default() += 1;
    }

    let total = col.values.len() as f64;
    let levels = groups
        .into_iter()
        .map(|(level, count)| LevelCount {
            level: level.clone(),
            count,
            proportion: count as f64 / total,
        })
        .collect();

    Ok(CategoricalSummary {
        column: column.to_string(),
        levels,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::loader::parse_csv;
    use crate::data::model::{Column, DataType};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn five_numbers_of_age() {
        let table = parse_csv(b"age\n10\n20\n30\n40\n50\n").unwrap();
        let s = summarize_numerical(&table, "age").unwrap();
        assert_eq!(
            (s.min, s.p25, s.p50, s.p75, s.max),
            (10.0, 20.0, 30.0, 40.0, 50.0)
        );
        assert_eq!(s.count, 5);
        assert_eq!(s.missing, 0);
    }

    #[test]
    fn quartiles_interpolate_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.3), 7.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn order_statistics_are_monotone() {
        let csv = b"v\n3.5\n-2\n8\n8\n0.25\nNA\n11\n-7.5\n3.5\n";
        let table = parse_csv(csv).unwrap();
        let s = summarize_numerical(&table, "v").unwrap();
        assert!(s.min <= s.p25 && s.p25 <= s.p50 && s.p50 <= s.p75 && s.p75 <= s.max);
        assert_eq!(s.missing, 1);
        assert_eq!(s.min, -7.5);
        assert_eq!(s.max, 11.0);
    }

    #[test]
    fn infinities_count_as_missing() {
        let table = parse_csv(b"v\n1.5\ninf\n-inf\n2.5\n").unwrap();
        let s = summarize_numerical(&table, "v").unwrap();
        assert_eq!((s.count, s.missing), (2, 2));
        assert_eq!((s.min, s.max), (1.5, 2.5));
    }

    #[test]
    fn numerical_errors() {
        let table = parse_csv(b"a,b,c\n,x,1\n,y,2\n").unwrap();
        assert!(matches!(
            summarize_numerical(&table, "nope"),
            Err(ExploreError::ColumnNotFound(name)) if name == "nope"
        ));
        assert!(matches!(
            summarize_numerical(&table, "a"),
            Err(ExploreError::EmptyColumn(_))
        ));
        assert!(matches!(
            summarize_numerical(&table, "b"),
            Err(ExploreError::ColumnType { .. })
        ));
    }

    #[test]
    fn gender_levels_ascending() {
        let table = parse_csv(b"gender\nM\nF\nM\nM\nF\n").unwrap();
        let s = summarize_categorical(&table, "gender").unwrap();

        let got: Vec<(CellValue, usize, f64)> = s
            .levels
            .iter()
            .map(|l| (l.level.clone(), l.count, l.proportion))
            .collect();
        assert_eq!(got, vec![(text("F"), 2, 0.4), (text("M"), 3, 0.6)]);
    }

    #[test]
    fn counts_cover_every_row() {
        let csv = b"c,n\nb,1\na,2\n,3\nc,4\nb,5\na,6\nb,7\n";
        let table = parse_csv(csv).unwrap();
        let s = summarize_categorical(&table, "c").unwrap();

        assert_eq!(s.total(), table.n_rows());
        let sum: f64 = s.levels.iter().map(|l| l.proportion).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(s.levels.iter().all(|l| l.proportion >= 0.0));
        assert_eq!(s.levels[0].level, CellValue::Null);
    }

    #[test]
    fn boolean_levels() {
        let table = parse_csv(b"ok\ntrue\nfalse\ntrue\n").unwrap();
        let s = summarize_categorical(&table, "ok").unwrap();
        assert_eq!(s.levels[0].level, CellValue::Bool(false));
        assert_eq!(s.levels[1].count, 2);
    }

    #[test]
    fn categorical_leaves_table_untouched() {
        let table = parse_csv(b"g,x\na,1\nb,2\n").unwrap();
        let before = table.columns().len();
        summarize_categorical(&table, "g").unwrap();
        assert_eq!(table.columns().len(), before);
        assert!(table.column("count").is_none());
    }

    #[test]
    fn categorical_errors() {
        let table = parse_csv(b"g,x\na,1\n").unwrap();
        assert!(matches!(
            summarize_categorical(&table, "zz"),
            Err(ExploreError::ColumnNotFound(_))
        ));
        assert!(matches!(
            summarize_categorical(&table, "x"),
            Err(ExploreError::ColumnType { .. })
        ));

        let empty = Table::new(vec![Column::new(
            "g",
            DataType::Text,
            vec![CellValue::Null, CellValue::Null],
        )])
        .unwrap();
        assert!(matches!(
            summarize_categorical(&empty, "g"),
            Err(ExploreError::EmptyColumn(_))
        ));
    }

    #[test]
    fn summary_serializes_to_json() {
        let table = parse_csv(b"g,n\na,1\n,2\n").unwrap();
        let s = summarize_categorical(&table, "g").unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["levels"][0]["level"], serde_json::Value::Null);
        assert_eq!(json["levels"][1]["level"], "a");
    }

    fn float_column(cells: &[Option<f64>]) -> Table {
        let values = cells
            .iter()
            .map(|c| c.map_or(CellValue::Null, CellValue::Float))
            .collect();
        Table::new(vec![Column::new("v", DataType::Float, values)]).unwrap()
    }

    fn text_column(cells: &[Option<String>]) -> Table {
        let values = cells
            .iter()
            .map(|c| c.clone().map_or(CellValue::Null, CellValue::Text))
            .collect();
        Table::new(vec![Column::new("c", DataType::Text, values)]).unwrap()
    }

    proptest! {
        #[test]
        fn five_numbers_are_ordered(
            cells in prop::collection::vec(prop::option::of(-1e9f64..1e9), 1..80)
        ) {
            prop_assume!(cells.iter().any(Option::is_some));
            let table = float_column(&cells);
            let s = summarize_numerical(&table, "v").unwrap();

            prop_assert!(s.min <= s.p25, "min {} > p25 {}", s.min, s.p25);
            prop_assert!(s.p25 <= s.p50, "p25 {} > p50 {}", s.p25, s.p50);
            prop_assert!(s.p50 <= s.p75, "p50 {} > p75 {}", s.p50, s.p75);
            prop_assert!(s.p75 <= s.max, "p75 {} > max {}", s.p75, s.max);
            prop_assert_eq!(s.count + s.missing, table.n_rows());
        }

        #[test]
        fn level_counts_cover_rows(
            cells in prop::collection::vec(prop::option::of("[a-e]{1,2}"), 1..120)
        ) {
            prop_assume!(cells.iter().any(Option::is_some));
            let table = text_column(&cells);
            let s = summarize_categorical(&table, "c").unwrap();

            prop_assert_eq!(s.total(), table.n_rows());
            let sum: f64 = s.levels.iter().map(|l| l.proportion).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "proportions sum to {}", sum);
            prop_assert!(s.levels.iter().all(|l| (0.0..=1.0).contains(&l.proportion)));
            prop_assert!(s.levels.windows(2).all(|w| w[0].level < w[1].level));
        }
    }
}
