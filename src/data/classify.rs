use super::model::Table;

// ---------------------------------------------------------------------------
// Column classification: which columns feed which analysis
// ---------------------------------------------------------------------------

/// Which branch of the explorer a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    #[default]
    Numerical,
    Categorical,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 2] = [ColumnKind::Numerical, ColumnKind::Categorical];

    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Numerical => "Numerical",
            ColumnKind::Categorical => "Categorical",
        }
    }
}

/// Disjoint partition of a table's column names, in table order.
///
/// Columns whose type is neither numerical nor categorical appear in
/// neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClassification {
    pub numerical: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClassification {
    /// The selectable column names for one branch.
    pub fn columns(&self, kind: ColumnKind) -> &[String] {
        match kind {
            ColumnKind::Numerical => &self.numerical,
            ColumnKind::Categorical => &self.categorical,
        }
    }
}

/// Partition `table`'s columns by declared type.
pub fn classify(table: &Table) -> ColumnClassification {
    let mut out = ColumnClassification::default();
    for col in table.columns() {
        if col.dtype.is_numerical() {
            out.numerical.push(col.name.clone());
        } else if col.dtype.is_categorical() {
            out.categorical.push(col.name.clone());
        }
    }
    out
}
