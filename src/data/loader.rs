use std::collections::HashSet;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType as ArrowType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, DataType, Table};
use crate::error::{ExploreError, Result};

/// Cell spellings treated as missing, compared case-insensitively.
const MISSING_TOKENS: [&str; 4] = ["na", "n/a", "nan", "null"];

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-separated with a header row
/// * `.tsv`          – tab-separated with a header row
/// * `.json`         – `[{ "col": value, ... }, ...]`
/// * `.parquet`      – flat Parquet file (pandas / polars output)
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => parse_csv(&std::fs::read(path)?),
        "tsv" => parse_delimited(&std::fs::read(path)?, b'\t'),
        "json" => parse_json(&std::fs::read(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(ExploreError::Parse(format!(
            "unsupported file extension: .{other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse comma-separated text with a header row.
pub fn parse_csv(bytes: &[u8]) -> Result<Table> {
    parse_delimited(bytes, b',')
}

/// Parse delimited text with a header row; column types are inferred from
/// the non-missing cells of each column.
pub fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<Table> {
    let bytes = strip_bom(bytes);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ExploreError::Parse("no columns to parse from input".into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ExploreError::Parse(format!("reading header: {e}")))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();
    let headers = dedupe_headers(headers);

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| ExploreError::Parse(format!("row {}: {e}", row_no + 1)))?;
        for (col_idx, value) in record.iter().enumerate() {
            raw[col_idx].push(value.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_text_column(name, &cells))
        .collect();

    Table::new(columns)
}

/// Rename repeated header names to `name.1`, `name.2`, ... skipping any
/// name already taken.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let mut n = 1;
            loop {
                let candidate = format!("{name}.{n}");
                if seen.insert(candidate.clone()) {
                    log::debug!("Renamed repeated column '{name}' to '{candidate}'");
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}

fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

fn is_bool(s: &str) -> bool {
    let s = s.trim();
    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
}

/// Pick the narrowest type every present cell agrees on, then convert.
fn infer_text_column(name: String, cells: &[String]) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|s| !is_missing(s))
        .collect();
    let has_missing = present.len() < cells.len();

    let dtype = if present.is_empty() {
        DataType::Float
    } else if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        // Integers with holes are promoted to float.
        if has_missing {
            DataType::Float
        } else {
            DataType::Integer
        }
    } else if present.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
        DataType::Float
    } else if present.iter().all(|s| is_bool(s)) {
        DataType::Boolean
    } else {
        DataType::Text
    };

    let values = cells.iter().map(|s| text_to_cell(s, &dtype)).collect();
    Column::new(name, dtype, values)
}

fn text_to_cell(s: &str, dtype: &DataType) -> CellValue {
    if is_missing(s) {
        return CellValue::Null;
    }
    let trimmed = s.trim();
    match dtype {
        DataType::Integer => trimmed
            .parse()
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Null),
        DataType::Float => trimmed
            .parse()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Null),
        DataType::Boolean => CellValue::Bool(trimmed.eq_ignore_ascii_case("true")),
        DataType::Text => CellValue::Text(s.to_string()),
        DataType::Other(_) => CellValue::Other(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 31, "gender": "F", "smoker": false },
///   ...
/// ]
/// ```
///
/// Keys become columns in first-seen order; a record lacking a key
/// contributes a missing value.
pub fn parse_json(bytes: &[u8]) -> Result<Table> {
    let root: JsonValue = serde_json::from_slice(strip_bom(bytes))
        .map_err(|e| ExploreError::Parse(format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| ExploreError::Parse("expected top-level JSON array".into()))?;

    let mut names: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<CellValue>> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| ExploreError::Parse(format!("row {i} is not a JSON object")))?;

        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
                cells.push(vec![CellValue::Null; i]);
            }
        }
        for (name, column) in names.iter().zip(cells.iter_mut()) {
            column.push(obj.get(name).map(json_to_cell).unwrap_or(CellValue::Null));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| unify_column(name, values))
        .collect();

    Table::new(columns)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Other(other.to_string()),
    }
}

/// Settle on one declared type for a column of already-typed cells.
fn unify_column(name: String, values: Vec<CellValue>) -> Column {
    let present = || values.iter().filter(|v| !v.is_null());
    let has_missing = values.iter().any(CellValue::is_null);

    let dtype = if present().next().is_none() {
        DataType::Float
    } else if present().all(|v| matches!(v, CellValue::Integer(_))) && !has_missing {
        DataType::Integer
    } else if present().all(|v| matches!(v, CellValue::Integer(_) | CellValue::Float(_))) {
        DataType::Float
    } else if present().all(|v| matches!(v, CellValue::Bool(_))) {
        DataType::Boolean
    } else if present().all(|v| matches!(v, CellValue::Other(_))) {
        DataType::Other("nested".into())
    } else {
        DataType::Text
    };

    let values = values
        .into_iter()
        .map(|v| match (&dtype, v) {
            (_, CellValue::Null) => CellValue::Null,
            (DataType::Float, CellValue::Integer(i)) => CellValue::Float(i as f64),
            (DataType::Text, v @ CellValue::Text(_)) => v,
            (DataType::Text, v) => CellValue::Text(v.to_string()),
            (_, v) => v,
        })
        .collect();

    Column::new(name, dtype, values)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, one table column per Parquet column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| ExploreError::Parse(format!("reading parquet metadata: {e}")))?;
    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| ExploreError::Parse(format!("building parquet reader: {e}")))?;

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), arrow_dtype(f.data_type()), Vec::new()))
        .collect();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| ExploreError::Parse(format!("reading parquet record batch: {e}")))?;
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            append_arrow_values(column, array)?;
        }
    }

    Table::new(columns)
}

fn arrow_dtype(dt: &ArrowType) -> DataType {
    match dt {
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => DataType::Integer,
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => DataType::Float,
        ArrowType::Boolean => DataType::Boolean,
        ArrowType::Utf8 | ArrowType::LargeUtf8 => DataType::Text,
        other => DataType::Other(other.to_string().to_lowercase()),
    }
}

fn arrow_err(e: arrow::error::ArrowError) -> ExploreError {
    ExploreError::Parse(format!("decoding parquet column: {e}"))
}

/// Append every row of an Arrow array to `column`, converted per its dtype.
fn append_arrow_values(column: &mut Column, array: &ArrayRef) -> Result<()> {
    match column.dtype {
        DataType::Integer => {
            let ints = arrow::compute::cast(array.as_ref(), &ArrowType::Int64).map_err(arrow_err)?;
            let ints = ints.as_primitive::<Int64Type>();
            column.values.extend(
                ints.iter()
                    .map(|v| v.map(CellValue::Integer).unwrap_or(CellValue::Null)),
            );
        }
        DataType::Float => {
            let floats = arrow::compute::cast(array.as_ref(), &ArrowType::Float64).map_err(arrow_err)?;
            let floats = floats.as_primitive::<Float64Type>();
            column.values.extend(
                floats
                    .iter()
                    .map(|v| v.map(CellValue::Float).unwrap_or(CellValue::Null)),
            );
        }
        DataType::Boolean => {
            column.values.extend(
                array
                    .as_boolean()
                    .iter()
                    .map(|v| v.map(CellValue::Bool).unwrap_or(CellValue::Null)),
            );
        }
        DataType::Text => {
            let text = arrow::compute::cast(array.as_ref(), &ArrowType::Utf8).map_err(arrow_err)?;
            column.values.extend(
                text.as_string::<i32>()
                    .iter()
                    .map(|v| v.map(|s| CellValue::Text(s.to_string())).unwrap_or(CellValue::Null)),
            );
        }
        DataType::Other(_) => {
            for row in 0..array.len() {
                if array.is_null(row) {
                    column.values.push(CellValue::Null);
                } else {
                    let shown = arrow::util::display::array_value_to_string(array.as_ref(), row)
                        .map_err(arrow_err)?;
                    column.values.push(CellValue::Other(shown));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtype_of(table: &Table, name: &str) -> DataType {
        table.column(name).unwrap().dtype.clone()
    }

    #[test]
    fn infers_column_types() {
        let csv = b"id,score,flag,name\n1,2.5,true,ann\n2,3,False,bob\n3,4.25,TRUE,cy\n";
        let table = parse_csv(csv).unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(dtype_of(&table, "id"), DataType::Integer);
        assert_eq!(dtype_of(&table, "score"), DataType::Float);
        assert_eq!(dtype_of(&table, "flag"), DataType::Boolean);
        assert_eq!(dtype_of(&table, "name"), DataType::Text);
        assert_eq!(table.cell(1, 2), Some(&CellValue::Bool(false)));
        assert_eq!(table.cell(1, 1), Some(&CellValue::Float(3.0)));
    }

    #[test]
    fn integers_with_missing_become_float() {
        let table = parse_csv(b"n,label\n1,a\n,b\n3,NA\n").unwrap();
        assert_eq!(dtype_of(&table, "n"), DataType::Float);
        assert_eq!(table.cell(1, 0), Some(&CellValue::Null));
        assert_eq!(table.cell(2, 0), Some(&CellValue::Float(3.0)));
        assert_eq!(table.cell(2, 1), Some(&CellValue::Null));
    }

    #[test]
    fn all_missing_column_is_float() {
        let table = parse_csv(b"a,b\n1,\n2,\n").unwrap();
        assert_eq!(dtype_of(&table, "b"), DataType::Float);
    }

    #[test]
    fn empty_input_is_parse_error() {
        assert!(matches!(parse_csv(b""), Err(ExploreError::Parse(_))));
        assert!(matches!(parse_csv(b"  \n\n"), Err(ExploreError::Parse(_))));
    }

    #[test]
    fn ragged_rows_are_parse_errors() {
        let err = parse_csv(b"a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, ExploreError::Parse(_)));
    }

    #[test]
    fn header_only_gives_empty_table() {
        let table = parse_csv(b"a,b\n").unwrap();
        assert_eq!(table.n_columns(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn unnamed_headers_get_placeholders() {
        let table = parse_csv(b",x\n0,1\n").unwrap();
        assert!(table.column("Unnamed: 0").is_some());
    }

    #[test]
    fn repeated_headers_are_numbered() {
        let table = parse_csv(b"a,a,b,a\n1,2,x,3\n4,5,y,6\n").unwrap();
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "a.1", "b", "a.2"]);
        assert_eq!(table.cell(1, 1), Some(&CellValue::Integer(5)));
    }

    #[test]
    fn repeated_header_skips_taken_suffix() {
        let table = parse_csv(b"a,a.1,a\n1,2,3\n").unwrap();
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "a.1", "a.2"]);
    }

    #[test]
    fn leading_bom_is_dropped() {
        let table = parse_csv(b"\xef\xbb\xbfage,name\n31,ann\n").unwrap();
        assert_eq!(dtype_of(&table, "age"), DataType::Integer);

        let json = parse_json(b"\xef\xbb\xbf[{\"age\": 1}]").unwrap();
        assert!(json.column("age").is_some());
    }

    #[test]
    fn tab_delimited() {
        let table = parse_delimited(b"a\tb\n1\tx\n", b'\t').unwrap();
        assert_eq!(dtype_of(&table, "a"), DataType::Integer);
        assert_eq!(dtype_of(&table, "b"), DataType::Text);
    }

    #[test]
    fn json_records() {
        let json = br#"[
            {"age": 31, "gender": "F", "smoker": false, "tags": [1, 2]},
            {"age": 40, "gender": "M", "smoker": true, "tags": [3]},
            {"gender": "M", "height": 1.8, "smoker": null, "tags": [4]}
        ]"#;
        let table = parse_json(json).unwrap();

        assert_eq!(table.n_rows(), 3);
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["age", "gender", "smoker", "tags", "height"]);
        assert_eq!(dtype_of(&table, "age"), DataType::Float);
        assert_eq!(dtype_of(&table, "gender"), DataType::Text);
        assert_eq!(dtype_of(&table, "smoker"), DataType::Boolean);
        assert_eq!(dtype_of(&table, "tags"), DataType::Other("nested".into()));
        assert_eq!(table.cell(0, 4), Some(&CellValue::Null));
    }

    #[test]
    fn json_mixed_kinds_fall_back_to_text() {
        let table = parse_json(br#"[{"v": 1}, {"v": "two"}]"#).unwrap();
        assert_eq!(dtype_of(&table, "v"), DataType::Text);
        assert_eq!(table.cell(0, 0), Some(&CellValue::Text("1".into())));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert!(matches!(parse_json(b"{}"), Err(ExploreError::Parse(_))));
        assert!(matches!(parse_json(b"[1, 2]"), Err(ExploreError::Parse(_))));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(err, ExploreError::Parse(_)));
    }
}
