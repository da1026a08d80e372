use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::ObservationTable;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an observation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one numeric value per cell
/// * `.json`    – split orientation: `{ "columns": [...], "data": [[...], ...] }`
/// * `.parquet` – integer / float columns (other columns are skipped)
pub fn load_file(path: &Path) -> Result<ObservationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Split-oriented JSON, as written by `df.to_json(orient='split')`.
/// The optional `index` field is ignored.
#[derive(Debug, Deserialize)]
struct SplitTable {
    columns: Vec<String>,
    data: Vec<Vec<f64>>,
}

fn load_json(path: &Path) -> Result<ObservationTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let split: SplitTable = serde_json::from_str(&text).context("parsing JSON table")?;
    Ok(ObservationTable::new(split.columns, split.data)?)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one number per cell.
/// A column whose first value is not a number is treated as a label column
/// and skipped.
fn load_csv(path: &Path) -> Result<ObservationTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut numeric_cols: Option<Vec<usize>> = None;
    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let cols = numeric_cols.get_or_insert_with(|| {
            let cols: Vec<usize> = record
                .iter()
                .enumerate()
                .filter(|(_, v)| v.trim().parse::<f64>().is_ok())
                .map(|(i, _)| i)
                .collect();
            for (i, h) in headers.iter().enumerate() {
                if !cols.contains(&i) {
                    log::warn!("Skipping non-numeric CSV column '{h}'");
                }
            }
            cols
        });

        let row = cols
            .iter()
            .map(|&c| {
                let cell = record.get(c).unwrap_or("");
                cell.trim().parse::<f64>().with_context(|| {
                    format!("Row {row_no}, column '{}': '{cell}' is not a number", headers[c])
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let names = match numeric_cols {
        Some(cols) => cols.iter().map(|&c| headers[c].clone()).collect(),
        None => headers,
    };
    Ok(ObservationTable::new(names, rows)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file; every Int32/Int64/Float32/Float64 column becomes a
/// table column. Null cells are rejected.
fn load_parquet(path: &Path) -> Result<ObservationTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut names: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let numeric: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| is_numeric(f.data_type()))
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        if names.is_none() {
            for f in schema.fields() {
                if !is_numeric(f.data_type()) {
                    log::warn!("Skipping non-numeric parquet column '{}'", f.name());
                }
            }
            names = Some(numeric.iter().map(|(_, n)| n.clone()).collect());
        }

        for row in 0..batch.num_rows() {
            let values = numeric
                .iter()
                .map(|(col_idx, col_name)| {
                    extract_f64(batch.column(*col_idx), row)
                        .with_context(|| format!("Row {row}: failed to read '{col_name}'"))
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(values);
        }
    }

    let names = names.context("parquet file contains no record batches")?;
    Ok(ObservationTable::new(names, rows)?)
}

// -- Parquet / Arrow helpers --

fn is_numeric(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
    )
}

/// Extract a single numeric cell from an Arrow column at a given row.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("column type {:?} is not numeric", col.data_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, StringArray};
    use crate::error::BoundaryError;
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_skips_label_column() {
        let file = write_temp(".csv", "label,alcohol,malic\nA,13.2,1.8\nB,12.4,2.5\n");
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.column_names(), ["alcohol", "malic"]);
        assert_eq!(table.rows(), [vec![13.2, 1.8], vec![12.4, 2.5]]);
    }

    #[test]
    fn test_load_csv_rejects_bad_cell() {
        let file = write_temp(".csv", "a,b\n1,2\n3,oops\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("oops"));
    }

    #[test]
    fn test_load_csv_rejects_nan_text() {
        let file = write_temp(".csv", "a,b\n1,2\n3,nan\n");
        let err = load_file(file.path()).unwrap_err();
        let cause = err.downcast_ref::<BoundaryError>();
        assert!(matches!(cause, Some(BoundaryError::InvalidConfig(_))), "{err:#}");
    }

    #[test]
    fn test_load_json_split() {
        let file = write_temp(
            ".json",
            r#"{"columns":["a","b"],"index":[0,1],"data":[[1.0,2.0],[3.0,4.5]]}"#,
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.width(), 2);
        assert_eq!(table.rows()[1], vec![3.0, 4.5]);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", "");
        assert!(load_file(file.path()).is_err());
    }

    fn write_parquet(columns: Vec<(&str, ArrayRef)>) -> tempfile::NamedTempFile {
        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(file.as_file().try_clone().unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn test_load_parquet_skips_string_column() {
        let file = write_parquet(vec![
            ("cultivar", Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef),
            ("magnesium", Arc::new(Int64Array::from(vec![127, 100, 101])) as ArrayRef),
            ("hue", Arc::new(Float64Array::from(vec![1.04, 1.05, 1.03])) as ArrayRef),
        ]);
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.column_names(), ["magnesium", "hue"]);
        assert_eq!(
            table.rows(),
            [vec![127.0, 1.04], vec![100.0, 1.05], vec![101.0, 1.03]]
        );
    }

    #[test]
    fn test_load_parquet_rejects_null_cell() {
        let file = write_parquet(vec![
            ("a", Arc::new(Float64Array::from(vec![Some(1.0), Some(2.0)])) as ArrayRef),
            ("b", Arc::new(Float64Array::from(vec![Some(3.0), None])) as ArrayRef),
        ]);
        let err = load_file(file.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("null value"), "{message}");
        assert!(message.contains("'b'"), "{message}");
    }
}
