use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Record, Value};

/// Cell texts read as missing, as common dataframe readers do.
const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Tabular formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    /// Pick a format from a file name's extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Format::Csv),
            "json" => Some(Format::Json),
            "parquet" | "pq" => Some(Format::Parquet),
            _ => None,
        }
    }

    /// Format an upload called `name` is parsed as.
    pub fn for_upload(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Format::Csv)
    }
}

/// Load a raw dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one record per line
/// * `.json`    – `[{ "Age": 21, "Gender": "Female", ... }, ...]`
/// * `.parquet` – flat columns of strings, ints, floats or bools
pub fn load_file(path: &Path) -> Result<Dataset> {
    let name = path.to_string_lossy();
    let Some(format) = Format::from_name(&name) else {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        bail!("Unsupported file extension: .{ext}");
    };

    match format {
        Format::Csv => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_csv(file)
        }
        Format::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            load_json(&text)
        }
        Format::Parquet => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_parquet(file)
        }
    }
}

/// Load a raw dataset from uploaded bytes. `name` only picks the format;
/// anything unrecognised is read as CSV.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset> {
    match Format::for_upload(name) {
        Format::Csv => load_csv(bytes),
        Format::Json => {
            let text = std::str::from_utf8(bytes).context("upload is not valid UTF-8")?;
            load_json(text)
        }
        Format::Parquet => load_parquet(Bytes::copy_from_slice(bytes)),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row a record.
/// Short rows leave their trailing cells missing.
pub fn load_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no columns");
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        if row.len() > headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                headers.len(),
                row.len()
            );
        }
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(col, cell)| (col.clone(), guess_value(cell)))
            .collect();
        records.push(record);
    }

    log::debug!("parsed {} CSV rows, {} columns", records.len(), headers.len());
    Ok(Dataset::new(headers, records))
}

fn guess_value(s: &str) -> Value {
    if NA_MARKERS.contains(&s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Age": 24, "Gender": "Female", "Sleep_Hours": 6.5, ... },
///   ...
/// ]
/// ```
pub fn load_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut record = Record::default();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            record.values.insert(key.clone(), json_to_value(val));
        }
        records.push(record);
    }

    Ok(Dataset::new(columns, records))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => guess_value(s.trim()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
pub fn load_parquet<T: ChunkReader + 'static>(input: T) -> Result<Dataset> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(input).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let record = columns
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    extract_value(batch.column(idx), row).map(|v| (name.clone(), v))
                })
                .collect::<Result<Record>>()?;
            records.push(record);
        }
    }

    Ok(Dataset::new(columns, records))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().context("expected Int32Array")?;
            Value::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().context("expected Int64Array")?;
            Value::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Value::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Value::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            Value::Bool(arr.value(row))
        }
        _ => guess_value(&array_value_to_string(col.as_ref(), row)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn csv_cells_are_typed_and_na_markers_are_missing() {
        let csv = "Age,Gender,Sleep_Hours,Has_Night_Mode_On\n\
                   21,Female,6.5,True\n\
                   NA,Male,,False\n";
        let ds = load_csv(csv.as_bytes()).unwrap();

        assert_eq!(ds.columns, vec!["Age", "Gender", "Sleep_Hours", "Has_Night_Mode_On"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].get("Age"), Some(&Value::Integer(21)));
        assert_eq!(ds.records[0].get("Sleep_Hours"), Some(&Value::Float(6.5)));
        assert_eq!(ds.records[0].get("Has_Night_Mode_On"), Some(&Value::Bool(true)));
        assert_eq!(ds.records[1].get("Age"), None);
        assert_eq!(ds.records[1].get("Sleep_Hours"), None);
    }

    #[test]
    fn csv_short_rows_leave_cells_missing() {
        let ds = load_csv("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(ds.records[0].get("c"), None);
        assert!(ds.has_field("c"));
    }

    #[test]
    fn csv_long_rows_are_a_load_error() {
        assert!(load_csv("a,b\n1,2,3\n".as_bytes()).is_err());
    }

    #[test]
    fn empty_input_is_a_load_error() {
        assert!(load_csv("".as_bytes()).is_err());
        assert!(load_bytes("data.json", b"{\"not\": \"an array\"}").is_err());
    }

    #[test]
    fn json_rows_keep_first_seen_column_order() {
        let text = r#"[{"Age": 30, "Gender": "Male"}, {"Age": 22, "Country": "India"}]"#;
        let ds = load_json(text).unwrap();
        assert!(ds.has_field("Country"));
        assert_eq!(ds.records[1].text("Country"), Some("India"));
        assert_eq!(ds.records[1].get("Gender"), None);
    }

    #[test]
    fn unknown_upload_extension_reads_as_csv() {
        let ds = load_bytes("upload.bin", b"Age\n40\n").unwrap();
        assert_eq!(ds.records[0].number("Age"), Some(40.0));
    }

    #[test]
    fn unsupported_file_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn parquet_file_round_trips_flat_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Gender", DataType::Utf8, true),
            Field::new("Sleep_Hours", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Female"), None])),
                Arc::new(Float64Array::from(vec![Some(7.0), Some(5.5)])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns, vec!["Gender", "Sleep_Hours"]);
        assert_eq!(ds.records[0].text("Gender"), Some("Female"));
        assert_eq!(ds.records[1].get("Gender"), None);
        assert_eq!(ds.records[1].number("Sleep_Hours"), Some(5.5));

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(load_bytes("sample.parquet", &bytes).unwrap(), ds);
    }
}
