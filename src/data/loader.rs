use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{Dataset, MetadataValue, Passenger};

/// Where the seaborn `titanic` dataset lives.
pub const BUILTIN_DATASET_URL: &str =
    "https://raw.githubusercontent.com/mwaskom/seaborn-data/master/titanic.csv";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// CSV served over HTTP(S).
    Remote { url: String },
    /// Local `.csv`, `.json` or `.parquet` copy.
    File(PathBuf),
}

impl DataSource {
    pub fn builtin() -> Self {
        DataSource::Remote {
            url: BUILTIN_DATASET_URL.to_string(),
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::builtin()
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote { url } => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Loads its source once and hands out the same table afterwards.
/// A failed load is not remembered.
#[derive(Debug)]
pub struct DatasetCache {
    source: DataSource,
    cell: OnceLock<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Result<Arc<Dataset>, DataError> {
        if let Some(dataset) = self.cell.get() {
            log::debug!("dataset cache hit for {}", self.source);
            return Ok(Arc::clone(dataset));
        }
        let dataset = load_from(&self.source)?;
        Ok(Arc::clone(self.cell.get_or_init(|| Arc::new(dataset))))
    }
}

static PROCESS_CACHE: OnceLock<DatasetCache> = OnceLock::new();

/// Choose the process-wide source. Only effective before the first
/// [`load`]; returns `false` if a source was already fixed.
pub fn configure(source: DataSource) -> bool {
    PROCESS_CACHE.set(DatasetCache::new(source)).is_ok()
}

/// The canonical dataset, materialized on first call and shared afterwards.
pub fn load() -> Result<Arc<Dataset>, DataError> {
    PROCESS_CACHE
        .get_or_init(|| DatasetCache::new(DataSource::builtin()))
        .get()
}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

/// Columns in source order plus one cell map per row.
struct RawTable {
    columns: Vec<String>,
    rows: Vec<BTreeMap<String, MetadataValue>>,
}

/// Fetch and parse `source` without memoization.
pub fn load_from(source: &DataSource) -> Result<Dataset, DataError> {
    let table = match source {
        DataSource::Remote { url } => fetch_csv(url),
        DataSource::File(path) => read_file(path),
    };
    let dataset = table
        .and_then(into_dataset)
        .map_err(|cause| DataError::unavailable(source, cause))?;

    log::info!(
        "Loaded {} passengers with {} columns from {source}",
        dataset.len(),
        dataset.column_names().len()
    );
    Ok(dataset)
}

fn into_dataset(table: RawTable) -> Result<Dataset> {
    if table.rows.is_empty() {
        bail!("source contains no passenger rows");
    }
    let passengers = table
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, fields)| Passenger::from_fields(fields).with_context(|| format!("row {i}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(Dataset::new(table.columns, passengers))
}

fn fetch_csv(url: &str) -> Result<RawTable> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("building HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .context("server rejected dataset request")?;
    let body = response.bytes().context("reading response body")?;
    read_csv(csv::Reader::from_reader(body.as_ref()))
}

/// Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one passenger per line (seaborn layout)
/// * `.json`    – `[{ "survived": 0, "pclass": 3, ... }, ...]`
/// * `.parquet` – Pandas `df.to_parquet()` / Polars `df.write_parquet()`
fn read_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let reader = csv::Reader::from_path(path).context("opening CSV")?;
            read_csv(reader)
        }
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<RawTable> {
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows: Vec<BTreeMap<String, MetadataValue>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = columns
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_metadata_type(value)))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    if s.is_empty() {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    match s {
        "true" | "True" => MetadataValue::Bool(true),
        "false" | "False" => MetadataValue::Bool(false),
        _ => MetadataValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_metadata(val));
        }
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    match val {
        JsonValue::String(s) => MetadataValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                MetadataValue::Float(f)
            } else {
                MetadataValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => MetadataValue::Bool(*b),
        JsonValue::Null => MetadataValue::Null,
        other => MetadataValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Every column becomes a cell; categorical (dictionary-encoded) columns
/// are decoded to strings first.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<BTreeMap<String, MetadataValue>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let arrays = batch
            .columns()
            .iter()
            .map(decode_dictionary)
            .collect::<Result<Vec<ArrayRef>>>()?;

        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .zip(&arrays)
                .map(|(name, array)| (name.clone(), extract_metadata_value(array, row)))
                .collect();
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

fn decode_dictionary(col: &ArrayRef) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Dictionary(_, _) => {
            arrow::compute::cast(col.as_ref(), &DataType::Utf8)
                .context("decoding categorical column")
        }
        _ => Ok(Arc::clone(col)),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_metadata_value(col: &ArrayRef, row: usize) -> MetadataValue {
    if col.is_null(row) {
        return MetadataValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => MetadataValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => {
            MetadataValue::String(col.as_string::<i64>().value(row).to_string())
        }
        DataType::Int8 => MetadataValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => {
            MetadataValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64)
        }
        DataType::Int32 => {
            MetadataValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64)
        }
        DataType::Int64 => MetadataValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            MetadataValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => MetadataValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => MetadataValue::Bool(col.as_boolean().value(row)),
        other => MetadataValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PassengerClass;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
survived,pclass,sex,age,sibsp,parch,fare,embarked,class,who,adult_male,deck,embark_town,alive,alone
0,3,male,22.0,1,0,7.25,S,Third,man,True,,Southampton,no,False
1,1,female,38.0,1,0,71.2833,C,First,woman,False,C,Cherbourg,yes,False
1,3,female,,0,0,7.925,S,Third,woman,False,,Southampton,yes,True
";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_seaborn_csv_layout() {
        let table = read_csv(csv::Reader::from_reader(SAMPLE_CSV.as_bytes())).unwrap();
        let ds = into_dataset(table).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names()[0], "survived");
        assert_eq!(ds.column_names().len(), 15);

        let first = &ds.passengers()[0];
        assert!(!first.survived);
        assert_eq!(first.class, PassengerClass::Third);
        assert_eq!(first.age, Some(22.0));
        assert_eq!(first.fare, Some(7.25));
        assert_eq!(first.embark_town.as_deref(), Some("Southampton"));
        assert_eq!(first.cell("adult_male"), &MetadataValue::Bool(true));
        assert_eq!(first.cell("deck"), &MetadataValue::Null);

        assert_eq!(ds.passengers()[2].age, None);
        assert_eq!(
            ds.numeric_columns(),
            vec!["survived", "pclass", "age", "sibsp", "parch", "fare", "adult_male", "alone"]
        );
    }

    #[test]
    fn loads_csv_file() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let ds = load_from(&DataSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn loads_json_records() {
        let file = write_temp(
            ".json",
            r#"[
                {"survived": 1, "pclass": 2, "sex": "female", "age": 4.0, "fare": 23.0, "embark_town": "Southampton"},
                {"survived": 0, "pclass": 1, "sex": "male", "age": null, "fare": 52.0, "embark_town": null}
            ]"#,
        );
        let ds = load_from(&DataSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.passengers()[0].class, PassengerClass::Second);
        assert_eq!(ds.passengers()[1].age, None);
        assert_eq!(ds.passengers()[1].embark_town, None);
    }

    #[test]
    fn json_keeps_source_column_order() {
        let file = write_temp(
            ".json",
            r#"[{"survived": 1, "pclass": 2, "sex": "female", "age": 4.0, "fare": 23.0}]"#,
        );
        let ds = load_from(&DataSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(ds.column_names(), ["survived", "pclass", "sex", "age", "fare"]);
    }

    #[test]
    fn loads_parquet_with_categorical_class() {
        use arrow::array::{DictionaryArray, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("survived", DataType::Int64, false),
            Field::new(
                "class",
                DataType::Dictionary(Box::new(DataType::Int8), Box::new(DataType::Utf8)),
                false,
            ),
            Field::new("sex", DataType::Utf8, false),
            Field::new("age", DataType::Float64, true),
        ]));
        let class: DictionaryArray<Int8Type> = vec!["Third", "First", "Third"].into_iter().collect();
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(Int64Array::from(vec![0, 1, 1])) as ArrayRef,
                Arc::new(class),
                Arc::new(StringArray::from(vec!["male", "female", "female"])),
                Arc::new(Float64Array::from(vec![Some(22.0), Some(38.0), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(std::fs::File::create(file.path()).unwrap(), schema, None)
                .unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_from(&DataSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(ds.column_names(), ["survived", "class", "sex", "age"]);
        assert_eq!(ds.len(), 3);

        let classes: Vec<_> = ds.passengers().iter().map(|p| p.class).collect();
        assert_eq!(
            classes,
            vec![PassengerClass::Third, PassengerClass::First, PassengerClass::Third]
        );
        assert!(ds.passengers()[1].survived);
        assert_eq!(ds.passengers()[1].sex, crate::data::model::Sex::Female);
        assert_eq!(ds.passengers()[0].age, Some(22.0));
        assert_eq!(ds.passengers()[2].age, None);
        assert_eq!(
            ds.passengers()[0].cell("class"),
            &MetadataValue::String("Third".into())
        );
    }

    #[test]
    fn infinite_fare_is_unavailable() {
        let file = write_temp(".csv", "survived,pclass,sex,fare\n1,3,female,inf\n");
        let err = load_from(&DataSource::File(file.path().to_path_buf())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fare"), "{message}");
    }

    #[test]
    fn cache_returns_the_same_table() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let cache = DatasetCache::new(DataSource::File(file.path().to_path_buf()));

        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn cache_serves_memoized_table_after_source_disappears() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let cache = DatasetCache::new(DataSource::File(file.path().to_path_buf()));
        let first = cache.get().unwrap();
        drop(file);
        let second = cache.get().unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_from(&DataSource::File("/nonexistent/titanic.csv".into())).unwrap_err();
        let DataError::Unavailable { origin, .. } = err;
        assert!(origin.contains("titanic.csv"));
    }

    #[test]
    fn unsupported_extension_is_unavailable() {
        let file = write_temp(".xlsx", "whatever");
        let err = load_from(&DataSource::File(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn empty_table_is_unavailable_not_empty() {
        let file = write_temp(".csv", "survived,pclass,sex,age\n");
        let err = load_from(&DataSource::File(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("no passenger rows"));
    }

    #[test]
    fn malformed_row_names_the_row() {
        let file = write_temp(".csv", "survived,pclass,sex\n1,3,female\nmaybe,3,male\n");
        let err = load_from(&DataSource::File(file.path().to_path_buf())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("row 1"), "{message}");
        assert!(message.contains("survived"), "{message}");
    }

    #[test]
    fn unreachable_remote_is_unavailable() {
        let source = DataSource::Remote {
            url: "http://127.0.0.1:9/titanic.csv".to_string(),
        };
        let cache = DatasetCache::new(source);
        assert!(matches!(cache.get(), Err(DataError::Unavailable { .. })));
    }
}
