use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use arrow::array::{ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::error::ArrowError;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Dataset};
use crate::error::{AnalysisError, Result};

/// File extensions [`load_dataset`] knows how to read.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "csv", "tsv", "xlsx", "xlsm", "xlsb", "xls", "ods", "parquet", "pq", "json",
];

/// Cell contents treated as missing unless configured otherwise.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Exact cell contents that mark a missing value.
    pub na_values: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    fn is_missing(&self, cell: &str) -> bool {
        self.na_values.iter().any(|na| na == cell)
    }

    fn cell(&self, raw: &str) -> Option<String> {
        if self.is_missing(raw) {
            None
        } else {
            Some(raw.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset with the default missing-value tokens.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    load_dataset_with(path, &LoadOptions::default())
}

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row with column names, one record per line
/// * `.xlsx` `.xlsm` `.xlsb` `.xls` `.ods` – first worksheet, first row is the header
/// * `.parquet` – flat columns; numeric Arrow types become numeric columns
/// * `.json` – `[{ "carat": 0.23, "cut": "Ideal", ... }, ...]`
pub fn load_dataset_with(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_delimited(path, b',', options),
        "tsv" => load_delimited(path, b'\t', options),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, options),
        "parquet" | "pq" => load_parquet(path, options),
        "json" => load_json(path, options),
        other => Err(AnalysisError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );
    Ok(dataset.with_source(path))
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Give blank headers a positional name and suffix duplicates with `.1`, `.2`, ...
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            header
        };

        let mut name = base.clone();
        while taken.contains(&name) {
            let n = counts.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{base}.{n}");
        }
        taken.insert(name.clone());
        names.push(name);
    }
    names
}

fn build_dataset(
    path: &Path,
    headers: Vec<String>,
    cells: Vec<Vec<Option<String>>>,
) -> Result<Dataset> {
    let columns = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::infer(name, values))
        .collect();
    Dataset::new(columns).map_err(|e| AnalysisError::parse(path, e.to_string()))
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, then one record per line.
/// Short records are padded with missing cells; long records are an error.
fn load_delimited(path: &Path, delimiter: u8, options: &LoadOptions) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::parse(path, e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AnalysisError::parse(path, format!("reading header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(AnalysisError::parse(path, "no columns to parse"));
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| AnalysisError::parse(path, format!("row {}: {e}", row_no + 1)))?;

        if record.len() > headers.len() {
            return Err(AnalysisError::parse(
                path,
                format!(
                    "row {}: expected {} fields, saw {}",
                    row_no + 1,
                    headers.len(),
                    record.len()
                ),
            ));
        }

        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(col_idx).and_then(|v| options.cell(v)));
        }
    }

    build_dataset(path, headers, cells)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet; its first row holds the column names.
fn load_workbook(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AnalysisError::parse(path, e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::parse(path, "workbook has no worksheets"))?
        .map_err(|e| AnalysisError::parse(path, e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| AnalysisError::parse(path, "first worksheet is empty"))?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| workbook_text(c).unwrap_or_default())
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let value = row
                .get(col_idx)
                .and_then(workbook_text)
                .filter(|s| !options.is_missing(s));
            column.push(value);
        }
    }

    build_dataset(path, headers, cells)
}

fn workbook_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Cells collected across record batches; the kind comes from the Arrow schema.
enum PendingColumn {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl PendingColumn {
    fn for_type(data_type: &DataType) -> Self {
        if data_type.is_numeric() {
            PendingColumn::Numeric(Vec::new())
        } else {
            PendingColumn::Text(Vec::new())
        }
    }

    fn extend_from(
        &mut self,
        array: &ArrayRef,
        options: &LoadOptions,
    ) -> std::result::Result<(), ArrowError> {
        match self {
            PendingColumn::Numeric(values) => {
                let floats = cast(array, &DataType::Float64)?;
                values.extend(floats.as_primitive::<Float64Type>().iter());
            }
            PendingColumn::Text(values) => {
                let strings = cast(array, &DataType::Utf8)?;
                values.extend(
                    strings
                        .as_string::<i32>()
                        .iter()
                        .map(|s| s.and_then(|s| options.cell(s))),
                );
            }
        }
        Ok(())
    }

    fn into_column(self, name: String) -> Column {
        match self {
            PendingColumn::Numeric(values) => Column::numeric(name, values),
            PendingColumn::Text(values) => Column::categorical(name, values),
        }
    }
}

fn load_parquet(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| AnalysisError::parse(path, e.to_string()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| AnalysisError::parse(path, format!("reading parquet metadata: {e}")))?;

    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| AnalysisError::parse(path, format!("building parquet reader: {e}")))?;

    let mut pending: Vec<PendingColumn> = schema
        .fields()
        .iter()
        .map(|f| PendingColumn::for_type(f.data_type()))
        .collect();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| AnalysisError::parse(path, format!("reading record batch: {e}")))?;
        for (col_idx, column) in pending.iter_mut().enumerate() {
            column
                .extend_from(batch.column(col_idx), options)
                .map_err(|e| {
                    AnalysisError::parse(
                        path,
                        format!("column '{}': {e}", schema.field(col_idx).name()),
                    )
                })?;
        }
    }

    let names = normalize_headers(schema.fields().iter().map(|f| f.name().clone()).collect());
    let columns = pending
        .into_iter()
        .zip(names)
        .map(|(column, name)| column.into_column(name))
        .collect();
    Dataset::new(columns).map_err(|e| AnalysisError::parse(path, e.to_string()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "carat": 0.23, "cut": "Ideal", "price": 326 },
///   { "carat": 0.21, "cut": "Premium", "price": null }
/// ]
/// ```
///
/// Columns appear in first-seen key order; absent keys are missing cells.
fn load_json(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let text =
        std::fs::read_to_string(path).map_err(|e| AnalysisError::parse(path, e.to_string()))?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| AnalysisError::parse(path, e.to_string()))?;

    let records = root
        .as_array()
        .ok_or_else(|| AnalysisError::parse(path, "expected top-level JSON array"))?;

    let mut headers: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Option<String>>> = Vec::new();

    for (row_no, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| {
            AnalysisError::parse(path, format!("row {row_no} is not a JSON object"))
        })?;

        for (key, val) in obj {
            let col_idx = *index.entry(key.clone()).or_insert_with(|| {
                headers.push(key.clone());
                // Rows seen before this key appeared are missing in it.
                cells.push(vec![None; row_no]);
                headers.len() - 1
            });
            let column = &mut cells[col_idx];
            column.resize(row_no, None);
            column.push(json_text(val).and_then(|s| options.cell(&s)));
        }

        for column in &mut cells {
            column.resize(row_no + 1, None);
        }
    }

    build_dataset(path, headers, cells)
}

fn json_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
