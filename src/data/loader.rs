use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray, Time32MillisecondArray, Time32SecondArray,
    Time64MicrosecondArray, Time64NanosecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::aggregate::nan_to_zero;
use super::error::DataSourceError;
use super::model::{CellValue, SalesDataset, Transaction};
use crate::config::{ColumnMapping, SourceConfig};

/// Wall-clock format of the time-of-day column.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// ODS stores times of day as ISO 8601 durations, e.g. `PT13H08M00S`.
const ISO_DURATION_FORMAT: &str = "PT%HH%MM%S%.fS";

const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the sales dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – the configured sheet,
///   `header_offset` rows skipped, then a header row
/// * `.csv`     – same layout as a sheet
/// * `.parquet` – one column per field, schema names are the headers
/// * `.json`    – `[{ "城市": "...", "总价": 12.5, ... }, ...]`
///
/// Either the whole file loads or a [`DataSourceError`] is returned.
pub fn load_file(path: &Path, source: &SourceConfig) -> Result<SalesDataset, DataSourceError> {
    std::fs::metadata(path).map_err(|e| DataSourceError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, source),
        "csv" => read_csv(path, source.header_offset),
        "parquet" | "pq" => read_parquet(path),
        "json" => read_json(path),
        other => return Err(DataSourceError::UnsupportedFormat(other.to_string())),
    }
    .map_err(|e| into_source_error(path, e))?;

    let dataset = build_dataset(&table, &source.columns)?;
    log::info!(
        "Loaded {} transactions from {} ({} columns)",
        dataset.len(),
        path.display(),
        table.headers.len()
    );
    Ok(dataset)
}

/// Typed errors raised inside a reader pass through; everything else becomes
/// a `Read` error carrying the context chain.
fn into_source_error(path: &Path, err: anyhow::Error) -> DataSourceError {
    match err.downcast::<DataSourceError>() {
        Ok(typed) => typed,
        Err(other) => DataSourceError::Read {
            path: path.to_path_buf(),
            source: other.into(),
        },
    }
}

// ---------------------------------------------------------------------------
// RawTable – header row plus decoded cells, format independent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    fn column(&self, name: &str) -> Result<usize, DataSourceError> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DataSourceError::MissingColumn(name.to_string()))
    }
}

/// Map configured columns onto typed rows, filling missing numbers with 0
/// and deriving the hour bucket.
pub fn build_dataset(
    table: &RawTable,
    columns: &ColumnMapping,
) -> Result<SalesDataset, DataSourceError> {
    let order_id = table.column(&columns.order_id)?;
    let city = table.column(&columns.city)?;
    let customer_type = table.column(&columns.customer_type)?;
    let gender = table.column(&columns.gender)?;
    let product_line = table.column(&columns.product_line)?;
    let total = table.column(&columns.total)?;
    let rating = table.column(&columns.rating)?;
    let time = table.column(&columns.time)?;

    let mut rows = Vec::with_capacity(table.rows.len());

    for (i, cells) in table.rows.iter().enumerate() {
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        let row_no = i + 1;
        let cell = |idx: usize| cells.get(idx).unwrap_or(&CellValue::Empty);

        let (time_text, hour) = time_of_day(cell(time), row_no)?;

        rows.push(Transaction {
            order_id: text(cell(order_id)),
            city: text(cell(city)),
            customer_type: text(cell(customer_type)),
            gender: text(cell(gender)),
            product_line: text(cell(product_line)),
            total: number(cell(total), row_no, &columns.total)?,
            rating: number(cell(rating), row_no, &columns.rating)?,
            time: time_text,
            hour,
        });
    }

    Ok(SalesDataset::from_rows(rows))
}

fn text(cell: &CellValue) -> String {
    cell.to_string().trim().to_string()
}

/// Missing and NaN become 0; non-numeric text is an error.
fn number(cell: &CellValue, row: usize, column: &str) -> Result<f64, DataSourceError> {
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.as_f64()
        .map(nan_to_zero)
        .ok_or_else(|| DataSourceError::InvalidNumber {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        })
}

/// Parse a time-of-day cell into its `HH:MM:SS` text and hour bucket.
///
/// Text must match [`TIME_FORMAT`], an ISO duration (`PT13H08M00S`) or an
/// ISO date-time, whose time part is used. Numbers are spreadsheet serials:
/// the fractional part is the fraction of the day.
pub fn time_of_day(cell: &CellValue, row: usize) -> Result<(String, u8), DataSourceError> {
    let invalid = || DataSourceError::InvalidTime {
        row,
        value: cell.to_string(),
    };

    let parsed = match cell {
        CellValue::Text(s) => parse_time_text(s.trim()),
        CellValue::Float(_) | CellValue::Integer(_) => cell
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .and_then(|v| {
                let secs = (v.fract() * SECONDS_PER_DAY).round() as u32 % 86_400;
                NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
            }),
        CellValue::Bool(_) | CellValue::Empty => None,
    };

    let t = parsed.ok_or_else(invalid)?;
    Ok((t.format(TIME_FORMAT).to_string(), t.hour() as u8))
}

fn parse_time_text(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, ISO_DURATION_FORMAT))
        .or_else(|_| NaiveDateTime::parse_from_str(s, ISO_DATETIME_FORMAT).map(|dt| dt.time()))
        .ok()
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path, source: &SourceConfig) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    if !workbook.sheet_names().iter().any(|s| s == &source.sheet) {
        bail!(DataSourceError::MissingSheet(source.sheet.clone()));
    }
    let range = workbook
        .worksheet_range(&source.sheet)
        .with_context(|| format!("reading sheet {}", source.sheet))?;

    // The range only spans used cells; the offset counts from the sheet top.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let skip = source.header_offset.saturating_sub(first_row);

    let mut rows = range.rows().skip(skip);
    let headers = match rows.next() {
        Some(r) => r.iter().map(|c| data_to_cell(c).to_string()).collect(),
        None => bail!("sheet {} has no header row", source.sheet),
    };
    let rows = rows
        .map(|r| r.iter().map(data_to_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // #N/A and friends read as missing.
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout mirrors the sheet: `header_offset` leading lines are skipped,
/// the next one holds the column names. Cells stay text; the row builder
/// parses numbers.
///
/// The offset counts physical lines, blank ones included. The csv parser
/// drops empty lines, so they are skipped before it sees the input.
fn read_csv(path: &Path, header_offset: usize) -> Result<RawTable> {
    let mut input = BufReader::new(File::open(path).context("opening CSV")?);
    let mut line = Vec::new();
    for _ in 0..header_offset {
        line.clear();
        if input.read_until(b'\n', &mut line).context("skipping CSV title lines")? == 0 {
            break;
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = reader.records();
    let headers = match records.next() {
        Some(r) => r
            .context("reading CSV header")?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect(),
        None => bail!("CSV has no header row"),
    };

    let mut rows = Vec::new();
    for (row_no, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), including `time` columns.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .zip(&headers)
            .map(|(col, name)| column_cells(col, name))
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|cells| cells[row].clone()).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

/// Decode a whole Arrow column.
///
/// Dictionary-encoded columns (pandas categoricals) and string views are
/// cast to plain `Utf8` first. Types without a dedicated branch in
/// [`extract_cell`] are rendered with Arrow's value formatter. A type the
/// formatter cannot render is an error.
fn column_cells(col: &ArrayRef, name: &str) -> Result<Vec<CellValue>> {
    let col = match col.data_type() {
        DataType::Dictionary(_, _) | DataType::Utf8View => cast(col.as_ref(), &DataType::Utf8)
            .with_context(|| format!("decoding parquet column {name}"))?,
        _ => Arc::clone(col),
    };

    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(col.as_ref(), &options).map_err(|_| {
        DataSourceError::UnsupportedColumnType {
            column: name.to_string(),
            data_type: col.data_type().to_string(),
        }
    })?;

    Ok((0..col.len())
        .map(|row| {
            extract_cell(&col, row)
                .unwrap_or_else(|| CellValue::Text(formatter.value(row).to_string()))
        })
        .collect())
}

/// Extract a single cell from an Arrow column at a given row, or `None` for
/// a type without a native mapping.
fn extract_cell(col: &ArrayRef, row: usize) -> Option<CellValue> {
    if col.is_null(row) {
        return Some(CellValue::Empty);
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        DataType::Time32(TimeUnit::Second) => any
            .downcast_ref::<Time32SecondArray>()
            .map(|a| seconds_to_cell(a.value(row) as i64)),
        DataType::Time32(TimeUnit::Millisecond) => any
            .downcast_ref::<Time32MillisecondArray>()
            .map(|a| seconds_to_cell(a.value(row) as i64 / 1_000)),
        DataType::Time64(TimeUnit::Microsecond) => any
            .downcast_ref::<Time64MicrosecondArray>()
            .map(|a| seconds_to_cell(a.value(row) / 1_000_000)),
        DataType::Time64(TimeUnit::Nanosecond) => any
            .downcast_ref::<Time64NanosecondArray>()
            .map(|a| seconds_to_cell(a.value(row) / 1_000_000_000)),
        _ => None,
    }
}

fn seconds_to_cell(secs: i64) -> CellValue {
    let secs = secs.rem_euclid(86_400);
    CellValue::Text(format!(
        "{:02}:{:02}:{:02}",
        secs / 3_600,
        secs % 3_600 / 60,
        secs % 60
    ))
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut keys = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().cloned());
        objects.push(obj);
    }

    let headers: Vec<String> = keys.into_iter().collect();
    let rows = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
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
        JsonValue::Null => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}
