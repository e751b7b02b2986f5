use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;

use crate::error::GateError;
use crate::records::SampleRecord;

/// Options controlling how a results file is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

// ---------------------------------------------------------------------------
// Column lookup
// ---------------------------------------------------------------------------

/// Positions of the known JTL columns within the header row.
/// `None` means the column is absent and its field takes the default value.
#[derive(Debug, Default)]
struct Columns {
    timestamp: Option<usize>,
    elapsed: Option<usize>,
    label: Option<usize>,
    response_code: Option<usize>,
    success: Option<usize>,
    bytes: Option<usize>,
    latency: Option<usize>,
    connect: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut columns = Self::default();
        for (idx, name) in headers.iter().enumerate() {
            let slot = match name.trim() {
                "timeStamp" => &mut columns.timestamp,
                "elapsed" => &mut columns.elapsed,
                "label" => &mut columns.label,
                "responseCode" => &mut columns.response_code,
                "success" => &mut columns.success,
                "bytes" => &mut columns.bytes,
                "Latency" => &mut columns.latency,
                "Connect" => &mut columns.connect,
                _ => continue,
            };
            // First occurrence wins when a column name is repeated.
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        columns
    }

    fn record(&self, row: &StringRecord) -> SampleRecord {
        SampleRecord {
            timestamp: numeric(row, self.timestamp),
            elapsed: numeric(row, self.elapsed),
            label: text(row, self.label),
            response_code: text(row, self.response_code),
            success: field(row, self.success)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            bytes: numeric(row, self.bytes),
            latency: numeric(row, self.latency),
            connect: numeric(row, self.connect),
        }
    }
}

fn field(row: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
}

fn text(row: &StringRecord, idx: Option<usize>) -> String {
    field(row, idx).unwrap_or_default().to_string()
}

/// Missing or malformed numbers fall back to zero.
fn numeric<T: FromStr + Default>(row: &StringRecord, idx: Option<usize>) -> T {
    field(row, idx)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse delimited results content (with header row) into sample records.
///
/// Records are returned in file order. Content with a header but no data
/// rows yields an empty `Vec`; deciding what that means is up to the caller.
pub fn parse_results(content: &[u8], options: ParseOptions) -> Result<Vec<SampleRecord>, GateError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers = reader
        .headers()
        .map_err(|e| GateError::Parse(format!("Failed to read header row: {e}")))?
        .clone();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(GateError::Parse("Results file has no header row".to_string()));
    }

    let columns = Columns::from_headers(&headers);
    if columns.elapsed.is_none() {
        tracing::warn!("results header has no 'elapsed' column; response times default to 0");
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(columns.record(&row));
    }

    tracing::debug!(count = records.len(), "parsed sample records");
    Ok(records)
}

/// Read a results file from disk and parse it.
///
/// The whole file is read into memory and the handle closed before parsing.
pub fn parse_results_file(
    path: impl AsRef<Path>,
    options: ParseOptions,
) -> Result<Vec<SampleRecord>, GateError> {
    let path = path.as_ref();
    let content = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read results file");
    parse_results(&content, options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
