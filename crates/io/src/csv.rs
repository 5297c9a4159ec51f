// CSV/TSV ingestion into a dataset, CSV export of record lists

use std::io::{Read, Write};
use std::path::Path;

use facetgrid_config::SchemaConfig;
use facetgrid_engine::{Dataset, Record, RecordId};
use rustc_hash::FxHashSet;

use crate::error::IngestError;

/// What ingestion had to leave out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// 1-based line numbers of rows whose width didn't match the header
    pub skipped_lines: Vec<u64>,
    /// Identities seen again after their first row; the later rows were dropped
    pub duplicates: Vec<RecordId>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_lines.is_empty() && self.duplicates.is_empty()
    }
}

pub fn import(path: &Path, config: &SchemaConfig) -> Result<(Dataset, ImportReport), IngestError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    log::debug!("{}: sniffed delimiter {:?}", path.display(), delimiter as char);
    import_from_string(&content, delimiter, config)
}

pub fn import_with_delimiter(
    path: &Path,
    delimiter: u8,
    config: &SchemaConfig,
) -> Result<(Dataset, ImportReport), IngestError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter, config)
}

/// Detect the most likely field delimiter from the first few lines.
///
/// Each candidate (tab, semicolon, comma, pipe) is scored by how many sample
/// lines share the first line's field count, times that count. A candidate
/// that leaves the first line as a single field is never chosen.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delim in candidates {
        let widths: Vec<usize> = sample.iter().map(|line| line_width(line, delim)).collect();
        let Some(&header_width) = widths.first() else {
            break;
        };
        if header_width <= 1 {
            continue;
        }
        let consistent = widths.iter().filter(|&&w| w == header_width).count();
        let score = consistent * header_width;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn line_width(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read a file as UTF-8, falling back to Windows-1252 (Excel exports)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IngestError> {
    let io_err = |e: std::io::Error| IngestError::Io(format!("{}: {e}", path.display()));
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text into a dataset.
///
/// The first non-empty row is the header. Cells are trimmed and empty cells
/// are left out of the record. Rows wider or narrower than the header are
/// skipped, except that a single trailing empty cell (a trailing delimiter)
/// is tolerated. Columns with a blank header name are ignored.
pub fn import_from_string(
    content: &str,
    delimiter: u8,
    config: &SchemaConfig,
) -> Result<(Dataset, ImportReport), IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut rows = reader.records();

    let header = match rows.next() {
        Some(row) => row.map_err(|e| IngestError::Csv(e.to_string()))?,
        None => return Err(IngestError::MissingHeader),
    };
    // Column position -> field name; None for blank header cells
    let columns: Vec<Option<String>> = header
        .iter()
        .map(|name| (!name.is_empty()).then(|| name.to_string()))
        .collect();
    let fields: Vec<String> = columns.iter().flatten().cloned().collect();
    if fields.is_empty() {
        return Err(IngestError::MissingHeader);
    }

    let schema = config.to_schema_for(&fields);
    let mut report = ImportReport::default();
    let mut seen: FxHashSet<RecordId> = FxHashSet::default();
    let mut records = Vec::new();

    for row in rows {
        let row = row.map_err(|e| IngestError::Csv(e.to_string()))?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let mut width = row.len();
        if width == columns.len() + 1 && row.get(width - 1) == Some("") {
            width -= 1;
        }
        if width != columns.len() {
            log::warn!(
                "line {line}: expected {} cells, found {}; row skipped",
                columns.len(),
                row.len()
            );
            report.skipped_lines.push(line);
            continue;
        }

        let record = Record::from_pairs(
            columns
                .iter()
                .zip(row.iter())
                .filter_map(|(name, cell)| match name {
                    Some(name) if !cell.is_empty() => Some((name.as_str(), cell)),
                    _ => None,
                }),
        );

        let id = record.id(&schema);
        if !seen.insert(id.clone()) {
            log::warn!("line {line}: duplicate identity {id}; keeping the first row");
            report.duplicates.push(id);
            continue;
        }
        records.push(record);
    }

    log::info!(
        "ingested {} records with {} fields ({} rows skipped, {} duplicates)",
        records.len(),
        fields.len(),
        report.skipped_lines.len(),
        report.duplicates.len()
    );
    let dataset = Dataset::new(fields, records, schema)?;
    Ok((dataset, report))
}

// =============================================================================
// Export
// =============================================================================

pub fn export(dataset: &Dataset, records: &[&Record], path: &Path) -> Result<(), IngestError> {
    let file = std::fs::File::create(path)
        .map_err(|e| IngestError::Io(format!("{}: {e}", path.display())))?;
    write_records(file, dataset, records, b',')
}

/// Write a header row (dataset field order) then one row per record.
/// Absent cells are written empty.
pub fn write_records<W: Write>(
    out: W,
    dataset: &Dataset,
    records: &[&Record],
    delimiter: u8,
) -> Result<(), IngestError> {
    let csv_err = |e: csv::Error| IngestError::Csv(e.to_string());
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);

    writer
        .write_record(dataset.field_names())
        .map_err(csv_err)?;
    for record in records {
        let row = dataset
            .field_names()
            .map(|field| record.value(field).unwrap_or_default());
        writer.write_record(row).map_err(csv_err)?;
    }

    writer
        .flush()
        .map_err(|e| IngestError::Io(e.to_string()))?;
    Ok(())
}
