// ============================================================
// RAW RECORD PARSER
// ============================================================
// Turn uploaded bytes into loosely-typed rows keyed by the header line

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::UTF_8;

use crate::domain::error::{AppError, Result};
use crate::domain::record::RawRow;

/// Delimiter used to re-split a row that collapsed into a single column
pub const FALLBACK_DELIMITER: char = ',';

/// Header-plus-data CSV reader producing [`RawRow`]s
#[derive(Debug, Clone)]
pub struct RawRecordParser {
    /// Field delimiter (default: comma)
    delimiter: u8,

    /// Quote character (default: double quote)
    quote: u8,
}

impl Default for RawRecordParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl RawRecordParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Decode raw upload bytes and parse them.
    ///
    /// A byte-order mark picks the encoding (UTF-8, UTF-16LE/BE) and is
    /// dropped; anything else is read as UTF-8 with invalid sequences
    /// replaced.
    pub fn parse_bytes(&self, raw: &[u8]) -> Result<Vec<RawRow>> {
        let (content, encoding, had_errors) = UTF_8.decode(raw);
        if had_errors {
            tracing::warn!(
                encoding = encoding.name(),
                "Upload contained invalid byte sequences; replaced during decoding"
            );
        }
        self.parse_content(&content)
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<Vec<RawRow>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let normalized = normalize_line_endings(content);

        if self.has_unterminated_quote(&normalized) {
            return Err(AppError::MalformedInput(
                "CSV content has an unterminated quoted field".to_string(),
            ));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .trim(Trim::None)
            .flexible(true)
            .from_reader(normalized.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::MalformedInput(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::MalformedInput(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            rows.push(self.parse_row(&headers, &record));
        }

        if rows.is_empty() {
            return Err(AppError::EmptyInput(
                "CSV content has no data rows".to_string(),
            ));
        }

        Ok(rows)
    }

    /// Zip one record with the header line
    fn parse_row(&self, headers: &StringRecord, record: &StringRecord) -> RawRow {
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header, record.get(idx).unwrap_or("")))
            .collect();

        recover_single_column(row)
    }

    /// Whether a quoted field is still open at end of input.
    ///
    /// Quotes are only significant at the start of a field; a doubled quote
    /// inside a quoted field is an escape.
    fn has_unterminated_quote(&self, content: &str) -> bool {
        let bytes = content.as_bytes();
        let mut in_quotes = false;
        let mut at_field_start = true;
        let mut idx = 0;

        while idx < bytes.len() {
            let byte = bytes[idx];
            if in_quotes {
                if byte == self.quote {
                    if bytes.get(idx + 1) == Some(&self.quote) {
                        idx += 1;
                    } else {
                        in_quotes = false;
                    }
                }
            } else if byte == self.quote && at_field_start {
                in_quotes = true;
            }
            at_field_start = !in_quotes && (byte == self.delimiter || byte == b'\n');
            idx += 1;
        }

        in_quotes
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Re-split a row whose header and value each collapsed into one field.
///
/// This happens when the file is comma separated but was read with another
/// delimiter (or each whole line was quoted). A file that really has a single
/// column passes through with only its key trimmed.
fn recover_single_column(row: RawRow) -> RawRow {
    let Some(field) = row.single_field() else {
        return row;
    };

    let recovered: RawRow = field
        .key
        .split(FALLBACK_DELIMITER)
        .map(str::trim)
        .zip(field.value.split(FALLBACK_DELIMITER))
        .collect();

    if recovered.len() > 1 {
        tracing::debug!(
            columns = recovered.len(),
            "Recovered single combined column by splitting on comma"
        );
    }

    recovered
}
