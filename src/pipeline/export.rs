//! Export decoding — UTF-16 bytes into CSV records.

use std::borrow::Cow;

use encoding_rs::UTF_16LE;
use tracing::warn;

use crate::error::RowFormatError;

/// One data row of the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// 1-based line number in the decoded text.
    pub line: u64,
    pub fields: Vec<String>,
}

/// Decode the raw export as UTF-16.
///
/// A byte-order mark selects the endianness and is stripped; without one the
/// text is read as little-endian. Invalid sequences become U+FFFD.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, encoding, had_errors) = UTF_16LE.decode(bytes);
    if had_errors {
        warn!(
            encoding = encoding.name(),
            "Export contained invalid sequences; replaced with U+FFFD"
        );
    }
    text
}

/// Parse comma-delimited text into records, dropping the header row.
///
/// Quoted fields may contain commas, quotes and newlines. A record the CSV
/// reader cannot decode is returned as an error in place.
pub fn parse_records(text: &str) -> Vec<Result<ExportRecord, RowFormatError>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|result| {
            let record = result.map_err(|e| RowFormatError::Csv(e.to_string()))?;
            Ok(ExportRecord {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                fields: record.iter().map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Decode and parse a raw export.
pub fn decode_export(bytes: &[u8]) -> Vec<Result<ExportRecord, RowFormatError>> {
    parse_records(&decode_text(bytes))
}

/// Encode text as UTF-16LE with a byte-order mark, the way exports arrive.
pub fn encode_utf16(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Package Name,App Version Code,App Version Name,Reviewer Language,Device,Review Submit Date and Time,Review Submit Millis Since Epoch,Review Last Update Date and Time,Review Last Update Millis Since Epoch,Star Rating,Review Title,Review Text,Developer Reply Date and Time,Developer Reply Millis Since Epoch,Developer Reply Text,Review Link";

    #[test]
    fn decodes_bom_little_endian() {
        let bytes = encode_utf16("a,b\n1,2\n");
        assert_eq!(decode_text(&bytes), "a,b\n1,2\n");
    }

    #[test]
    fn decodes_bom_big_endian() {
        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend("héllo".encode_utf16().flat_map(u16::to_be_bytes));
        assert_eq!(decode_text(&bytes), "héllo");
    }

    #[test]
    fn decodes_without_bom_as_little_endian() {
        let bytes: Vec<u8> = "ok".encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert_eq!(decode_text(&bytes), "ok");
    }

    #[test]
    fn header_is_dropped_and_quotes_are_honoured() {
        let text = format!(
            "{HEADER}\r\ncom.app,12,1.2,en,Pixel,x,0,2024-01-01T00:00:00Z,0,5,\"Nice, really\",\"Said \"\"wow\"\"\nand more\",,,,\n"
        );
        let records = parse_records(&text);
        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.fields.len(), 16);
        assert_eq!(record.fields[10], "Nice, really");
        assert_eq!(record.fields[11], "Said \"wow\"\nand more");
        assert_eq!(record.fields[15], "");
        assert_eq!(record.line, 2);
    }

    #[test]
    fn short_rows_are_kept_for_the_processor_to_reject() {
        let text = format!("{HEADER}\nonly,three,fields\n");
        let records = parse_records(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_ref().unwrap().fields.len(), 3);
    }

    #[test]
    fn header_only_export_has_no_records() {
        assert!(decode_export(&encode_utf16(HEADER)).is_empty());
        assert!(decode_export(&[]).is_empty());
    }
}
