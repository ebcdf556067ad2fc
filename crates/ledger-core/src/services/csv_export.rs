//! CSV Export
//!
//! Spreadsheet-friendly dump of a project's entries: UTF-8 with BOM so
//! Excel picks the right encoding, every value quoted.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::{DomainError, DomainResult, LedgerEntry};

pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";

const NOTHING_TO_EXPORT: &str = "エクスポートするデータがありません。";

/// A rendered file, ready to hand to the download mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Data rows, excluding the header
    pub rows: usize,
}

impl CsvExport {
    /// Content without the BOM
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.bytes.strip_prefix(UTF8_BOM).unwrap_or(&self.bytes)).into_owned()
    }
}

pub fn export_filename(project: &str, payer: Option<&str>) -> String {
    match payer {
        Some(payer) => format!("{}_{}_memos.csv", project, payer),
        None => format!("{}_memos.csv", project),
    }
}

/// Render `entries` (only `payer`'s when given) as CSV.
///
/// The category column appears when any exported entry has a category.
pub fn export_csv(project: &str, entries: &[LedgerEntry], payer: Option<&str>) -> DomainResult<CsvExport> {
    let selected: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| payer.map_or(true, |p| e.payer == p))
        .collect();
    if selected.is_empty() {
        return Err(DomainError::InvalidInput(NOTHING_TO_EXPORT.to_string()));
    }

    let with_category = selected.iter().any(|e| e.category.is_some());
    let header = if with_category {
        "日付,支払い者,カテゴリ,金額,メモ\n"
    } else {
        "日付,支払い者,金額,メモ\n"
    };

    let mut buf = Vec::with_capacity(UTF8_BOM.len() + header.len() + selected.len() * 48);
    buf.extend_from_slice(UTF8_BOM);
    buf.extend_from_slice(header.as_bytes());

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);

    for entry in &selected {
        let amount = entry.amount.to_string();
        let result = if with_category {
            writer.write_record([
                entry.date.as_str(),
                entry.payer.as_str(),
                entry.category.as_deref().unwrap_or(""),
                amount.as_str(),
                entry.text.as_str(),
            ])
        } else {
            writer.write_record([entry.date.as_str(), entry.payer.as_str(), amount.as_str(), entry.text.as_str()])
        };
        result.map_err(|e| DomainError::Internal(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    Ok(CsvExport {
        filename: export_filename(project, payer),
        bytes,
        rows: selected.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<LedgerEntry> {
        vec![
            LedgerEntry::new("2024-05-01", "A", 300).with_text("lunch"),
            LedgerEntry::new("2024-05-02", "B", 100).with_text("bus"),
            LedgerEntry::new("2024-05-03", "A", 50).with_text("coffee"),
        ]
    }

    #[test]
    fn test_export_all() {
        let export = export_csv("trip", &sample(), None).unwrap();
        assert!(export.bytes.starts_with(UTF8_BOM));
        assert_eq!(export.filename, "trip_memos.csv");
        assert_eq!(
            export.text(),
            "日付,支払い者,金額,メモ\n\
             \"2024-05-01\",\"A\",\"300\",\"lunch\"\n\
             \"2024-05-02\",\"B\",\"100\",\"bus\"\n\
             \"2024-05-03\",\"A\",\"50\",\"coffee\"\n"
        );
    }

    #[test]
    fn test_line_count_is_rows_plus_header() {
        let export = export_csv("trip", &sample(), Some("A")).unwrap();
        assert_eq!(export.filename, "trip_A_memos.csv");
        assert_eq!(export.rows, 2);
        assert_eq!(export.text().lines().count(), export.rows + 1);
    }

    #[test]
    fn test_category_column_when_present() {
        let mut entries = sample();
        entries[1].category = Some("交通費".into());
        let text = export_csv("trip", &entries, None).unwrap().text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("日付,支払い者,カテゴリ,金額,メモ"));
        assert_eq!(lines.next(), Some(r#""2024-05-01","A","","300","lunch""#));
        assert_eq!(lines.next(), Some(r#""2024-05-02","B","交通費","100","bus""#));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let entries = vec![LedgerEntry::new("2024-05-01", "A", 1).with_text(r#"say "hi", ok"#)];
        let text = export_csv("p", &entries, None).unwrap().text();
        assert!(text.ends_with("\"say \"\"hi\"\", ok\"\n"));
    }

    #[test]
    fn test_nothing_to_export() {
        assert!(matches!(export_csv("p", &[], None), Err(DomainError::InvalidInput(_))));
        assert!(export_csv("p", &sample(), Some("Z")).is_err());
    }
}
