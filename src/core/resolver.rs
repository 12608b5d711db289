use crate::core::normalizer::{normalize, target_key};
use crate::core::table::MessageTable;
use crate::domain::model::ResolvedMessage;
use chrono::NaiveDate;

/// 線性掃描，回傳第一個日期相符的列的訊息；之後的列不再檢查
pub fn resolve(table: &MessageTable, target: NaiveDate) -> Option<ResolvedMessage> {
    let key = target_key(target).key()?;

    for (date_cell, message) in table.entries() {
        let cell = normalize(date_cell);
        if cell.matches(&key) {
            tracing::debug!("Matched row '{}' for {}", date_cell, key);
            return Some(ResolvedMessage {
                text: message.to_string(),
                matched_key: key,
            });
        }
    }

    tracing::debug!(
        "No row matched {} ({} data rows scanned)",
        key,
        table.len()
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RawRow;

    fn table(data: &[&[&str]]) -> MessageTable {
        let rows: Vec<RawRow> = data
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        MessageTable::from_raw_rows(rows)
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let table = table(&[&["date", "message"], &["3/5", "Hello"], &["3/5", "World"]]);
        let resolved = resolve(&table, march(5)).unwrap();
        assert_eq!(resolved.text, "Hello");
        assert_eq!(resolved.matched_key.to_string(), "3/5");
    }

    #[test]
    fn test_no_match_returns_none() {
        let table = table(&[&["3/5", "Hello"]]);
        assert!(resolve(&table, march(6)).is_none());
    }

    #[test]
    fn test_mixed_formats_match() {
        let table = table(&[
            &["2024/3/4", "yesterday"],
            &["2023-03-05", "iso"],
            &["3/5", "plain"],
        ]);
        assert_eq!(resolve(&table, march(5)).unwrap().text, "iso");
        assert_eq!(resolve(&table, march(4)).unwrap().text, "yesterday");
    }

    #[test]
    fn test_month_name_without_year_matches() {
        let table = table(&[&["March 4", "yesterday"], &["March 5", "Hello"]]);
        let resolved = resolve(&table, march(5)).unwrap();
        assert_eq!(resolved.text, "Hello");
        assert_eq!(resolved.matched_key.to_string(), "3/5");
    }

    #[test]
    fn test_bad_rows_do_not_abort_lookup() {
        let table = table(&[
            &["not a date", "x"],
            &["13/45", "y"],
            &["3/5"],
            &["", "z"],
            &["03/05", "found"],
        ]);
        assert_eq!(resolve(&table, march(5)).unwrap().text, "found");
    }

    #[test]
    fn test_message_text_is_untouched() {
        let table = table(&[&["3/5", "  [b]raw[/b] text \n"]]);
        assert_eq!(resolve(&table, march(5)).unwrap().text, "  [b]raw[/b] text \n");
    }
}
