use crate::domain::model::RawRow;

/// 表頭關鍵字（英文、日文）
const HEADER_MARKERS: &[&str] = &["date", "日付"];

/// 一次查找用的資料列，已去除可能存在的表頭
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    rows: Vec<RawRow>,
    header: Option<RawRow>,
}

impl MessageTable {
    /// 只檢查第一列的第一個儲存格
    pub fn from_raw_rows(mut rows: Vec<RawRow>) -> Self {
        let header = match rows.first() {
            Some(first) if is_header_row(first) => Some(rows.remove(0)),
            _ => None,
        };
        Self { rows, header }
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn header(&self) -> Option<&RawRow> {
        self.header.as_ref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 至少有日期與訊息兩欄的列
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows
            .iter()
            .filter(|row| row.len() >= 2)
            .map(|row| (row[0].as_str(), row[1].as_str()))
    }
}

fn is_header_row(row: &RawRow) -> bool {
    let Some(cell) = row.first() else {
        return false;
    };
    if cell.is_empty() {
        return false;
    }
    let lowered = cell.to_lowercase();
    HEADER_MARKERS.iter().any(|marker| lowered.contains(marker))
}
