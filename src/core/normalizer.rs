//! 日期儲存格正規化
//!
//! 試算表裡的日期格式不一：`3/5`、`2024/3/5`、`2024-03-05`、`March 5, 2024`、
//! `3月5日` 等。這裡把它們統一成 [`DateKey`]（月/日），無法解析的儲存格變成
//! [`Normalized::Unparsable`]，比對時一律不匹配，不會中斷整個查找。
//!
//! 本模組是純函式，沒有任何 I/O。

use crate::domain::model::{DateKey, Normalized};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

// 沒有年份的寫法，例如 "March 5"、"5 Mar"；補上閏年才能接受 "Feb 29"
const YEARLESS_FORMATS: &[&str] = &["%B %d %Y", "%b %d %Y", "%d %B %Y", "%d %b %Y"];
const PLACEHOLDER_LEAP_YEAR: i32 = 2000;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

static JAPANESE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{4}\s*年)?\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日$").expect("valid regex")
});

pub fn normalize(input: &str) -> Normalized {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Normalized::Unparsable(String::new());
    }

    if trimmed.contains('/') {
        let parts: Vec<&str> = trimmed.split('/').collect();
        match parts.as_slice() {
            [a, b, c] => return normalize_three_parts(trimmed, a, b, c),
            [month, day] => {
                return month_day(trimmed, leading_number(month), leading_number(day))
            }
            // 其他段數交給一般日期解析
            _ => {}
        }
    }

    if let Some(date) = parse_calendar_date(trimmed) {
        return Normalized::Key(DateKey::from_date(date));
    }

    if let Some(caps) = JAPANESE_DATE.captures(trimmed) {
        return month_day(
            trimmed,
            leading_number(&caps[1]),
            leading_number(&caps[2]),
        );
    }

    Normalized::Unparsable(trimmed.to_string())
}

/// 今天的比較鍵：先格式化成 "月/日" 再走同一條正規化路徑
pub fn target_key(date: NaiveDate) -> Normalized {
    let key = DateKey::from_date(date);
    normalize(&key.to_string())
}

// A/B/C：A 是四位數年份時取 (B, C)；否則沿用 (A, B)。
// 後者無法從順序判斷格式，保持這個固定的退路，不另做推測。
fn normalize_three_parts(text: &str, a: &str, b: &str, c: &str) -> Normalized {
    match leading_number(a) {
        Some(year) if year >= 1000 => month_day(text, leading_number(b), leading_number(c)),
        first => month_day(text, first, leading_number(b)),
    }
}

fn month_day(text: &str, month: Option<u32>, day: Option<u32>) -> Normalized {
    match (month, day) {
        (Some(month), Some(day)) => match DateKey::new(month, day) {
            Some(key) => Normalized::Key(key),
            // 超出範圍：保留 "月/日" 文字，比對時自然不會命中
            None => Normalized::Unparsable(format!("{}/{}", month, day)),
        },
        _ => Normalized::Unparsable(text.to_string()),
    }
}

/// 取開頭的十進位數字，例如 `" 5日"` -> 5
fn leading_number(part: &str) -> Option<u32> {
    let part = part.trim();
    let end = part
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
        .or_else(|| parse_yearless_date(text))
}

fn parse_yearless_date(text: &str) -> Option<NaiveDate> {
    let with_year = format!("{} {}", text.trim_end_matches(','), PLACEHOLDER_LEAP_YEAR);
    YEARLESS_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&with_year, fmt).ok())
}
