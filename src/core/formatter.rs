use crate::domain::model::OutboundMessage;
use chrono::{Datelike, NaiveDate};

/// Chatwork 的 info 區塊，標題固定
pub const TITLE: &str = "日付変更";

/// 訊息原樣嵌入，不跳脫 Chatwork 標記
pub fn format(message: &str, date: NaiveDate) -> OutboundMessage {
    OutboundMessage::new(format!(
        "[info][title]{}[/title]今日は{}月{}日！\n{}[/info]",
        TITLE,
        date.month(),
        date.day(),
        message
    ))
}
