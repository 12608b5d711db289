use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::NoticeError;

/// 月/日 的比較單位，年份不參與比較
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateKey {
    month: u32,
    day: u32,
}

impl DateKey {
    /// 超出 1-12 / 1-31 範圍時回傳 None
    pub fn new(month: u32, day: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            Some(Self { month, day })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

// 標準文字形式: "3/5"，不補零
impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.day)
    }
}

/// 日期儲存格正規化的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Key(DateKey),
    /// 無法解析的儲存格，保留其文字；永遠不會匹配任何日期
    Unparsable(String),
}

impl Normalized {
    pub fn key(&self) -> Option<DateKey> {
        match self {
            Normalized::Key(key) => Some(*key),
            Normalized::Unparsable(_) => None,
        }
    }

    /// 比較用的標準字串
    pub fn canonical(&self) -> String {
        match self {
            Normalized::Key(key) => key.to_string(),
            Normalized::Unparsable(text) => text.clone(),
        }
    }

    pub fn matches(&self, target: &DateKey) -> bool {
        match self {
            Normalized::Key(key) => key.to_string() == target.to_string(),
            Normalized::Unparsable(_) => false,
        }
    }
}

/// 資料表的一列，所有儲存格在讀入時都轉成文字
pub type RawRow = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMessage {
    pub text: String,
    pub matched_key: DateKey,
}

/// 送往聊天室的最終文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage(String);

impl OutboundMessage {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Fetch,
    Deliver,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Fetch => f.write_str("fetch"),
            RunStage::Deliver => f.write_str("deliver"),
        }
    }
}

/// 一次執行的結果
#[derive(Debug)]
pub enum Outcome {
    Sent {
        message: ResolvedMessage,
        receipt: DeliveryReceipt,
    },
    NotFound,
    Failed {
        stage: RunStage,
        error: NoticeError,
    },
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Outcome::Sent { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Sent { .. } => "sent",
            Outcome::NotFound => "not_found",
            Outcome::Failed { .. } => "failed",
        }
    }
}
