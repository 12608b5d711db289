use crate::domain::model::{DeliveryReceipt, RawRow};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 日期/訊息兩欄的外部資料表
#[async_trait]
pub trait RowSource: Send + Sync {
    /// 讀取 `range` 範圍內的所有列；沒有資料時回傳空陣列，認證或網路錯誤回傳 Err
    async fn fetch_rows(&self, range: &str) -> Result<Vec<RawRow>>;

    fn describe(&self) -> String;
}

/// 訊息送達的聊天頻道
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, text: &str) -> Result<DeliveryReceipt>;
}

#[async_trait]
impl<T: RowSource + ?Sized> RowSource for Box<T> {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<RawRow>> {
        (**self).fetch_rows(range).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<T: DeliveryChannel + ?Sized> DeliveryChannel for Box<T> {
    async fn send(&self, text: &str) -> Result<DeliveryReceipt> {
        (**self).send(text).await
    }
}
