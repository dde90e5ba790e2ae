use serde_json::Value;

use crate::error::{Error, Result};

/// ページ分割されたAPIレスポンスの1ページ分
///
/// 検索APIは課題を"issues"配列で、Agile APIはスプリント等を"values"配列で
/// 返す。どちらも同じページング規約（startAt / maxResults / total）に従う。
#[derive(Debug, Clone)]
pub struct Page {
    /// レスポンスが申告した総件数（申告しないエンドポイントもある）
    pub total: Option<u64>,
    /// このページに含まれる生のレコード
    pub items: Vec<Value>,
}

impl Page {
    /// 検索APIのレスポンスからページを取り出す（itemsキーは"issues"）
    pub fn of_issues(response: Value) -> Result<Self> {
        Self::from_response(response, "issues")
    }

    /// Agile APIのレスポンスからページを取り出す（itemsキーは"values"）
    pub fn of_values(response: Value) -> Result<Self> {
        Self::from_response(response, "values")
    }

    fn from_response(mut response: Value, items_key: &str) -> Result<Self> {
        let total = response.get("total").and_then(|t| t.as_u64());

        let items = match response.get_mut(items_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidData(format!(
                    "No {} array in page response",
                    items_key
                )));
            }
        };

        Ok(Self { total, items })
    }

    /// ページにレコードが1件も含まれないかどうか
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// ページに含まれるレコード数
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
