use serde::{Deserialize, Serialize};

/// フィールド定義（/rest/api/2/field の1件）
///
/// 見積もりフィールドが解決できなかったときの診断出力に使うため、
/// id/name対と種別情報だけを保持する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<FieldSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(rename = "customId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<u64>,
}

impl Field {
    /// カスタムフィールドかどうか
    pub fn is_custom(&self) -> bool {
        self.custom.unwrap_or(false)
    }
}
