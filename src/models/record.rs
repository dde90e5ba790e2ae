use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CSVの1行として書き出せるフラットなレコード
///
/// 列の集合と順序は型ごとに固定で、全レコードが同じスキーマを共有する。
pub trait Tabular {
    /// ヘッダー行となる列名（宣言順）
    fn columns() -> &'static [&'static str];
    /// 1行分のセル値（Noneのフィールドは空文字列）
    fn row(&self) -> Vec<String>;
}

/// 正規化済みの課題レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// 課題キー（例: "CAR-1024"）
    pub id: String,
    /// 作成日時（サービスが返した文字列のまま）
    pub created: String,
    /// 現在のステータス名
    pub status: String,
    /// 優先度ID（優先度が未設定ならnull）
    pub priority: Option<String>,
    /// 優先度の表示名（優先度が未設定ならnull）
    pub priority_name: Option<String>,
    /// 課題種別名
    #[serde(rename = "type")]
    pub issue_type: String,
    /// 見積もり値（数値でも文字列でもそのまま保持、未設定ならnull）
    pub points: Option<Value>,
    /// 担当者の表示名（未割り当てならnull）
    pub assignee: Option<String>,
}

impl Tabular for IssueRecord {
    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "created",
            "status",
            "priority",
            "priority_name",
            "type",
            "points",
            "assignee",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.created.clone(),
            self.status.clone(),
            self.priority.clone().unwrap_or_default(),
            self.priority_name.clone().unwrap_or_default(),
            self.issue_type.clone(),
            self.points.as_ref().map(cell_value).unwrap_or_default(),
            self.assignee.clone().unwrap_or_default(),
        ]
    }
}

/// 課題1件のステータス遷移1回分のレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// 課題キー
    pub issue: String,
    /// 遷移前のステータス名
    pub from: Option<String>,
    /// 遷移後のステータス名
    pub to: Option<String>,
    /// 遷移が起きた日時
    pub date: Option<String>,
}

impl Tabular for TransitionRecord {
    fn columns() -> &'static [&'static str] {
        &["issue", "from", "to", "date"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.issue.clone(),
            self.from.clone().unwrap_or_default(),
            self.to.clone().unwrap_or_default(),
            self.date.clone().unwrap_or_default(),
        ]
    }
}

/// スプリント1件と所属課題キーのレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintRecord {
    /// スプリント名
    pub name: Option<String>,
    /// 開始日時
    pub start: Option<String>,
    /// 終了日時
    pub end: Option<String>,
    /// 状態（future / active / closed）
    pub state: Option<String>,
    /// 所属する課題キーをセミコロンで連結した文字列
    pub issues: String,
}

impl Tabular for SprintRecord {
    fn columns() -> &'static [&'static str] {
        &["name", "start", "end", "state", "issues"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone().unwrap_or_default(),
            self.start.clone().unwrap_or_default(),
            self.end.clone().unwrap_or_default(),
            self.state.clone().unwrap_or_default(),
            self.issues.clone(),
        ]
    }
}

/// JSON値をCSVセル用の文字列へ変換する
///
/// 文字列は引用符なしの中身そのまま、それ以外（数値など）はJSON表現を使う。
fn cell_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
