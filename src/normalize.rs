use serde_json::Value;

use crate::discovery;
use crate::error::{Error, Result};
use crate::models::{IssueRecord, SprintRecord, TransitionRecord};

/// 生のAPIレコードをフラットなレコードへ写像する正規化器
pub struct Normalizer;

impl Normalizer {
    /// 課題1件の生レコードをIssueRecordへ正規化する
    ///
    /// priorityとassigneeは未設定の課題が普通に存在するため、欠けていても
    /// nullとして受け入れる。key / created / status / issuetypeの欠落は
    /// スキーマ不一致としてエラーを返す。
    pub fn issue(raw: &Value, estimate_fields: &[String]) -> Result<IssueRecord> {
        let id = raw
            .get("key")
            .and_then(|k| k.as_str())
            .ok_or_else(|| Error::InvalidData("Missing issue key in record".to_string()))?;

        let fields = raw
            .get("fields")
            .ok_or_else(|| Error::InvalidData(format!("Missing fields object for issue {}", id)))?;

        let created = fields
            .get("created")
            .and_then(|c| c.as_str())
            .ok_or_else(|| Error::InvalidData(format!("Missing created timestamp for issue {}", id)))?;

        let status = fields
            .get("status")
            .and_then(|s| s.get("name"))
            .and_then(|n| n.as_str())
            .ok_or_else(|| Error::InvalidData(format!("Missing status name for issue {}", id)))?;

        let issue_type = fields
            .get("issuetype")
            .and_then(|t| t.get("name"))
            .and_then(|n| n.as_str())
            .ok_or_else(|| Error::InvalidData(format!("Missing issue type for issue {}", id)))?;

        // priorityはオブジェクトごと欠けるか、nullで返ることがある
        let priority = fields.get("priority").filter(|p| !p.is_null());

        let assignee = fields
            .get("assignee")
            .and_then(|a| a.get("displayName"))
            .and_then(|n| n.as_str());

        let points = discovery::resolve_estimate(fields, estimate_fields)?;

        Ok(IssueRecord {
            id: id.to_string(),
            created: created.to_string(),
            status: status.to_string(),
            priority: priority
                .and_then(|p| p.get("id"))
                .and_then(|i| i.as_str())
                .map(|s| s.to_string()),
            priority_name: priority
                .and_then(|p| p.get("name"))
                .and_then(|n| n.as_str())
                .map(|s| s.to_string()),
            issue_type: issue_type.to_string(),
            points,
            assignee: assignee.map(|s| s.to_string()),
        })
    }

    /// 課題1件の変更履歴からステータス遷移の行を取り出す
    ///
    /// 履歴エントリ1件には複数フィールドの変更が混在しうるため、全change
    /// アイテムを走査してfieldが"status"のものを探す。ステータス変更を
    /// 含むエントリ1件につき1行を返し、変更が1つもない課題は空のベクタに
    /// なる（エラーではない）。
    pub fn transitions(raw: &Value) -> Result<Vec<TransitionRecord>> {
        let issue = raw
            .get("key")
            .and_then(|k| k.as_str())
            .ok_or_else(|| Error::InvalidData("Missing issue key in record".to_string()))?;

        let histories = raw
            .get("changelog")
            .and_then(|c| c.get("histories"))
            .and_then(|h| h.as_array())
            .ok_or_else(|| {
                Error::InvalidData(format!("No changelog histories for issue {}", issue))
            })?;

        let mut transitions = Vec::new();

        for entry in histories {
            let status_item = entry
                .get("items")
                .and_then(|i| i.as_array())
                .and_then(|items| {
                    items.iter().find(|item| {
                        item.get("field").and_then(|f| f.as_str()) == Some("status")
                    })
                });

            if let Some(item) = status_item {
                transitions.push(TransitionRecord {
                    issue: issue.to_string(),
                    from: item
                        .get("fromString")
                        .and_then(|f| f.as_str())
                        .map(|s| s.to_string()),
                    to: item
                        .get("toString")
                        .and_then(|t| t.as_str())
                        .map(|s| s.to_string()),
                    date: entry
                        .get("created")
                        .and_then(|c| c.as_str())
                        .map(|s| s.to_string()),
                });
            }
        }

        Ok(transitions)
    }

    /// スプリント1件の生レコードを、取得済みの所属課題キーと合わせて正規化する
    ///
    /// 開始前のスプリントはstartDate / endDateを持たないので全フィールドが
    /// 欠けていてもよい。課題キーはセミコロンで連結する。
    pub fn sprint(raw: &Value, issue_keys: &[String]) -> SprintRecord {
        SprintRecord {
            name: raw.get("name").and_then(|n| n.as_str()).map(|s| s.to_string()),
            start: raw
                .get("startDate")
                .and_then(|d| d.as_str())
                .map(|s| s.to_string()),
            end: raw
                .get("endDate")
                .and_then(|d| d.as_str())
                .map(|s| s.to_string()),
            state: raw.get("state").and_then(|s| s.as_str()).map(|s| s.to_string()),
            issues: issue_keys.join(";"),
        }
    }

    /// スプリントの生レコードからid（ネストした課題取得に必要）を取り出す
    pub fn sprint_id(raw: &Value) -> Result<u64> {
        raw.get("id")
            .and_then(|id| id.as_u64())
            .ok_or_else(|| Error::InvalidData("Missing sprint id in record".to_string()))
    }

    /// スプリント配下の課題レコードからキーだけを取り出す
    pub fn issue_key(raw: &Value) -> Result<String> {
        raw.get("key")
            .and_then(|k| k.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::InvalidData("Missing issue key in sprint issue".to_string()))
    }
}
