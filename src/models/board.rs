use serde_json::Value;

use crate::error::{Error, Result};

/// スプリント計画に使えるボード種別
const PLANNABLE_BOARD_TYPES: [&str; 2] = ["scrum", "simple"];

/// Agile APIのボード1件を平坦化した記述子
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDescriptor {
    pub id: u64,
    pub name: String,
    pub board_type: String,
    pub project_key: Option<String>,
    pub project_name: Option<String>,
}

impl BoardDescriptor {
    /// ボード1件の生レスポンスから記述子を作る
    ///
    /// スプリントを持たない種別（kanban等）のボードは候補にならないため
    /// Noneを返す。候補となる種別でid/nameが欠けている場合はエラー。
    pub fn from_value(raw: &Value) -> Result<Option<Self>> {
        let board_type = raw.get("type").and_then(|t| t.as_str()).unwrap_or_default();
        if !PLANNABLE_BOARD_TYPES.contains(&board_type) {
            return Ok(None);
        }

        let id = raw
            .get("id")
            .and_then(|id| id.as_u64())
            .ok_or_else(|| Error::InvalidData("Missing board id".to_string()))?;

        let name = raw
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| Error::InvalidData("Missing board name".to_string()))?;

        let location = raw.get("location");
        let project_key = location
            .and_then(|l| l.get("projectKey"))
            .and_then(|k| k.as_str())
            .map(|s| s.to_string());
        let project_name = location
            .and_then(|l| l.get("projectName"))
            .and_then(|n| n.as_str())
            .map(|s| s.to_string());

        Ok(Some(Self {
            id,
            name: name.to_string(),
            board_type: board_type.to_string(),
            project_key,
            project_name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_board_from_value_scrum() {
        let raw = json!({
            "id": 42,
            "name": "CAR board",
            "type": "scrum",
            "location": {
                "projectKey": "CAR",
                "projectName": "Car Rental"
            }
        });

        let board = BoardDescriptor::from_value(&raw).unwrap().unwrap();

        assert_eq!(board.id, 42);
        assert_eq!(board.name, "CAR board");
        assert_eq!(board.board_type, "scrum");
        assert_eq!(board.project_key, Some("CAR".to_string()));
        assert_eq!(board.project_name, Some("Car Rental".to_string()));
    }

    #[test]
    fn test_board_from_value_skips_kanban() {
        let raw = json!({
            "id": 7,
            "name": "Ops kanban",
            "type": "kanban"
        });

        let board = BoardDescriptor::from_value(&raw).unwrap();

        assert!(board.is_none());
    }

    #[test]
    fn test_board_from_value_accepts_simple() {
        let raw = json!({
            "id": 9,
            "name": "Team board",
            "type": "simple"
        });

        let board = BoardDescriptor::from_value(&raw).unwrap().unwrap();

        assert_eq!(board.board_type, "simple");
        assert_eq!(board.project_key, None);
        assert_eq!(board.project_name, None);
    }

    #[test]
    fn test_board_from_value_missing_type_skipped() {
        let raw = json!({
            "id": 3,
            "name": "Nameless type"
        });

        assert!(BoardDescriptor::from_value(&raw).unwrap().is_none());
    }

    #[test]
    fn test_board_from_value_missing_id_is_error() {
        let raw = json!({
            "name": "Broken board",
            "type": "scrum"
        });

        let result = BoardDescriptor::from_value(&raw);

        assert!(result.is_err());
        match result.unwrap_err() {
            Error::InvalidData(msg) => assert!(msg.contains("board id")),
            _ => panic!("Expected InvalidData error"),
        }
    }
}
