use serde_json::Value;

use crate::client::JiraClient;
use crate::error::{Error, Result};
use crate::models::{BoardDescriptor, Page};
use crate::pager;

/// 設定された候補フィールドから課題の見積もり値を解決する
///
/// 候補を宣言順に走査し、最初に見つかった非nullの値を返す。候補キーが
/// 存在するのに値がnullの場合は「見積もり未記入」なので次の候補へ進み、
/// 全候補がnullならNoneを返す。候補キーが1つも存在しない課題はフィールド
/// 構成の不一致を意味するためエラーにする（静かにnull列を量産しない）。
pub fn resolve_estimate(fields: &Value, candidates: &[String]) -> Result<Option<Value>> {
    let mut seen = false;

    for candidate in candidates {
        if let Some(value) = fields.get(candidate) {
            seen = true;
            if !value.is_null() {
                return Ok(Some(value.clone()));
            }
        }
    }

    if seen {
        Ok(None)
    } else {
        Err(Error::EstimateFieldUnresolved {
            candidates: candidates.to_vec(),
        })
    }
}

/// ボード名解決の結果
#[derive(Debug, Clone, PartialEq)]
pub enum BoardResolution {
    /// 一意に解決できた
    Resolved(BoardDescriptor),
    /// 名前は一致しなかったが、プロジェクトから正しいボード名を1つ推定できた
    SuggestedName(BoardDescriptor),
    /// 候補が複数残った（または1件も該当しなかった）
    Ambiguous(Vec<BoardDescriptor>),
}

impl BoardResolution {
    /// 解決結果をボード1件へ確定する
    ///
    /// 曖昧さが残っている場合は、候補一覧を本文に含む説明付きの
    /// エラーへ変換する。
    pub fn into_board(self, name: &str, project: &str) -> Result<BoardDescriptor> {
        match self {
            BoardResolution::Resolved(board) => Ok(board),
            BoardResolution::SuggestedName(board) => Err(Error::BoardUnresolved(format!(
                "no board named '{}' found; project '{}' has exactly one plannable board. Did you mean '{}'?",
                name, project, board.name
            ))),
            BoardResolution::Ambiguous(candidates) if candidates.is_empty() => {
                Err(Error::BoardUnresolved(format!(
                    "no scrum or simple board matches '{}' for project '{}'",
                    name, project
                )))
            }
            BoardResolution::Ambiguous(candidates) => Err(Error::BoardUnresolved(format!(
                "board '{}' did not match exactly. Candidates for project '{}':\n{}",
                name,
                project,
                format_candidates(&candidates)
            ))),
        }
    }
}

/// 人間が指定したボード名とプロジェクト識別子からボードを解決する
///
/// ボード一覧を全ページ取得したうえで、次の順に照合する。
///   1. ボード名の完全一致
///   2. プロジェクト表示名の一致がちょうど1件なら、そのボード名を提案
///   3. プロジェクトキー（大文字小文字を無視）で候補を絞り込み、
///      1件に絞れたら解決、絞れなければ候補一覧つきでAmbiguous
///
/// ボード一覧が途中までしか取れなかった場合、見えていない候補がある状態で
/// 推測するのは危険なのでエラーにする。
pub async fn resolve_board(
    client: &JiraClient,
    name: &str,
    project: &str,
    page_size: u32,
) -> Result<BoardResolution> {
    let fetched = pager::fetch_all(
        client,
        &JiraClient::boards_endpoint(),
        page_size,
        None,
        Page::of_values,
        async |raw| {
            Ok(match BoardDescriptor::from_value(&raw)? {
                Some(board) => vec![board],
                None => Vec::new(),
            })
        },
    )
    .await?;

    if !fetched.complete {
        return Err(Error::BoardUnresolved(
            "the board list could not be fetched completely, refusing to pick from partial candidates".to_string(),
        ));
    }

    Ok(disambiguate(fetched.records, name, project))
}

fn disambiguate(boards: Vec<BoardDescriptor>, name: &str, project: &str) -> BoardResolution {
    // ボード名の完全一致
    if let Some(board) = boards.iter().find(|b| b.name == name) {
        return BoardResolution::Resolved(board.clone());
    }

    // プロジェクト表示名でちょうど1件に定まるなら、正しいボード名を提案できる
    let by_project_name: Vec<&BoardDescriptor> = boards
        .iter()
        .filter(|b| b.project_name.as_deref() == Some(project))
        .collect();
    if by_project_name.len() == 1 {
        return BoardResolution::SuggestedName(by_project_name[0].clone());
    }

    // プロジェクトキーで絞り込む（キーの大文字小文字は揺れやすい）
    let by_key: Vec<BoardDescriptor> = boards
        .iter()
        .filter(|b| {
            b.project_key
                .as_deref()
                .is_some_and(|k| k.eq_ignore_ascii_case(project))
        })
        .cloned()
        .collect();
    if by_key.len() == 1 {
        return BoardResolution::Resolved(by_key[0].clone());
    }

    if by_key.is_empty() {
        BoardResolution::Ambiguous(boards)
    } else {
        BoardResolution::Ambiguous(by_key)
    }
}

/// 候補ボードの一覧を人間が読める表に整形する
pub fn format_candidates(candidates: &[BoardDescriptor]) -> String {
    let mut table = String::from("  id / name / projectKey / projectName / type\n");
    for board in candidates {
        table.push_str(&format!(
            "  {} / {} / {} / {} / {}\n",
            board.id,
            board.name,
            board.project_key.as_deref().unwrap_or("-"),
            board.project_name.as_deref().unwrap_or("-"),
            board.board_type,
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_estimate_first_non_null_wins() {
        let fields = json!({
            "customfield_10016": 5,
            "customfield_10026": 8
        });
        let candidates = vec![
            "customfield_10016".to_string(),
            "customfield_10026".to_string(),
        ];

        let points = resolve_estimate(&fields, &candidates).unwrap();

        assert_eq!(points, Some(json!(5)));
    }

    #[test]
    fn test_resolve_estimate_null_candidate_continues_scan() {
        let fields = json!({
            "customfield_10016": null,
            "customfield_10026": 8
        });
        let candidates = vec![
            "customfield_10016".to_string(),
            "customfield_10026".to_string(),
        ];

        let points = resolve_estimate(&fields, &candidates).unwrap();

        assert_eq!(points, Some(json!(8)));
    }

    #[test]
    fn test_resolve_estimate_all_null_is_none() {
        let fields = json!({
            "customfield_10016": null
        });
        let candidates = vec![
            "customfield_10016".to_string(),
            "customfield_10026".to_string(),
        ];

        let points = resolve_estimate(&fields, &candidates).unwrap();

        assert_eq!(points, None);
    }

    #[test]
    fn test_resolve_estimate_absent_everywhere_is_error() {
        let fields = json!({
            "summary": "no estimates here"
        });
        let candidates = vec!["customfield_10016".to_string()];

        let result = resolve_estimate(&fields, &candidates);

        assert!(result.is_err());
        match result.unwrap_err() {
            Error::EstimateFieldUnresolved { candidates } => {
                assert_eq!(candidates, vec!["customfield_10016".to_string()]);
            }
            _ => panic!("Expected EstimateFieldUnresolved error"),
        }
    }

    #[test]
    fn test_resolve_estimate_empty_candidates_is_error() {
        let fields = json!({ "summary": "anything" });

        let result = resolve_estimate(&fields, &[]);

        assert!(result.is_err());
    }

    fn board(id: u64, name: &str, key: Option<&str>, project_name: Option<&str>) -> BoardDescriptor {
        BoardDescriptor {
            id,
            name: name.to_string(),
            board_type: "scrum".to_string(),
            project_key: key.map(|k| k.to_string()),
            project_name: project_name.map(|n| n.to_string()),
        }
    }

    #[test]
    fn test_disambiguate_exact_name_match() {
        let boards = vec![
            board(1, "CAR board", Some("CAR"), Some("Car Rental")),
            board(2, "Ops board", Some("OPS"), Some("Operations")),
        ];

        let resolution = disambiguate(boards, "Ops board", "OPS");

        match resolution {
            BoardResolution::Resolved(b) => assert_eq!(b.id, 2),
            _ => panic!("Expected Resolved"),
        }
    }

    #[test]
    fn test_disambiguate_suggests_name_from_project() {
        let boards = vec![
            board(1, "CAR board", Some("CAR"), Some("Car Rental")),
            board(2, "Ops board", Some("OPS"), Some("Operations")),
        ];

        let resolution = disambiguate(boards, "Car Rental Board", "Car Rental");

        match resolution {
            BoardResolution::SuggestedName(b) => assert_eq!(b.name, "CAR board"),
            _ => panic!("Expected SuggestedName"),
        }
    }

    #[test]
    fn test_disambiguate_project_key_narrows_to_one() {
        // 同じプロジェクト表示名のボードが複数あっても、キーで1件に絞れる
        let boards = vec![
            board(10, "Checkout Scrum", Some("CHK"), Some("Checkout")),
            board(11, "Checkout Support", Some("CHKS"), Some("Checkout")),
        ];

        let resolution = disambiguate(boards, "Sprint Board", "CHK");

        match resolution {
            BoardResolution::Resolved(b) => {
                assert_eq!(b.id, 10);
                assert_eq!(b.project_key, Some("CHK".to_string()));
            }
            _ => panic!("Expected Resolved"),
        }
    }

    #[test]
    fn test_disambiguate_project_key_is_case_insensitive() {
        let boards = vec![board(10, "Checkout Scrum", Some("CHK"), Some("Checkout"))];

        let resolution = disambiguate(boards, "whatever", "chk");

        match resolution {
            BoardResolution::Resolved(b) => assert_eq!(b.id, 10),
            _ => panic!("Expected Resolved"),
        }
    }

    #[test]
    fn test_disambiguate_multiple_key_matches_stay_ambiguous() {
        let boards = vec![
            board(20, "Team A", Some("CAR"), Some("Car Rental")),
            board(21, "Team B", Some("CAR"), Some("Car Rental")),
        ];

        let resolution = disambiguate(boards, "no such board", "CAR");

        match resolution {
            BoardResolution::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
            _ => panic!("Expected Ambiguous"),
        }
    }

    #[test]
    fn test_disambiguate_no_key_match_falls_back_to_all() {
        let boards = vec![
            board(1, "CAR board", Some("CAR"), Some("Car Rental")),
            board(2, "Ops board", Some("OPS"), Some("Operations")),
            board(3, "Data board", Some("DATA"), Some("Data Platform")),
        ];

        let resolution = disambiguate(boards, "no such board", "XYZ");

        match resolution {
            BoardResolution::Ambiguous(candidates) => assert_eq!(candidates.len(), 3),
            _ => panic!("Expected Ambiguous"),
        }
    }

    #[test]
    fn test_into_board_resolved() {
        let resolution = BoardResolution::Resolved(board(5, "CAR board", Some("CAR"), None));

        let resolved = resolution.into_board("CAR board", "CAR").unwrap();

        assert_eq!(resolved.id, 5);
    }

    #[test]
    fn test_into_board_suggestion_message() {
        let resolution = BoardResolution::SuggestedName(board(5, "CAR board", Some("CAR"), None));

        let result = resolution.into_board("Car Board", "Car Rental");

        assert!(result.is_err());
        match result.unwrap_err() {
            Error::BoardUnresolved(msg) => {
                assert!(msg.contains("Did you mean 'CAR board'?"));
            }
            _ => panic!("Expected BoardUnresolved error"),
        }
    }

    #[test]
    fn test_into_board_ambiguous_lists_candidates() {
        let resolution = BoardResolution::Ambiguous(vec![
            board(20, "Team A", Some("CAR"), Some("Car Rental")),
            board(21, "Team B", Some("CAR"), Some("Car Rental")),
        ]);

        let result = resolution.into_board("wrong name", "CAR");

        assert!(result.is_err());
        match result.unwrap_err() {
            Error::BoardUnresolved(msg) => {
                assert!(msg.contains("Team A"));
                assert!(msg.contains("Team B"));
                assert!(msg.contains("projectKey"));
            }
            _ => panic!("Expected BoardUnresolved error"),
        }
    }

    #[test]
    fn test_into_board_empty_candidates_message() {
        let resolution = BoardResolution::Ambiguous(Vec::new());

        let result = resolution.into_board("any", "ANY");

        assert!(result.is_err());
        match result.unwrap_err() {
            Error::BoardUnresolved(msg) => {
                assert!(msg.contains("no scrum or simple board"));
            }
            _ => panic!("Expected BoardUnresolved error"),
        }
    }

    #[test]
    fn test_format_candidates_header_and_rows() {
        let table = format_candidates(&[board(1, "CAR board", Some("CAR"), Some("Car Rental"))]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("projectKey"));
        assert!(lines[1].contains("CAR board"));
        assert!(lines[1].contains("scrum"));
    }
}
