use tracing::{error, info};

use crate::client::JiraClient;
use crate::discovery;
use crate::error::{Error, Result};
use crate::models::{BoardDescriptor, IssueRecord, Page, SprintRecord, TransitionRecord};
use crate::normalize::Normalizer;
use crate::pager::{self, FetchResult};

/// 抽出処理の設定
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// 1ページあたりの取得件数
    pub page_size: u32,
    /// 見積もりフィールドの候補ID（優先順）
    pub estimate_fields: Vec<String>,
    /// 取得ページ数の上限（Noneなら終了条件に達するまで取得する）
    pub max_pages: Option<u32>,
}

impl ExtractOptions {
    /// デフォルト設定で新しいExtractOptionsを作成
    pub fn new() -> Self {
        Self {
            page_size: 50,
            estimate_fields: vec![
                "customfield_10016".to_string(),
                "customfield_10026".to_string(),
            ],
            max_pages: None,
        }
    }

    /// ページサイズを設定
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// 見積もりフィールドの候補を設定
    pub fn estimate_fields(mut self, fields: Vec<String>) -> Self {
        self.estimate_fields = fields;
        self
    }

    /// 取得ページ数の上限を設定
    pub fn max_pages(mut self, limit: u32) -> Self {
        self.max_pages = Some(limit);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// データセット単位の抽出操作
///
/// すべての操作は逐次実行で、送信中のリクエストは常に1つだけ。スプリントの
/// ネストした課題取得も外側のページ処理の中で順番にawaitされる。
#[derive(Debug, Clone)]
pub struct Extractor {
    /// APIクライアント
    client: JiraClient,
    /// 抽出設定
    options: ExtractOptions,
}

impl Extractor {
    /// 新しい抽出器を作成
    pub fn new(client: JiraClient, options: ExtractOptions) -> Self {
        Self { client, options }
    }

    /// APIクライアントを取得
    pub fn client(&self) -> &JiraClient {
        &self.client
    }

    /// 抽出設定を取得
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// JQLに一致する課題を全ページ取得して正規化する
    ///
    /// 見積もりフィールドが1つも見つからない課題に当たった場合は、正しい
    /// フィールドIDを選び直せるよう利用可能なフィールド一覧をログへ出して
    /// 中断する。
    pub async fn issues(&self, jql: &str) -> Result<FetchResult<IssueRecord>> {
        let endpoint = JiraClient::search_endpoint(jql, false);
        let estimate_fields = &self.options.estimate_fields;

        let result = pager::fetch_all(
            &self.client,
            &endpoint,
            self.options.page_size,
            self.options.max_pages,
            Page::of_issues,
            async |raw| Ok(vec![Normalizer::issue(&raw, estimate_fields)?]),
        )
        .await;

        match result {
            Ok(result) => {
                log_summary("issues", &result);
                Ok(result)
            }
            Err(Error::EstimateFieldUnresolved { candidates }) => {
                self.report_available_fields().await;
                Err(Error::EstimateFieldUnresolved { candidates })
            }
            Err(e) => Err(e),
        }
    }

    /// JQLに一致する課題のステータス遷移履歴を全ページ取得する
    ///
    /// 課題1件は遷移0行以上に展開されるため、レコード数は課題数と
    /// 一致しない。
    pub async fn transitions(&self, jql: &str) -> Result<FetchResult<TransitionRecord>> {
        let endpoint = JiraClient::search_endpoint(jql, true);

        let result = pager::fetch_all(
            &self.client,
            &endpoint,
            self.options.page_size,
            self.options.max_pages,
            Page::of_issues,
            async |raw| Normalizer::transitions(&raw),
        )
        .await?;

        log_summary("transitions", &result);
        Ok(result)
    }

    /// ボードのスプリント一覧を、所属課題キー込みで全ページ取得する
    ///
    /// 課題キーはスプリント1件ごとのネストしたページ取得で集める。ネスト側の
    /// ページ境界エラーも外側と同じ方針で、そこまでに集めたキーをそのまま使う。
    pub async fn sprints(&self, board_id: u64) -> Result<FetchResult<SprintRecord>> {
        let client = &self.client;
        let page_size = self.options.page_size;
        let max_pages = self.options.max_pages;

        let result = pager::fetch_all(
            client,
            &JiraClient::board_sprints_endpoint(board_id),
            page_size,
            max_pages,
            Page::of_values,
            async |raw| {
                let sprint_id = Normalizer::sprint_id(&raw)?;
                let issues = pager::fetch_all(
                    client,
                    &JiraClient::sprint_issues_endpoint(sprint_id),
                    page_size,
                    max_pages,
                    Page::of_issues,
                    async |issue| Ok(vec![Normalizer::issue_key(&issue)?]),
                )
                .await?;
                Ok(vec![Normalizer::sprint(&raw, &issues.records)])
            },
        )
        .await?;

        log_summary("iterations", &result);
        Ok(result)
    }

    /// 課題を1件キー指定で取得して正規化する
    pub async fn issue(&self, key: &str) -> Result<IssueRecord> {
        let raw = self.client.issue_raw(key).await?;

        match Normalizer::issue(&raw, &self.options.estimate_fields) {
            Err(Error::EstimateFieldUnresolved { candidates }) => {
                self.report_available_fields().await;
                Err(Error::EstimateFieldUnresolved { candidates })
            }
            other => other,
        }
    }

    /// ボード名とプロジェクト識別子からボードを解決する
    ///
    /// 一意に決まらない場合は候補一覧を含むエラーで中断する。
    pub async fn board(&self, name: &str, project: &str) -> Result<BoardDescriptor> {
        let resolution =
            discovery::resolve_board(&self.client, name, project, self.options.page_size).await?;
        let board = resolution.into_board(name, project)?;

        info!(board_id = board.id, board_name = %board.name, "board resolved");
        Ok(board)
    }

    /// 見積もりフィールドが解決できなかったときの診断出力
    ///
    /// 利用可能なフィールドのid/name対を列挙する。候補リストの修正が
    /// この一覧を眺めるだけで済むようにするのが目的。
    async fn report_available_fields(&self) {
        match self.client.fields().await {
            Ok(fields) => {
                error!(
                    count = fields.len(),
                    "estimate field not found, available fields follow"
                );
                for field in fields {
                    error!(id = %field.id, name = %field.name, "available field");
                }
            }
            Err(e) => {
                error!(error = %e, "failed to fetch field metadata for diagnostics");
            }
        }
    }
}

fn log_summary<T>(dataset: &str, result: &FetchResult<T>) {
    info!(
        dataset,
        records = result.len(),
        pages = result.pages,
        complete = result.complete,
        seconds = result.duration_seconds(),
        "dataset fetched"
    );
}
