use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::client::JiraClient;
use crate::error::Result;
use crate::models::Page;

/// ページ取得ループ1回分の結果
#[derive(Debug, Clone)]
pub struct FetchResult<T> {
    /// 正規化済みレコード（サービスが返した順序のまま）
    pub records: Vec<T>,
    /// 受信したページ数
    pub pages: u32,
    /// 終了条件に到達して取りきれたかどうか（途中エラーや上限到達ならfalse）
    pub complete: bool,
    /// 取得開始時刻
    pub started_at: DateTime<Utc>,
    /// 取得終了時刻
    pub finished_at: DateTime<Utc>,
}

impl<T> FetchResult<T> {
    /// レコード数を取得
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// レコードが1件もないかどうか
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 取得にかかった時間（秒）
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// レコードだけを取り出す
    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

/// エンドポイントをページ単位で最後まで取得し、正規化したレコードを平坦に連結する
///
/// 各ページのレスポンスはまずextract_itemsで生レコードの配列に分解され、
/// 続いてレコード1件ずつがnormalizeへ渡される。normalizeは1件を0行以上に
/// 展開できる（課題→複数の遷移行など）。結果の順序はサービスが返した
/// ページ順・ページ内順をそのまま保つ。
///
/// 終了条件は2つだけ。アイテムが空のページを受信したとき、または
/// レスポンスのtotalが「現在のオフセット + ページサイズ」を下回ったとき。
/// totalを申告しないエンドポイントは空ページの受信だけが頼りになるため、
/// 必要ならmax_pagesで上限を掛けられる。
///
/// ページ境界での取得失敗（接続エラーや非2xx）は警告ログを残して打ち切り、
/// そこまでに集めたレコードをcomplete = falseで返す。extract_items /
/// normalizeが返す検証エラーはデータ自体が壊れているしるしなので、
/// そのまま伝播して取得全体を中断する。
pub async fn fetch_all<T, E, N>(
    client: &JiraClient,
    endpoint: &str,
    page_size: u32,
    max_pages: Option<u32>,
    extract_items: E,
    mut normalize: N,
) -> Result<FetchResult<T>>
where
    E: Fn(Value) -> Result<Page>,
    N: AsyncFnMut(Value) -> Result<Vec<T>>,
{
    let started_at = Utc::now();
    let mut records = Vec::new();
    let mut offset: u64 = 0;
    let mut pages: u32 = 0;
    let mut complete = true;

    loop {
        if let Some(limit) = max_pages {
            if pages >= limit {
                warn!(pages, limit, "page limit reached, stopping early");
                complete = false;
                break;
            }
        }

        let paged = paged_endpoint(endpoint, offset, page_size);
        info!(
            page = pages,
            start = offset,
            end = offset + page_size as u64,
            url = %format!("{}{}", client.base_url(), paged),
            "fetching page"
        );

        let response = match client.get_raw(&paged).await {
            Ok(response) => response,
            Err(e) => {
                warn!(page = pages, error = %e, "page fetch failed, keeping partial results");
                complete = false;
                break;
            }
        };

        let page = extract_items(response)?;
        pages += 1;

        if page.is_empty() {
            break;
        }

        let total = page.total;
        for item in page.items {
            records.extend(normalize(item).await?);
        }

        if let Some(total) = total {
            if total < offset + page_size as u64 {
                break;
            }
        }

        offset += page_size as u64;
    }

    Ok(FetchResult {
        records,
        pages,
        complete,
        started_at,
        finished_at: Utc::now(),
    })
}

/// エンドポイントにページングパラメータを付加する
fn paged_endpoint(endpoint: &str, offset: u64, page_size: u32) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}startAt={}&maxResults={}", endpoint, separator, offset, page_size)
}
