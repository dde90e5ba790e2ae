/// ボード単位のデータセットエクスポート
///
/// ボード名を解決し、課題・ステータス遷移・スプリントの3データセットを
/// CSVとJSONの両形式で書き出します
///
/// 実行前に環境変数を設定してください：
/// export JIRA_URL=https://your-instance.atlassian.net
/// export JIRA_USER=your-email@example.com
/// export JIRA_API_TOKEN=your-api-token
/// export JIRA_PROJECT=CAR
/// export JIRA_BOARD="CAR board"        # 省略時は "<プロジェクト> board"
/// export EXPORT_DIR=./export           # 省略時は ./export
/// export JIRA_ESTIMATE_FIELDS=customfield_10016,customfield_10026  # 任意
///
/// 実行方法：
/// cargo run --example export_board
use dotenv::dotenv;
use std::env;
use tracing_subscriber::EnvFilter;

use jira_export::{DatasetExporter, ExtractOptions, Extractor, JiraClient, JiraConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("📦 ボード単位のデータセットエクスポート");
    println!("======================================");

    let config = JiraConfig::from_env()
        .map_err(|_| "環境変数 JIRA_URL / JIRA_USER / JIRA_API_TOKEN を設定してください。")?;
    let client = JiraClient::new(config)?;
    println!("✅ JIRAクライアント準備完了");

    let project = env::var("JIRA_PROJECT").unwrap_or_else(|_| "CAR".to_string());
    let board_name = env::var("JIRA_BOARD").unwrap_or_else(|_| format!("{} board", project));
    let export_dir = env::var("EXPORT_DIR").unwrap_or_else(|_| "./export".to_string());

    let mut options = ExtractOptions::new();
    if let Ok(fields) = env::var("JIRA_ESTIMATE_FIELDS") {
        options = options.estimate_fields(fields.split(',').map(|f| f.trim().to_string()).collect());
    }
    let extractor = Extractor::new(client, options);

    let exporter = DatasetExporter::new(&export_dir);
    exporter.initialize().await?;
    println!("📁 出力先: {}", export_dir);

    // 1. ボード解決
    println!("\n🎯 1. ボード解決 - '{}'", board_name);
    let board = match extractor.board(&board_name, &project).await {
        Ok(board) => {
            println!("   ✅ ボード {} (id: {}) を使用します", board.name, board.id);
            Some(board)
        }
        Err(e) => {
            println!("   ❌ ボードを解決できませんでした: {}", e);
            println!("   ⏭️  スプリントの書き出しはスキップします");
            None
        }
    };

    // 2. 課題データセット
    let jql = format!("project={}", project);
    println!("\n📋 2. 課題の取得 - JQL: {}", jql);
    match extractor.issues(&jql).await {
        Ok(result) => {
            println!(
                "   📊 {} 件 / {} ページ (complete: {})",
                result.len(),
                result.pages,
                result.complete
            );
            match exporter.write_dataset("issues", &result.records).await {
                Ok((csv, json)) => {
                    println!("   💾 {}", csv.display());
                    println!("   💾 {}", json.display());
                }
                Err(e) => println!("   ❌ 書き出しエラー: {}", e),
            }
        }
        Err(e) => println!("   ❌ エラー: {}", e),
    }

    // 3. ステータス遷移データセット
    println!("\n🔀 3. ステータス遷移の取得");
    match extractor.transitions(&jql).await {
        Ok(result) => {
            println!(
                "   📊 {} 件 / {} ページ (complete: {})",
                result.len(),
                result.pages,
                result.complete
            );
            match exporter.write_dataset("transitions", &result.records).await {
                Ok((csv, json)) => {
                    println!("   💾 {}", csv.display());
                    println!("   💾 {}", json.display());
                }
                Err(e) => println!("   ❌ 書き出しエラー: {}", e),
            }
        }
        Err(e) => println!("   ❌ エラー: {}", e),
    }

    // 4. スプリントデータセット
    if let Some(board) = board {
        println!("\n🏃 4. スプリントの取得 - board {}", board.id);
        match extractor.sprints(board.id).await {
            Ok(result) => {
                println!(
                    "   📊 {} 件 / {} ページ (complete: {})",
                    result.len(),
                    result.pages,
                    result.complete
                );
                match exporter.write_dataset("iterations", &result.records).await {
                    Ok((csv, json)) => {
                        println!("   💾 {}", csv.display());
                        println!("   💾 {}", json.display());
                    }
                    Err(e) => println!("   ❌ 書き出しエラー: {}", e),
                }
            }
            Err(e) => println!("   ❌ エラー: {}", e),
        }
    }

    println!("\n✨ エクスポート完了!");
    println!("\n💡 見積もりフィールドが解決できない場合:");
    println!("   cargo run --example list_fields");

    Ok(())
}
