/// フィールド定義の一覧表示
///
/// 接続先のJIRAが持つフィールド定義を一覧し、ストーリーポイントに
/// 使えそうなカスタムフィールドの候補を表示します
///
/// 実行前に環境変数を設定してください：
/// export JIRA_URL=https://your-instance.atlassian.net
/// export JIRA_USER=your-email@example.com
/// export JIRA_API_TOKEN=your-api-token
///
/// 実行方法：
/// cargo run --example list_fields
use dotenv::dotenv;

use jira_export::{JiraClient, JiraConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    println!("🗂️  フィールド定義の一覧");
    println!("========================");

    let config = JiraConfig::from_env()
        .map_err(|_| "環境変数 JIRA_URL / JIRA_USER / JIRA_API_TOKEN を設定してください。")?;
    let client = JiraClient::new(config)?;
    println!("✅ JIRAクライアント準備完了");

    let fields = client.fields().await?;
    println!("📊 {} 件のフィールド定義を取得しました\n", fields.len());

    println!("{:<28} {:<32} {:<8} {}", "id", "name", "custom", "type");
    println!("{}", "-".repeat(80));
    for field in &fields {
        let field_type = field
            .schema
            .as_ref()
            .map(|s| s.field_type.as_str())
            .unwrap_or("-");
        println!(
            "{:<28} {:<32} {:<8} {}",
            field.id,
            field.name,
            if field.is_custom() { "yes" } else { "no" },
            field_type
        );
    }

    // ストーリーポイント候補の当たりを付ける
    let candidates: Vec<_> = fields
        .iter()
        .filter(|f| f.is_custom() && f.name.to_lowercase().contains("point"))
        .collect();

    if candidates.is_empty() {
        println!("\n🔍 名前に 'point' を含むカスタムフィールドは見つかりませんでした");
    } else {
        println!("\n🎯 ストーリーポイント候補:");
        for field in candidates {
            println!("   {} ({})", field.id, field.name);
        }
        println!("\n💡 候補を見積もりフィールドとして使うには:");
        println!("   export JIRA_ESTIMATE_FIELDS=customfield_XXXXX");
        println!("   cargo run --example export_board");
    }

    Ok(())
}
