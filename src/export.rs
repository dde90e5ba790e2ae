use flate2::{Compression, write::GzEncoder};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs::{File, create_dir_all};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::Tabular;

/// 正規化済みデータセットをCSV / JSONファイルへ書き出すエクスポーター
pub struct DatasetExporter {
    /// 出力ディレクトリのパス
    output_dir: PathBuf,
    /// gzip圧縮を使用するかどうか
    use_compression: bool,
}

impl DatasetExporter {
    /// 新しいエクスポーターを作成（圧縮なし）
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            use_compression: false,
        }
    }

    /// 圧縮設定を変更（有効にするとファイル名に.gzが付く）
    pub fn with_compression(mut self, use_compression: bool) -> Self {
        self.use_compression = use_compression;
        self
    }

    /// 出力ディレクトリを初期化
    pub async fn initialize(&self) -> Result<()> {
        create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// データセットをCSVファイルへ書き出す
    ///
    /// ヘッダー行はレコード型の列定義から決まる。空のデータセットは
    /// ヘッダーだけのファイルを残さず、エラーとして拒否する。
    pub async fn write_csv<T: Tabular>(&self, name: &str, records: &[T]) -> Result<PathBuf> {
        if records.is_empty() {
            return Err(Error::EmptyDataset(name.to_string()));
        }

        let csv = format_csv(records);
        let path = self.dataset_path(name, "csv");
        self.write_file(&path, csv.as_bytes()).await?;

        info!(dataset = name, records = records.len(), path = %path.display(), "csv written");
        Ok(path)
    }

    /// データセットをJSON配列ファイルへ書き出す
    ///
    /// CSVと違って空のデータセットも空配列として正常に書き出せる。
    pub async fn write_json<T: Serialize>(&self, name: &str, records: &[T]) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(records)?;
        let path = self.dataset_path(name, "json");
        self.write_file(&path, &json).await?;

        info!(dataset = name, records = records.len(), path = %path.display(), "json written");
        Ok(path)
    }

    /// データセットをCSVとJSONの両方へ書き出す
    ///
    /// CSVを先に書くため、空のデータセットはどちらのファイルも作られない。
    pub async fn write_dataset<T: Tabular + Serialize>(
        &self,
        name: &str,
        records: &[T],
    ) -> Result<(PathBuf, PathBuf)> {
        let csv_path = self.write_csv(name, records).await?;
        let json_path = self.write_json(name, records).await?;
        Ok((csv_path, json_path))
    }

    /// データセットファイルのパスを取得
    fn dataset_path(&self, name: &str, extension: &str) -> PathBuf {
        let filename = if self.use_compression {
            format!("{}.{}.gz", name, extension)
        } else {
            format!("{}.{}", name, extension)
        };
        self.output_dir.join(filename)
    }

    /// バイト列をファイルへ書き込み（圧縮対応）
    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let final_data = if self.use_compression {
            // gzip圧縮
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()?
        } else {
            data.to_vec()
        };

        let mut file = File::create(path).await?;
        file.write_all(&final_data).await?;
        file.sync_all().await?;

        Ok(())
    }
}

/// レコード列をCSVテキストへ整形する
fn format_csv<T: Tabular>(records: &[T]) -> String {
    let mut out = String::new();
    out.push_str(&T::columns().join(","));
    out.push('\n');

    for record in records {
        let row: Vec<String> = record.row().iter().map(|cell| escape_cell(cell)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// CSVセルをRFC 4180の引用規則でエスケープする
fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
