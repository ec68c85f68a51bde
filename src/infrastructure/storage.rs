// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::domain::models::locality::CrawlBatch;
use crate::domain::repositories::result_sink::{ResultSink, SinkError};

/// JSONL 文件输出
///
/// 每个非空区域结果写一行JSON。每次写入都会覆盖整个文件。
pub struct JsonlResultSink {
    path: PathBuf,
}

impl JsonlResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 将整批结果编码为JSONL文本
    pub fn encode(batch: &CrawlBatch) -> Result<String, SinkError> {
        let mut out = String::new();
        for result in batch.results.iter().filter(|r| !r.is_empty()) {
            out.push_str(&serde_json::to_string(result)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[async_trait]
impl ResultSink for JsonlResultSink {
    async fn write(&self, batch: &CrawlBatch) -> Result<(), SinkError> {
        let contents = Self::encode(batch)?;

        // 确保目录存在
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&self.path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;

        info!(
            "Wrote {} region(s) to {}",
            contents.lines().count(),
            self.path.display()
        );
        Ok(())
    }
}
