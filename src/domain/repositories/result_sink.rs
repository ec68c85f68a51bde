// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::locality::CrawlBatch;

/// 结果输出错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 结果输出特质
///
/// 接收已按输入顺序组装好的整批结果并持久化
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// 写入整批结果
    ///
    /// 没有任何地点的区域不会被写入
    async fn write(&self, batch: &CrawlBatch) -> Result<(), SinkError>;
}
