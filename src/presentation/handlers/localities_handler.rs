// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::domain::models::locality::CrawlBatch;
use crate::domain::repositories::result_sink::ResultSink;
use crate::presentation::errors::AppError;
use crate::workers::orchestrator::CrawlOrchestrator;

/// 按区域代码抓取地点
///
/// `ufs` 为逗号分隔的区域代码列表，代码两侧的空白会被忽略。
/// 成功时写入结果文件并返回整批结果。
pub async fn get_localities(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
    Extension(sink): Extension<Arc<dyn ResultSink>>,
    Path(ufs): Path<String>,
) -> Result<Json<CrawlBatch>, AppError> {
    let codes: Vec<&str> = ufs.split(',').collect();
    info!("Localities requested for {:?}", codes);

    let batch = orchestrator.crawl(&codes).await?;
    sink.write(&batch).await?;

    Ok(Json(batch))
}
