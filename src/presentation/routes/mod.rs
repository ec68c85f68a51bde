// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::localities_handler;
use axum::{routing::get, Router};

/// 创建应用路由
///
/// 抓取端点依赖 `Extension<Arc<CrawlOrchestrator>>` 与
/// `Extension<Arc<dyn ResultSink>>`，由调用方通过 layer 注入。
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route(
            "/v1/localidades/{ufs}",
            get(localities_handler::get_localities),
        )
}

/// 健康检查端点
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
