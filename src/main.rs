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

use axum::Extension;
use cep_crawler::config::settings::Settings;
use cep_crawler::domain::repositories::result_sink::ResultSink;
use cep_crawler::engines::chromium_engine::ChromiumEngine;
use cep_crawler::engines::traits::BrowserEngine;
use cep_crawler::infrastructure::storage::JsonlResultSink;
use cep_crawler::presentation::routes;
use cep_crawler::utils::telemetry;
use cep_crawler::workers::orchestrator::{CrawlOptions, CrawlOrchestrator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting cep_crawler...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Browser engine (Chrome is launched lazily on the first crawl)
    let engine = Arc::new(ChromiumEngine::new(settings.browser.clone()));
    let options = CrawlOptions::from(&settings.crawler);
    let orchestrator = Arc::new(CrawlOrchestrator::new(engine.clone(), options));
    info!(
        "Crawler ready: {} (pool {}, deadline {:?})",
        engine.name(),
        orchestrator.options().pool_size,
        orchestrator.options().deadline
    );

    // 4. Result sink
    let sink: Arc<dyn ResultSink> = Arc::new(JsonlResultSink::new(&settings.output.path));
    info!("Results will be written to {}", settings.output.path);

    // 5. Start HTTP server
    let app = routes::routes()
        .layer(Extension(orchestrator.clone()))
        .layer(Extension(sink))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 6. Release the browser once no crawl can reference it
    drop(orchestrator);
    match Arc::try_unwrap(engine) {
        Ok(mut engine) => engine.shutdown().await,
        Err(_) => error!("Browser engine still in use at shutdown"),
    }

    info!("Shut down successfully");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
