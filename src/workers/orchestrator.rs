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

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::config::settings::DEFAULT_TARGET_URL;
use crate::domain::models::locality::{CrawlBatch, RegionResult};
use crate::domain::models::region::RegionCode;
use crate::engines::traits::BrowserEngine;
use crate::utils::errors::CrawlError;
use crate::workers::interaction::InteractionPolicy;
use crate::workers::region_session::{RegionSession, SessionOutcome};

/// 单批最多区域数
pub const DEFAULT_MAX_TARGETS: usize = 5;

/// 抓取选项
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// 查询页面地址
    pub target_url: String,
    /// 单批最多区域数
    pub max_targets: usize,
    /// 浏览上下文池大小
    pub pool_size: usize,
    /// 整批截止时间
    pub deadline: Duration,
    /// 取消后等待会话退出的宽限时间
    pub cancel_grace: Duration,
    /// 单区域最多页数
    pub max_pages: usize,
    /// 交互策略
    pub interaction: InteractionPolicy,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            max_targets: DEFAULT_MAX_TARGETS,
            pool_size: DEFAULT_MAX_TARGETS,
            deadline: Duration::from_secs(60),
            cancel_grace: Duration::from_secs(5),
            max_pages: 1000,
            interaction: InteractionPolicy::default(),
        }
    }
}

type SessionSet = JoinSet<(usize, SessionOutcome)>;

/// 抓取编排器
///
/// 为每个区域代码启动一个会话，所有会话共享同一个截止时间和取消范围。
/// 采用全有或全无策略：任一会话失败即取消其余会话并返回该错误。
pub struct CrawlOrchestrator {
    engine: Arc<dyn BrowserEngine>,
    pool: Arc<Semaphore>,
    options: Arc<CrawlOptions>,
}

impl CrawlOrchestrator {
    /// 创建新的编排器
    ///
    /// # 参数
    ///
    /// * `engine` - 浏览器引擎
    /// * `options` - 抓取选项，`pool_size` 决定真实并行度
    pub fn new(engine: Arc<dyn BrowserEngine>, options: CrawlOptions) -> Self {
        Self {
            pool: Arc::new(Semaphore::new(options.pool_size.max(1))),
            engine,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// 校验并解析原始区域代码
    ///
    /// 数量检查先于代码校验；所有代码都校验通过后才会启动会话。
    pub fn parse_targets<S: AsRef<str>>(&self, raw: &[S]) -> Result<Vec<RegionCode>, CrawlError> {
        if raw.len() > self.options.max_targets {
            return Err(CrawlError::TooManyTargets {
                count: raw.len(),
                max: self.options.max_targets,
            });
        }

        raw.iter()
            .map(|code| {
                RegionCode::parse(code.as_ref()).map_err(|e| CrawlError::InvalidRegion(e.0))
            })
            .collect()
    }

    /// 抓取一批区域
    pub async fn crawl<S: AsRef<str>>(&self, raw: &[S]) -> Result<CrawlBatch, CrawlError> {
        self.crawl_with_cancel(raw, CancellationToken::new()).await
    }

    /// 抓取一批区域，可由调用方取消
    ///
    /// # 参数
    ///
    /// * `raw` - 原始区域代码，可能带空白
    /// * `cancel` - 调用方的取消令牌，本批次使用它的子令牌
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlBatch)` - 与输入顺序一致的结果
    /// * `Err(CrawlError)` - 第一个终止错误
    pub async fn crawl_with_cancel<S: AsRef<str>>(
        &self,
        raw: &[S],
        cancel: CancellationToken,
    ) -> Result<CrawlBatch, CrawlError> {
        let regions = self.parse_targets(raw)?;
        info!("Starting crawl for {} region(s): {:?}", regions.len(), regions);

        let batch_token = cancel.child_token();
        // Dropping this future (caller went away) cancels every session
        let _guard = batch_token.clone().drop_guard();

        let mut sessions = self.spawn_sessions(&regions, &batch_token);
        let mut slots: Vec<Option<RegionResult>> = vec![None; regions.len()];

        let deadline = self.options.deadline;
        let collected = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CrawlError::Cancelled),
            finished = tokio::time::timeout(deadline, Self::collect(&mut sessions, &mut slots)) => {
                finished.unwrap_or(Err(CrawlError::DeadlineExceeded(deadline)))
            }
        };

        if let Err(err) = collected {
            match err.region() {
                Some(region) => warn!("Crawl aborted by {}: {}", region, err),
                None => warn!("Crawl aborted: {}", err),
            }
            batch_token.cancel();
            self.drain(&mut sessions).await;
            return Err(err);
        }

        let results = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CrawlError::Internal("session finished without a result".to_string()))?;
        let batch = CrawlBatch::new(results);
        info!(
            "Crawl finished: {} region(s), {} localities",
            batch.len(),
            batch.locality_count()
        );
        Ok(batch)
    }

    fn spawn_sessions(&self, regions: &[RegionCode], token: &CancellationToken) -> SessionSet {
        let mut sessions = JoinSet::new();
        for (index, region) in regions.iter().copied().enumerate() {
            let engine = self.engine.clone();
            let pool = self.pool.clone();
            let options = self.options.clone();
            let token = token.clone();

            sessions.spawn(
                async move {
                    let outcome = RegionSession::new(region, &options)
                        .run(engine.as_ref(), &pool, &token)
                        .await;
                    (index, outcome)
                }
                .instrument(info_span!("region_session", region = %region, index)),
            );
        }
        sessions
    }

    /// 按完成顺序接收会话结果，按输入位置写入
    async fn collect(
        sessions: &mut SessionSet,
        slots: &mut [Option<RegionResult>],
    ) -> Result<(), CrawlError> {
        while let Some(joined) = sessions.join_next().await {
            let (index, outcome) = joined
                .map_err(|e| CrawlError::Internal(format!("session task failed: {}", e)))?;
            let result = outcome.into_result()?;
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }
        Ok(())
    }

    /// 等待已取消的会话释放资源，超过宽限时间则强制中止
    async fn drain(&self, sessions: &mut SessionSet) {
        let grace = self.options.cancel_grace;
        let drained = tokio::time::timeout(grace, async {
            while sessions.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                "{} session(s) did not stop within {:?}, aborting",
                sessions.len(),
                grace
            );
            sessions.abort_all();
        }
    }
}
