// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::models::locality::RegionResult;
use crate::domain::models::region::RegionCode;
use crate::domain::services::locality_extractor::{LocalityExtractor, PageKind};
use crate::engines::traits::{BrowserEngine, BrowsingContext};
use crate::utils::errors::CrawlError;
use crate::workers::interaction::{Interaction, InteractionError, InteractionPolicy, Stage};
use crate::workers::orchestrator::CrawlOptions;
use crate::workers::pagination::{PaginationController, RESULTS_PANEL};

/// 区域下拉框
pub const REGION_SELECT: &str = "#Geral select";
/// 搜索按钮
pub const SEARCH_BUTTON: &str = r#"#Geral input[value="Buscar"]"#;

/// 区域下拉框中对应选项的选择器
pub fn region_option(region: RegionCode) -> String {
    format!(r#"#Geral select option[value="{}"]"#, region)
}

/// 会话状态
///
/// `Init → FormReady → FormSubmitted → PageExtracted → {HasNextPage → PageExtracted | Done} | Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 已获得浏览上下文
    Init,
    /// 查询表单可用
    FormReady,
    /// 已提交搜索
    FormSubmitted,
    /// 已取得一页结果
    PageExtracted { markup: String, kind: PageKind },
    /// 存在下一页
    HasNextPage,
    /// 正常结束
    Done,
    /// 失败结束
    Failed(CrawlError),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Init => "init",
            SessionState::FormReady => "form_ready",
            SessionState::FormSubmitted => "form_submitted",
            SessionState::PageExtracted { .. } => "page_extracted",
            SessionState::HasNextPage => "has_next_page",
            SessionState::Done => "done",
            SessionState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed(_))
    }
}

/// 会话结果
///
/// 失败时 `result` 仍包含已经取得的部分记录
#[derive(Debug)]
pub struct SessionOutcome {
    pub result: RegionResult,
    pub pages: usize,
    pub error: Option<CrawlError>,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// 按全有或全无策略丢弃部分结果
    pub fn into_result(self) -> Result<RegionResult, CrawlError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}

/// 区域会话
///
/// 在一个独占的浏览上下文中完成单个区域的导航、搜索、提取与翻页。
pub struct RegionSession {
    region: RegionCode,
    target_url: String,
    policy: InteractionPolicy,
    max_pages: usize,
    result: RegionResult,
    pages: usize,
}

impl RegionSession {
    pub fn new(region: RegionCode, options: &CrawlOptions) -> Self {
        Self {
            region,
            target_url: options.target_url.clone(),
            policy: options.interaction.clone(),
            max_pages: options.max_pages,
            result: RegionResult::new(region),
            pages: 0,
        }
    }

    /// 运行会话直到结束
    ///
    /// 先从池中取得许可，再打开浏览上下文；无论成功、失败还是取消，
    /// 上下文都会在返回前关闭，许可随之释放。
    ///
    /// # 参数
    ///
    /// * `engine` - 浏览器引擎
    /// * `pool` - 浏览上下文池
    /// * `cancel` - 整批共享的取消令牌
    pub async fn run(
        mut self,
        engine: &dyn BrowserEngine,
        pool: &Semaphore,
        cancel: &CancellationToken,
    ) -> SessionOutcome {
        let policy = self.policy.clone();
        let io = Interaction::new(&policy, cancel);

        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return self.finish(Some(CrawlError::Cancelled)),
            permit = pool.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    let err = CrawlError::Internal("browsing context pool closed".to_string());
                    return self.finish(Some(err));
                }
            },
        };

        let mut ctx = match io.run(engine.open_context()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                let err = e.into_crawl_error(self.region, Stage::Navigate);
                return self.finish(Some(err));
            }
        };
        debug!("Acquired {} browsing context for {}", engine.name(), self.region);

        let outcome = self.drive(ctx.as_mut(), &io).await;

        if let Err(e) = ctx.close().await {
            warn!("Failed to release browsing context for {}: {}", self.region, e);
        }

        self.finish(outcome.err())
    }

    async fn drive(
        &mut self,
        ctx: &mut dyn BrowsingContext,
        io: &Interaction<'_>,
    ) -> Result<(), CrawlError> {
        let paginator = PaginationController::new(io, self.region);
        let mut state = SessionState::Init;

        while !state.is_terminal() {
            let from = state.name();
            state = match self.step(state, ctx, io, &paginator).await {
                Ok(next) => next,
                Err(err) => SessionState::Failed(err),
            };
            debug!("{}: {} -> {}", self.region, from, state.name());
        }

        match state {
            SessionState::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }

    async fn step(
        &mut self,
        state: SessionState,
        ctx: &mut dyn BrowsingContext,
        io: &Interaction<'_>,
        paginator: &PaginationController<'_>,
    ) -> Result<SessionState, CrawlError> {
        let region = self.region;
        let navigate = |e: InteractionError| e.into_crawl_error(region, Stage::Navigate);

        match state {
            SessionState::Init => Ok(SessionState::FormReady),

            SessionState::FormReady => {
                io.run(ctx.navigate(&self.target_url))
                    .await
                    .map_err(navigate)?;
                io.wait_visible(ctx, REGION_SELECT).await.map_err(navigate)?;
                Ok(SessionState::FormSubmitted)
            }

            SessionState::FormSubmitted => {
                let option = region_option(region);
                io.run(ctx.select_option(&option)).await.map_err(navigate)?;
                io.wait_selected(ctx, &option).await.map_err(navigate)?;
                io.run(ctx.click(SEARCH_BUTTON)).await.map_err(navigate)?;
                io.settle().await.map_err(navigate)?;

                let markup = io
                    .run(ctx.outer_html(RESULTS_PANEL))
                    .await
                    .map_err(|e| e.into_crawl_error(region, Stage::Capture))?;
                Ok(SessionState::PageExtracted {
                    markup,
                    kind: PageKind::First,
                })
            }

            SessionState::PageExtracted { markup, kind } => {
                let records = LocalityExtractor::extract(&markup, kind).map_err(|e| {
                    CrawlError::ExtractionFailure {
                        region,
                        reason: e.to_string(),
                    }
                })?;
                self.pages += 1;
                debug!(
                    "{} page {}: {} localities",
                    region,
                    self.pages,
                    records.len()
                );
                self.result.localities.extend(records);

                if LocalityExtractor::has_next_page(&markup) {
                    Ok(SessionState::HasNextPage)
                } else {
                    Ok(SessionState::Done)
                }
            }

            SessionState::HasNextPage => {
                if self.pages >= self.max_pages {
                    return Err(CrawlError::PaginationLimitExceeded {
                        region,
                        limit: self.max_pages,
                    });
                }
                let markup = paginator.advance(ctx).await?;
                Ok(SessionState::PageExtracted {
                    markup,
                    kind: PageKind::Subsequent,
                })
            }

            terminal @ (SessionState::Done | SessionState::Failed(_)) => Ok(terminal),
        }
    }

    fn finish(self, error: Option<CrawlError>) -> SessionOutcome {
        match &error {
            None => info!(
                "Region {} finished: {} localities across {} page(s)",
                self.region,
                self.result.localities.len(),
                self.pages
            ),
            Some(CrawlError::Cancelled) => debug!("Region {} cancelled", self.region),
            Some(err) => warn!(
                "Region {} failed after {} page(s): {}",
                self.region, self.pages, err
            ),
        }

        SessionOutcome {
            result: self.result,
            pages: self.pages,
            error,
        }
    }
}
