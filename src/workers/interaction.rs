// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::models::region::RegionCode;
use crate::engines::traits::{BrowsingContext, EngineError};
use crate::utils::errors::CrawlError;

/// 交互策略
///
/// 查询页面在搜索完成后不会发出可靠的完成信号，因此点击后使用固定的等待时间；
/// 其余等待都是带超时的轮询。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionPolicy {
    /// 点击后的固定等待时间
    pub settle_delay: Duration,
    /// 等待元素的超时时间
    pub selector_timeout: Duration,
    /// 轮询间隔
    pub poll_interval: Duration,
}

impl Default for InteractionPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            selector_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// 交互错误类型
#[derive(Error, Debug)]
pub enum InteractionError {
    /// 等待元素超时
    #[error("timed out waiting for `{0}`")]
    Timeout(String),
    /// 浏览器操作失败
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// 会话被取消
    #[error("interaction cancelled")]
    Cancelled,
}

/// 交互所处的阶段，用于把引擎错误归类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 导航与表单操作
    Navigate,
    /// 读取结果面板
    Capture,
}

impl InteractionError {
    /// 转换为携带区域代码的抓取错误
    pub fn into_crawl_error(self, region: RegionCode, stage: Stage) -> CrawlError {
        match self {
            InteractionError::Timeout(selector)
            | InteractionError::Engine(EngineError::ElementNotFound(selector)) => {
                CrawlError::SelectorTimeout { region, selector }
            }
            InteractionError::Cancelled => CrawlError::Cancelled,
            InteractionError::Engine(e) => match stage {
                Stage::Navigate => CrawlError::NavigationFailure {
                    region,
                    reason: e.to_string(),
                },
                Stage::Capture => CrawlError::ExtractionFailure {
                    region,
                    reason: e.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Condition {
    Visible,
    Selected,
}

/// 可取消的交互执行器
///
/// 每个挂起点（浏览器调用、轮询、固定等待）都与取消令牌竞争，
/// 令牌被取消时立即放弃当前等待。
pub struct Interaction<'a> {
    policy: &'a InteractionPolicy,
    cancel: &'a CancellationToken,
}

impl<'a> Interaction<'a> {
    pub fn new(policy: &'a InteractionPolicy, cancel: &'a CancellationToken) -> Self {
        Self { policy, cancel }
    }

    /// 执行一次浏览器调用
    pub async fn run<T, F>(&self, call: F) -> Result<T, InteractionError>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(InteractionError::Cancelled),
            result = call => result.map_err(InteractionError::from),
        }
    }

    /// 固定等待，让页面的异步更新完成
    pub async fn settle(&self) -> Result<(), InteractionError> {
        self.sleep(self.policy.settle_delay).await
    }

    /// 等待元素可见
    pub async fn wait_visible(
        &self,
        ctx: &mut dyn BrowsingContext,
        selector: &str,
    ) -> Result<(), InteractionError> {
        self.wait_until(ctx, selector, Condition::Visible).await
    }

    /// 等待 `<option>` 被选中
    pub async fn wait_selected(
        &self,
        ctx: &mut dyn BrowsingContext,
        selector: &str,
    ) -> Result<(), InteractionError> {
        self.wait_until(ctx, selector, Condition::Selected).await
    }

    async fn wait_until(
        &self,
        ctx: &mut dyn BrowsingContext,
        selector: &str,
        condition: Condition,
    ) -> Result<(), InteractionError> {
        let deadline = Instant::now() + self.policy.selector_timeout;

        loop {
            let check = async {
                match condition {
                    Condition::Visible => ctx.is_visible(selector).await,
                    Condition::Selected => ctx.is_selected(selector).await,
                }
            };

            let met = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(InteractionError::Cancelled),
                checked = tokio::time::timeout_at(deadline, check) => match checked {
                    Ok(Ok(met)) => met,
                    // The page may be mid-navigation; keep polling until the deadline
                    Ok(Err(e)) => {
                        debug!("Probe for `{}` failed: {}", selector, e);
                        false
                    }
                    Err(_) => return Err(InteractionError::Timeout(selector.to_string())),
                },
            };

            if met {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(InteractionError::Timeout(selector.to_string()));
            }
            self.sleep(self.policy.poll_interval).await?;
        }
    }

    async fn sleep(&self, duration: Duration) -> Result<(), InteractionError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(InteractionError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
