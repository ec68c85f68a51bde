// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use thiserror::Error;

use crate::domain::models::region::RegionCode;

/// 抓取错误类型
///
/// 一批请求只会产生一个终止结果。除输入类错误外，所有会话级错误都携带出错的区域代码。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    /// 输入中存在无效区域代码
    #[error("invalid region code: {0:?}")]
    InvalidRegion(String),

    /// 目标数量超过单批上限
    #[error("too many targets: {count} supplied, at most {max} allowed")]
    TooManyTargets { count: usize, max: usize },

    /// 页面导航失败
    #[error("navigation failed for {region}: {reason}")]
    NavigationFailure { region: RegionCode, reason: String },

    /// 等待元素超时
    #[error("timed out waiting for `{selector}` while crawling {region}")]
    SelectorTimeout {
        region: RegionCode,
        selector: String,
    },

    /// 结果提取失败
    #[error("extraction failed for {region}: {reason}")]
    ExtractionFailure { region: RegionCode, reason: String },

    /// 超过最大页数
    #[error("pagination limit of {limit} pages exceeded for {region}")]
    PaginationLimitExceeded { region: RegionCode, limit: usize },

    /// 整批截止时间已到
    #[error("batch deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// 调用方取消
    #[error("crawl cancelled")]
    Cancelled,

    /// 内部错误（例如会话任务崩溃）
    #[error("internal error: {0}")]
    Internal(String),
}

impl CrawlError {
    /// 判断是否为输入错误（无需启动任何会话即可确定）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CrawlError::InvalidRegion(_) | CrawlError::TooManyTargets { .. }
        )
    }

    /// 出错的区域（如有）
    pub fn region(&self) -> Option<RegionCode> {
        match self {
            CrawlError::NavigationFailure { region, .. }
            | CrawlError::SelectorTimeout { region, .. }
            | CrawlError::ExtractionFailure { region, .. }
            | CrawlError::PaginationLimitExceeded { region, .. } => Some(*region),
            _ => None,
        }
    }
}
