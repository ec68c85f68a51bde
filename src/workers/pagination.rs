// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing::debug;

use crate::domain::models::region::RegionCode;
use crate::domain::services::locality_extractor::NEXT_PAGE_FORM;
use crate::engines::traits::BrowsingContext;
use crate::utils::errors::CrawlError;
use crate::workers::interaction::{Interaction, InteractionError, Stage};

/// 结果面板
pub const RESULTS_PANEL: &str = r#"div[class*="ctrlcontent"]"#;
/// 结果表格
pub const RESULTS_TABLE: &str = r#"table[class*="tmptabela"]"#;
/// 下一页按钮：面板中第二个左浮动块
pub const NEXT_PAGE_BUTTON: &str =
    r#"div[class*="ctrlcontent"] div[style="float:left"]:nth-of-type(2)"#;

/// 翻页控制器
///
/// 翻页是访问第一页之后内容的唯一途径。任何等待超时都会终止所属会话。
pub struct PaginationController<'a> {
    interaction: &'a Interaction<'a>,
    region: RegionCode,
}

impl<'a> PaginationController<'a> {
    pub fn new(interaction: &'a Interaction<'a>, region: RegionCode) -> Self {
        Self {
            interaction,
            region,
        }
    }

    /// 前进一页
    ///
    /// 等待下一页按钮出现、点击、固定等待、等待结果表格重新出现，
    /// 最后返回新的结果面板HTML。
    ///
    /// # 参数
    ///
    /// * `ctx` - 会话独占的浏览上下文
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 新页面的结果面板HTML
    /// * `Err(CrawlError)` - 等待超时、浏览器错误或取消
    pub async fn advance(&self, ctx: &mut dyn BrowsingContext) -> Result<String, CrawlError> {
        let io = self.interaction;
        let region = self.region;
        let navigate = |e: InteractionError| e.into_crawl_error(region, Stage::Navigate);

        io.wait_visible(ctx, NEXT_PAGE_FORM).await.map_err(navigate)?;
        io.run(ctx.click(NEXT_PAGE_BUTTON)).await.map_err(navigate)?;
        io.settle().await.map_err(navigate)?;
        io.wait_visible(ctx, RESULTS_TABLE).await.map_err(navigate)?;

        let markup = io
            .run(ctx.outer_html(RESULTS_PANEL))
            .await
            .map_err(|e| e.into_crawl_error(region, Stage::Capture))?;

        debug!("Advanced to next page for {} ({} bytes)", region, markup.len());
        Ok(markup)
    }
}
