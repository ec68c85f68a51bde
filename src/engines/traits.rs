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

use async_trait::async_trait;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 浏览器启动或连接失败
    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),
    /// 导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 元素不存在
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    /// 脚本执行失败
    #[error("Script evaluation failed: {0}")]
    Script(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 浏览器引擎特质
///
/// 负责分配浏览上下文（标签页）。每个上下文只属于一个区域会话。
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// 打开一个新的独占浏览上下文
    async fn open_context(&self) -> Result<Box<dyn BrowsingContext>, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

/// 浏览上下文特质
///
/// 对单个标签页的有状态操作。调用方必须在会话结束时调用 [`BrowsingContext::close`]。
#[async_trait]
pub trait BrowsingContext: Send {
    /// 导航到指定URL，并等待加载完成
    async fn navigate(&mut self, url: &str) -> Result<(), EngineError>;

    /// 选择器匹配的元素当前是否存在且可见
    async fn is_visible(&mut self, selector: &str) -> Result<bool, EngineError>;

    /// 将选择器匹配的 `<option>` 标记为选中
    async fn select_option(&mut self, option_selector: &str) -> Result<(), EngineError>;

    /// 选择器匹配的 `<option>` 当前是否处于选中状态
    async fn is_selected(&mut self, option_selector: &str) -> Result<bool, EngineError>;

    /// 点击选择器匹配的第一个元素
    async fn click(&mut self, selector: &str) -> Result<(), EngineError>;

    /// 获取选择器匹配的第一个元素的外部HTML
    async fn outer_html(&mut self, selector: &str) -> Result<String, EngineError>;

    /// 关闭上下文，释放标签页
    async fn close(self: Box<Self>) -> Result<(), EngineError>;
}
