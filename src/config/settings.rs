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

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::workers::interaction::InteractionPolicy;
use crate::workers::orchestrator::CrawlOptions;

/// 查询页面地址
pub const DEFAULT_TARGET_URL: &str =
    "https://www2.correios.com.br/sistemas/buscacep/buscaFaixaCep.cfm";

/// 应用程序配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取配置
    pub crawler: CrawlerSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 输出配置
    pub output: OutputSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 查询页面地址
    pub target_url: String,
    /// 单批最多区域数
    pub max_targets: usize,
    /// 浏览上下文池大小（真实并行度）
    pub pool_size: usize,
    /// 整批截止时间（秒）
    pub deadline_secs: u64,
    /// 取消后等待会话退出的宽限时间（毫秒）
    pub cancel_grace_ms: u64,
    /// 单区域最多页数
    pub max_pages: usize,
    /// 点击后的固定等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// 等待元素的超时时间（秒）
    pub selector_timeout_secs: u64,
    /// 等待元素时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 远程调试地址，设置后连接已有的Chrome而不是启动新实例
    pub remote_debugging_url: Option<String>,
    /// 是否无头模式
    pub headless: bool,
    /// CDP请求超时时间（秒）
    pub request_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            remote_debugging_url: None,
            headless: true,
            request_timeout_secs: 30,
        }
    }
}

/// 输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// JSONL结果文件路径
    pub path: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `CEP_CRAWLER__*` 环境变量，后者覆盖前者。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CEP_CRAWLER").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("crawler.target_url", DEFAULT_TARGET_URL)?
            .set_default("crawler.max_targets", 5)?
            .set_default("crawler.pool_size", 5)?
            .set_default("crawler.deadline_secs", 60)?
            .set_default("crawler.cancel_grace_ms", 5000)?
            .set_default("crawler.max_pages", 1000)?
            .set_default("crawler.settle_delay_ms", 1000)?
            .set_default("crawler.selector_timeout_secs", 30)?
            .set_default("crawler.poll_interval_ms", 100)?
            .set_default("browser.headless", true)?
            .set_default("browser.request_timeout_secs", 30)?
            .set_default("output.path", "result.jsonl")
    }
}

impl From<&CrawlerSettings> for CrawlOptions {
    fn from(settings: &CrawlerSettings) -> Self {
        CrawlOptions {
            target_url: settings.target_url.clone(),
            max_targets: settings.max_targets,
            pool_size: settings.pool_size.max(1),
            deadline: Duration::from_secs(settings.deadline_secs),
            cancel_grace: Duration::from_millis(settings.cancel_grace_ms),
            max_pages: settings.max_pages,
            interaction: InteractionPolicy {
                settle_delay: Duration::from_millis(settings.settle_delay_ms),
                selector_timeout: Duration::from_secs(settings.selector_timeout_secs),
                poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            },
        }
    }
}
