// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{BrowserEngine, BrowsingContext, EngineError};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Chromium引擎
///
/// 基于chromiumoxide的浏览器引擎。浏览器实例在第一次打开上下文时才启动（或连接远程实例），
/// 之后所有会话共享同一个浏览器，每个会话独占一个标签页。
pub struct ChromiumEngine {
    settings: BrowserSettings,
    browser: OnceCell<Browser>,
}

impl ChromiumEngine {
    /// 创建新的引擎实例，不会立即启动浏览器
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            browser: OnceCell::const_new(),
        }
    }

    async fn browser(&self) -> Result<&Browser, EngineError> {
        self.browser
            .get_or_try_init(|| launch_or_connect(&self.settings))
            .await
    }

    /// 关闭浏览器（如果已经启动）
    pub async fn shutdown(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if self.settings.remote_debugging_url.is_some() {
                // Remote instances are shared; only our tabs are ours to close.
                return;
            }
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser process: {}", e);
            }
            info!("Browser closed");
        }
    }
}

async fn launch_or_connect(settings: &BrowserSettings) -> Result<Browser, EngineError> {
    let (browser, mut handler) = if let Some(ref url) = settings.remote_debugging_url {
        info!("Connecting to remote Chrome instance at: {}", url);
        Browser::connect(url.as_str()).await.map_err(|e| {
            EngineError::BrowserUnavailable(format!("Failed to connect to remote Chrome: {}", e))
        })?
    } else {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(settings.request_timeout_secs));
        if !settings.headless {
            builder = builder.with_head();
        }
        builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

        let config = builder.build().map_err(EngineError::BrowserUnavailable)?;
        info!("Launching local Chrome instance");
        Browser::launch(config)
            .await
            .map_err(|e| EngineError::BrowserUnavailable(e.to_string()))?
    };

    // Drive the CDP connection for the lifetime of the browser
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("Browser handler error: {}", e);
            }
        }
    });

    Ok(browser)
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open_context(&self) -> Result<Box<dyn BrowsingContext>, EngineError> {
        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::BrowserUnavailable(format!("Failed to open tab: {}", e)))?;
        Ok(Box::new(ChromiumContext { page: Some(page) }))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// 单个标签页
///
/// 若会话任务被中止而没有调用 `close`，`Drop` 会在后台关闭标签页。
pub struct ChromiumContext {
    page: Option<Page>,
}

impl ChromiumContext {
    fn page(&self) -> Result<&Page, EngineError> {
        self.page
            .as_ref()
            .ok_or_else(|| EngineError::Other("browsing context already closed".to_string()))
    }

    async fn eval_bool(&self, script: String) -> Result<bool, EngineError> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| EngineError::Script(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| EngineError::Script(e.to_string()))
    }
}

/// Quote a selector as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl BrowsingContext for ChromiumContext {
    async fn navigate(&mut self, url: &str) -> Result<(), EngineError> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| EngineError::Navigation(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn is_visible(&mut self, selector: &str) -> Result<bool, EngineError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const style = window.getComputedStyle(el); \
             if (style.visibility === 'hidden' || style.display === 'none') return false; \
             const rect = el.getBoundingClientRect(); \
             return rect.width > 0 && rect.height > 0; }})()",
            sel = js_string(selector)
        );
        self.eval_bool(script).await
    }

    async fn select_option(&mut self, option_selector: &str) -> Result<(), EngineError> {
        let script = format!(
            "(() => {{ const opt = document.querySelector({sel}); \
             if (!opt) return false; \
             opt.selected = true; \
             opt.setAttribute('selected', 'true'); \
             const select = opt.closest('select'); \
             if (select) select.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            sel = js_string(option_selector)
        );
        if self.eval_bool(script).await? {
            Ok(())
        } else {
            Err(EngineError::ElementNotFound(option_selector.to_string()))
        }
    }

    async fn is_selected(&mut self, option_selector: &str) -> Result<bool, EngineError> {
        let script = format!(
            "(() => {{ const opt = document.querySelector({sel}); return !!(opt && opt.selected); }})()",
            sel = js_string(option_selector)
        );
        self.eval_bool(script).await
    }

    async fn click(&mut self, selector: &str) -> Result<(), EngineError> {
        self.page()?
            .find_element(selector)
            .await
            .map_err(|e| {
                debug!("Element `{}` not found: {}", selector, e);
                EngineError::ElementNotFound(selector.to_string())
            })?
            .click()
            .await
            .map_err(|e| EngineError::Other(format!("Click failed: {}", e)))?;
        Ok(())
    }

    async fn outer_html(&mut self, selector: &str) -> Result<String, EngineError> {
        self.page()?
            .find_element(selector)
            .await
            .map_err(|e| {
                debug!("Element `{}` not found: {}", selector, e);
                EngineError::ElementNotFound(selector.to_string())
            })?
            .outer_html()
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?
            .ok_or_else(|| EngineError::ElementNotFound(selector.to_string()))
    }

    async fn close(mut self: Box<Self>) -> Result<(), EngineError> {
        match self.page.take() {
            Some(page) => page
                .close()
                .await
                .map_err(|e| EngineError::Other(format!("Failed to close tab: {}", e))),
            None => Ok(()),
        }
    }
}

impl Drop for ChromiumContext {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(async move {
                    if let Err(e) = page.close().await {
                        warn!("Failed to close abandoned tab: {}", e);
                    }
                });
            }
        }
    }
}
