// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抓取工作模块
///
/// - interaction：可取消的浏览器交互与等待
/// - pagination：翻页控制器
/// - region_session：单区域会话状态机
/// - orchestrator：多区域并发编排
pub mod interaction;
pub mod orchestrator;
pub mod pagination;
pub mod region_session;
