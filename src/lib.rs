// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、结果提取和仓库接口
pub mod domain;

/// 引擎模块
///
/// 浏览器引擎抽象及其chromiumoxide实现
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如结果文件输出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现区域会话状态机与并发编排
pub mod workers;
