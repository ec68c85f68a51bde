// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：区域代码、地点记录和批次结果
/// - 仓库接口（repositories）：结果输出抽象接口
/// - 服务（services）：结果表格的解析与提取
///
/// 领域层不依赖于浏览器或文件系统等外部实现。
pub mod models;
pub mod repositories;
pub mod services;
