// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含与存储和浏览器无关的纯业务逻辑
pub mod locality_extractor;
