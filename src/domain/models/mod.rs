// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 区域代码（region）：固定集合中的联邦单位代码
/// - 地点（locality）：地点记录、单区域结果以及整批结果
pub mod locality;
pub mod region;
