// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::region::RegionCode;

/// 地点记录
///
/// 结果表格中的一行。`id` 在提取时随机生成，只保证唯一，
/// 与内容无关：同一段标记提取两次会得到不同的 `id`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityRecord {
    /// 唯一标识符
    pub id: Uuid,
    /// 地点名称，永不为空
    #[serde(rename = "localidade")]
    pub name: String,
    /// 邮编区间，保留源页面的原始格式
    #[serde(rename = "faixa de cep")]
    pub postal_code_range: String,
}

impl LocalityRecord {
    /// 以新生成的 `id` 创建记录
    pub fn new(name: impl Into<String>, postal_code_range: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            postal_code_range: postal_code_range.into(),
        }
    }

    /// 比较除 `id` 以外的内容
    pub fn same_content(&self, other: &LocalityRecord) -> bool {
        self.name == other.name && self.postal_code_range == other.postal_code_range
    }
}

/// 单个区域的抓取结果
///
/// 每个请求的区域代码恰好产生一个结果，即便会话失败（此时可能为空）。
/// `localities` 按表格行顺序、再按页顺序排列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionResult {
    #[serde(rename = "uf")]
    pub region: RegionCode,
    #[serde(rename = "localidades")]
    pub localities: Vec<LocalityRecord>,
}

impl RegionResult {
    pub fn new(region: RegionCode) -> Self {
        Self {
            region,
            localities: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
    }
}

/// 一次调用的全部结果
///
/// 顺序与输入代码顺序一致，而非完成顺序；重复的代码各自对应一个结果。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlBatch {
    pub results: Vec<RegionResult>,
}

impl CrawlBatch {
    pub fn new(results: Vec<RegionResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 按输入顺序返回区域代码
    pub fn regions(&self) -> Vec<RegionCode> {
        self.results.iter().map(|r| r.region).collect()
    }

    /// 总记录数
    pub fn locality_count(&self) -> usize {
        self.results.iter().map(|r| r.localities.len()).sum()
    }
}
