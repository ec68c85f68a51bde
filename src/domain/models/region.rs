// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 联邦单位代码（UF）
///
/// 巴西一级行政区划的两字母代码，取值范围固定为 27 个。
/// 只有通过校验的代码才能进入区域会话。
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionCode {
    AC,
    AL,
    AP,
    AM,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MT,
    MS,
    MG,
    PA,
    PB,
    PR,
    PE,
    PI,
    RJ,
    RN,
    RS,
    RO,
    RR,
    SC,
    SP,
    SE,
    TO,
}

/// 无效的区域代码
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid region code: {0:?}")]
pub struct ParseRegionError(pub String);

impl RegionCode {
    /// 全部有效代码
    pub const ALL: [RegionCode; 27] = [
        RegionCode::AC,
        RegionCode::AL,
        RegionCode::AP,
        RegionCode::AM,
        RegionCode::BA,
        RegionCode::CE,
        RegionCode::DF,
        RegionCode::ES,
        RegionCode::GO,
        RegionCode::MA,
        RegionCode::MT,
        RegionCode::MS,
        RegionCode::MG,
        RegionCode::PA,
        RegionCode::PB,
        RegionCode::PR,
        RegionCode::PE,
        RegionCode::PI,
        RegionCode::RJ,
        RegionCode::RN,
        RegionCode::RS,
        RegionCode::RO,
        RegionCode::RR,
        RegionCode::SC,
        RegionCode::SP,
        RegionCode::SE,
        RegionCode::TO,
    ];

    /// 返回代码的字符串形式，例如 `"CE"`
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionCode::AC => "AC",
            RegionCode::AL => "AL",
            RegionCode::AP => "AP",
            RegionCode::AM => "AM",
            RegionCode::BA => "BA",
            RegionCode::CE => "CE",
            RegionCode::DF => "DF",
            RegionCode::ES => "ES",
            RegionCode::GO => "GO",
            RegionCode::MA => "MA",
            RegionCode::MT => "MT",
            RegionCode::MS => "MS",
            RegionCode::MG => "MG",
            RegionCode::PA => "PA",
            RegionCode::PB => "PB",
            RegionCode::PR => "PR",
            RegionCode::PE => "PE",
            RegionCode::PI => "PI",
            RegionCode::RJ => "RJ",
            RegionCode::RN => "RN",
            RegionCode::RS => "RS",
            RegionCode::RO => "RO",
            RegionCode::RR => "RR",
            RegionCode::SC => "SC",
            RegionCode::SP => "SP",
            RegionCode::SE => "SE",
            RegionCode::TO => "TO",
        }
    }

    /// 解析用户输入的代码
    ///
    /// 先去除首尾空白，再做精确（区分大小写）匹配。
    ///
    /// # 参数
    ///
    /// * `raw` - 原始输入，可能带有空白
    ///
    /// # 返回值
    ///
    /// * `Ok(RegionCode)` - 有效代码
    /// * `Err(ParseRegionError)` - 代码不在固定集合中，携带去除空白后的输入
    pub fn parse(raw: &str) -> Result<Self, ParseRegionError> {
        let code = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|region| region.as_str() == code)
            .ok_or_else(|| ParseRegionError(code.to_string()))
    }
}

impl FromStr for RegionCode {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
