// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::domain::models::locality::LocalityRecord;

/// 首页的数据表格：第一个表格是区域汇总，第二个才是地点列表
const FIRST_PAGE_ROWS: &str = r#"table[class*="tmptabela"]:nth-of-type(2) tbody tr"#;
/// 翻页后只剩地点列表
const NEXT_PAGE_ROWS: &str = r#"table[class*="tmptabela"]:nth-of-type(1) tbody tr"#;
/// 下一页按钮所在的表单
pub const NEXT_PAGE_FORM: &str = r#"form[name="Proxima"]"#;

static FIRST_PAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| parse(FIRST_PAGE_ROWS));
static NEXT_PAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| parse(NEXT_PAGE_ROWS));
static NEXT_FORM_SELECTOR: Lazy<Selector> = Lazy::new(|| parse(NEXT_PAGE_FORM));
static NAME_CELL: Lazy<Selector> = Lazy::new(|| parse("td:nth-child(1)"));
static RANGE_CELL: Lazy<Selector> = Lazy::new(|| parse("td:nth-child(2)"));

fn parse(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector is valid")
}

/// 提取错误类型
///
/// 只用于调用方传入的结构性错误。没有数据行、没有表格都不是错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// 片段为空
    #[error("markup fragment is empty")]
    EmptyFragment,
    /// 片段中没有任何元素
    #[error("markup fragment contains no elements")]
    NotMarkup,
}

/// 页面类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// 提交搜索后的第一页
    First,
    /// 翻页得到的后续页面
    Subsequent,
}

impl PageKind {
    fn row_selector(self) -> &'static Selector {
        match self {
            PageKind::First => &FIRST_PAGE_SELECTOR,
            PageKind::Subsequent => &NEXT_PAGE_SELECTOR,
        }
    }
}

/// 地点提取器
///
/// 从结果面板的HTML片段中提取地点记录
pub struct LocalityExtractor;

impl LocalityExtractor {
    /// 提取一页的地点记录
    ///
    /// 第1列为名称，第2列为邮编区间，均不做修剪。名称为空的行（如表头）被丢弃；
    /// 区间为空的行仍然保留。每条记录都获得新的 `id`。
    ///
    /// # 参数
    ///
    /// * `markup` - 结果面板的外部HTML
    /// * `kind` - 页面类型，决定使用第几个表格
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<LocalityRecord>)` - 按行顺序排列的记录，没有表格时为空
    /// * `Err(ExtractionError)` - 片段结构错误
    pub fn extract(markup: &str, kind: PageKind) -> Result<Vec<LocalityRecord>, ExtractionError> {
        let fragment = Self::parse_fragment(markup)?;

        let records = fragment
            .select(kind.row_selector())
            .filter_map(|row| {
                let name = cell_text(row, &NAME_CELL);
                if name.is_empty() {
                    return None;
                }
                Some(LocalityRecord::new(name, cell_text(row, &RANGE_CELL)))
            })
            .collect();

        Ok(records)
    }

    /// 片段中是否存在下一页按钮
    pub fn has_next_page(markup: &str) -> bool {
        Html::parse_fragment(markup)
            .select(&NEXT_FORM_SELECTOR)
            .next()
            .is_some()
    }

    fn parse_fragment(markup: &str) -> Result<Html, ExtractionError> {
        if markup.trim().is_empty() {
            return Err(ExtractionError::EmptyFragment);
        }

        let fragment = Html::parse_fragment(markup);
        // parse_fragment wraps everything in a synthetic <html> root
        let has_elements = fragment
            .root_element()
            .descendants()
            .skip(1)
            .any(|node| node.value().is_element());
        if !has_elements {
            return Err(ExtractionError::NotMarkup);
        }
        Ok(fragment)
    }
}

/// Text of the first matching cell, concatenated verbatim.
fn cell_text(row: ElementRef<'_>, cell: &Selector) -> String {
    row.select(cell)
        .next()
        .map(|td| td.text().collect::<String>())
        .unwrap_or_default()
}
