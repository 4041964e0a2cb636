//! 工作量清单文本生成

use crate::types::LineItem;

/// 清单项之间的分隔符（全角逗号）
pub const SEPARATOR: &str = "，";
/// 没有工程量 > 0 的项目时的占位文本
pub const EMPTY_PLACEHOLDER: &str = "无有效项目";

/// 单个项目的清单文本: `{工程量:.2}{单位} {名称}`
pub fn format_entry(item: &LineItem) -> String {
    format!("{:.2}{} {}", item.quantity, item.display_unit(), item.name)
}

/// 将工程量 > 0 的项目按账本顺序拼接成清单文本
pub fn format_work_list(items: &[LineItem]) -> String {
    let entries: Vec<String> = items
        .iter()
        .filter(|item| item.quantity > 0.0)
        .map(format_entry)
        .collect();

    if entries.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        entries.join(SEPARATOR)
    }
}
