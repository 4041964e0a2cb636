//! 预算清单Excel生成（共通库）
//!
//! 只导出工程量 > 0 的项目，一行一个项目。

use crate::types::LineItem;
use rust_xlsxwriter::*;

pub const SHEET_NAME: &str = "预算清单";

/// 列标题与列宽
const COLUMNS: [(&str, f64); 7] = [
    ("序号", 6.0),
    ("类别", 10.0),
    ("项目名称", 48.0),
    ("单位", 12.0),
    ("单价（元）", 12.0),
    ("工程量", 10.0),
    ("合计（元）", 12.0),
];

/// 生成预算清单Excel到内存缓冲区
///
/// 返回值为空表示没有可导出的项目。
pub fn generate_budget_buffer(items: &[LineItem]) -> Result<Option<Vec<u8>>, String> {
    let rows: Vec<&LineItem> = items.iter().filter(|i| i.quantity > 0.0).collect();
    if rows.is_empty() {
        return Ok(None);
    }

    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_background_color(Color::RGB(0xE1E4E8))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let text_format = Format::new()
        .set_font_size(10.0)
        .set_align(FormatAlign::Left)
        .set_text_wrap()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let amount_format = Format::new()
        .set_font_size(10.0)
        .set_num_format("0.00")
        .set_align(FormatAlign::Right)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let id_format = amount_format.clone().set_num_format("0").set_align(FormatAlign::Center);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| format!("工作表名称设置错误: {}", e))?;

    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, *width)
            .map_err(|e| format!("列宽设置错误: {}", e))?;
        worksheet
            .write_string_with_format(0, col, *title, &header_format)
            .map_err(|e| format!("标题写入错误: {}", e))?;
    }

    for (idx, item) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet
            .write_number_with_format(row, 0, item.id as f64, &id_format)
            .map_err(|e| format!("序号写入错误: {}", e))?;
        worksheet
            .write_string_with_format(row, 1, item.category.label(), &text_format)
            .map_err(|e| format!("类别写入错误: {}", e))?;
        worksheet
            .write_string_with_format(row, 2, &item.name, &text_format)
            .map_err(|e| format!("名称写入错误: {}", e))?;
        worksheet
            .write_string_with_format(row, 3, &item.unit, &text_format)
            .map_err(|e| format!("单位写入错误: {}", e))?;
        worksheet
            .write_number_with_format(row, 4, item.unit_price, &amount_format)
            .map_err(|e| format!("单价写入错误: {}", e))?;
        worksheet
            .write_number_with_format(row, 5, item.quantity, &amount_format)
            .map_err(|e| format!("工程量写入错误: {}", e))?;
        worksheet
            .write_number_with_format(row, 6, item.total(), &amount_format)
            .map_err(|e| format!("合计写入错误: {}", e))?;
    }

    workbook
        .save_to_buffer()
        .map(Some)
        .map_err(|e| format!("Excel保存错误: {}", e))
}
