//! 预算清单Excel导出（CLI版）
//!
//! 表格内容由共通库生成，这里只负责写入文件

use crate::error::{BudgetError, Result};
use budget_docgen_common::export::excel_core;
use budget_docgen_common::Ledger;
use std::path::{Path, PathBuf};

/// 默认文件名: 预算清单_{YYYYMMDD}.xlsx
pub fn default_export_name(date_stamp: &str) -> String {
    format!("{}_{}.xlsx", excel_core::SHEET_NAME, date_stamp)
}

/// 导出工程量 > 0 的项目，返回导出的行数
///
/// `output` 为目录或没有扩展名时，在其中使用默认文件名。
pub fn export_budget(ledger: &Ledger, output: &Path, date_stamp: &str) -> Result<(PathBuf, usize)> {
    let buffer = excel_core::generate_budget_buffer(ledger.items())
        .map_err(BudgetError::ExcelGeneration)?
        .ok_or(BudgetError::NothingToExport)?;

    let output_path = if output.is_dir() || output.extension().is_none() {
        output.join(default_export_name(date_stamp))
    } else {
        output.to_path_buf()
    };
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&output_path, buffer)?;

    let rows = ledger.billable_items().count();
    tracing::debug!(path = %output_path.display(), rows, "预算清单导出完成");
    Ok((output_path, rows))
}
