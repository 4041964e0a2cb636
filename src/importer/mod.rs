//! 家集客预算表导入
//!
//! 第一个工作表为施工项目，第二个工作表为材料项目。两个表必须都解析成功，
//! 否则整个导入作废。

pub mod sheet;

use crate::config::QuantitySource;
use crate::error::{BudgetError, Result};
use budget_docgen_common::types::LENGTH_UNIT;
use budget_docgen_common::{Category, Ledger, LineItemDraft};
use calamine::{open_workbook_auto, Reader, Sheets};
use sheet::SheetTable;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use sheet::{cell_number, cell_text};

/// 施工项目表: 项目名称列
pub const CONSTRUCTION_LABEL_COLUMN: &str = "类别";
/// 施工项目表: 折扣后单价列
pub const CONSTRUCTION_PRICE_COLUMN: &str = "折扣后（含税）37%/元";
/// 材料表: 材料名称列
pub const MATERIAL_NAME_COLUMN: &str = "材料";
/// 材料表: 含税单价列
pub const MATERIAL_PRICE_COLUMN: &str = "含税";
/// 可选的工程量列
pub const QUANTITY_COLUMN: &str = "工程量";
/// 名称中包含此标记的施工项目按公里计量
pub const LENGTH_MARKER: &str = "元/公里";
/// 视为空值的占位文本
const NOT_A_VALUE: &str = "nan";

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub quantity_source: QuantitySource,
}

/// 导入结果（尚未编号）
#[derive(Debug, Clone, Default)]
pub struct ImportedBudget {
    pub construction: Vec<LineItemDraft>,
    pub material: Vec<LineItemDraft>,
    /// 名称为空或为占位值而跳过的行数
    pub skipped_rows: usize,
}

impl ImportedBudget {
    pub fn len(&self) -> usize {
        self.construction.len() + self.material.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 施工项目在前、材料项目在后，编号为 1..N
    pub fn into_ledger(self) -> Ledger {
        Ledger::from_drafts(self.construction.into_iter().chain(self.material))
    }
}

/// 读取预算表（Sheet1 施工项目，Sheet2 材料项目）
pub fn import_workbook(path: &Path, options: ImportOptions) -> Result<ImportedBudget> {
    if !path.exists() {
        return Err(BudgetError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| BudgetError::Import(format!("无法打开Excel文件: {}", e)))?;

    let construction = read_sheet(&mut workbook, 0, "Sheet1")?;
    let mut imported = ImportedBudget::default();
    let (drafts, skipped) = parse_construction_sheet(&construction, options)?;
    imported.construction = drafts;
    imported.skipped_rows += skipped;

    let material = read_sheet(&mut workbook, 1, "Sheet2")?;
    let (drafts, skipped) = parse_material_sheet(&material, options)?;
    imported.material = drafts;
    imported.skipped_rows += skipped;

    tracing::debug!(
        construction = imported.construction.len(),
        material = imported.material.len(),
        skipped = imported.skipped_rows,
        "预算表解析完成"
    );
    Ok(imported)
}

fn read_sheet(
    workbook: &mut Sheets<BufReader<File>>,
    index: usize,
    label: &str,
) -> Result<SheetTable> {
    let range = workbook
        .worksheet_range_at(index)
        .ok_or_else(|| BudgetError::Import(format!("{}不存在", label)))?
        .map_err(|e| BudgetError::Import(format!("{}读取失败: {}", label, e)))?;
    let table = SheetTable::from_range(&range);
    if table.is_empty() {
        return Err(BudgetError::Import(format!("{}为空", label)));
    }
    Ok(table)
}

/// 解析施工项目表，返回 (项目, 跳过的行数)
pub fn parse_construction_sheet(
    table: &SheetTable,
    options: ImportOptions,
) -> Result<(Vec<LineItemDraft>, usize)> {
    parse_sheet(
        table,
        "Sheet1",
        Category::Construction,
        CONSTRUCTION_LABEL_COLUMN,
        CONSTRUCTION_PRICE_COLUMN,
        options,
    )
}

/// 解析材料表，返回 (项目, 跳过的行数)
pub fn parse_material_sheet(
    table: &SheetTable,
    options: ImportOptions,
) -> Result<(Vec<LineItemDraft>, usize)> {
    parse_sheet(
        table,
        "Sheet2",
        Category::Material,
        MATERIAL_NAME_COLUMN,
        MATERIAL_PRICE_COLUMN,
        options,
    )
}

fn parse_sheet(
    table: &SheetTable,
    label: &str,
    category: Category,
    name_column: &str,
    price_column: &str,
    options: ImportOptions,
) -> Result<(Vec<LineItemDraft>, usize)> {
    if table.is_empty() {
        return Err(BudgetError::Import(format!("{}为空", label)));
    }

    let missing = table.missing_columns(&[name_column, price_column]);
    if !missing.is_empty() {
        return Err(BudgetError::Import(format!(
            "{}缺少必要列：{}",
            label,
            missing.join(", ")
        )));
    }

    let (Some(name_col), Some(price_col)) = (table.column(name_column), table.column(price_column))
    else {
        return Err(BudgetError::Import(format!("{}缺少必要列", label)));
    };
    let quantity_col = match options.quantity_source {
        QuantitySource::Sheet => table.column(QUANTITY_COLUMN),
        QuantitySource::Zero => None,
    };

    let mut drafts = Vec::new();
    let mut skipped = 0;
    for row in 0..table.row_count() {
        let name = table.text(row, name_col);
        if name.is_empty() || name == NOT_A_VALUE {
            skipped += 1;
            continue;
        }

        let is_length_unit = category == Category::Construction && name.contains(LENGTH_MARKER);
        let unit = if is_length_unit {
            LENGTH_UNIT.to_string()
        } else {
            category.default_unit(false).to_string()
        };
        let quantity = quantity_col.map(|col| table.number(row, col)).unwrap_or(0.0);

        drafts.push(LineItemDraft {
            category,
            name,
            unit,
            unit_price: table.number(row, price_col),
            quantity,
            is_length_unit,
        });
    }

    if drafts.is_empty() {
        return Err(BudgetError::Import(format!("{}无有效数据", label)));
    }
    Ok((drafts, skipped))
}
