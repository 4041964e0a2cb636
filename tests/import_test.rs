//! 预算表导入测试

mod support;

use budget_docgen::config::QuantitySource;
use budget_docgen::error::BudgetError;
use budget_docgen::importer::{import_workbook, ImportOptions};
use budget_docgen_common::Category;
use support::{rows, write_standard_budget, write_workbook};
use tempfile::tempdir;

/// 标准预算表：3个项目，按表内顺序编号，工程量全部为0
#[test]
fn test_import_standard_budget() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("预算表.xlsx");
    write_standard_budget(&path);

    let result = import_workbook(&path, ImportOptions::default());
    assert!(result.is_ok(), "导入失败: {:?}", result.err());
    let imported = result.unwrap();
    assert_eq!(imported.construction.len(), 2);
    assert_eq!(imported.material.len(), 1);

    let ledger = imported.into_ledger();
    let items = ledger.items();
    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(items.iter().all(|i| i.quantity == 0.0));

    assert_eq!(items[0].name, "A (元/公里)");
    assert!(items[0].is_length_unit, "含「元/公里」的施工项目应按公里计量");
    assert_eq!(items[0].unit_price, 10.0);
    assert!(!items[1].is_length_unit);
    assert_eq!(items[2].category, Category::Material);
    assert_eq!(items[2].unit_price, 2.0);
    assert!(!items[2].is_length_unit);

    assert_eq!(ledger.recompute_totals().grand_total, 0.0);
}

/// 工程量来源为 sheet 时读取「工程量」列
#[test]
fn test_import_quantities_from_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("预算表.xlsx");
    write_workbook(
        &path,
        &[
            (
                &["类别", "折扣后（含税）37%/元", "工程量"],
                rows(&[&["A (元/公里)", "10", "2"], &["B", "5", ""]]),
            ),
            (&["材料", "含税", "工程量"], rows(&[&["C", "2", "3"]])),
        ],
    );

    let imported = import_workbook(
        &path,
        ImportOptions {
            quantity_source: QuantitySource::Sheet,
        },
    )
    .unwrap();
    let ledger = imported.into_ledger();
    let quantities: Vec<f64> = ledger.items().iter().map(|i| i.quantity).collect();
    assert_eq!(quantities, vec![2.0, 0.0, 3.0]);
    assert_eq!(ledger.recompute_totals().grand_total, 26.0);
}

/// 缺少必要列
#[test]
fn test_import_missing_column() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("缺列.xlsx");
    write_workbook(
        &path,
        &[
            (&["类别", "单价"], rows(&[&["A", "10"]])),
            (&["材料", "含税"], rows(&[&["C", "2"]])),
        ],
    );

    match import_workbook(&path, ImportOptions::default()) {
        Err(BudgetError::Import(msg)) => {
            assert!(msg.contains("Sheet1"), "应指明工作表: {}", msg);
            assert!(msg.contains("折扣后（含税）37%/元"), "应列出缺少的列: {}", msg);
        }
        other => panic!("应返回导入错误: {:?}", other.map(|i| i.len())),
    }
}

/// 名称全部为空的工作表视为无有效数据
#[test]
fn test_import_sheet_without_valid_rows() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("空数据.xlsx");
    write_workbook(
        &path,
        &[
            (&["类别", "折扣后（含税）37%/元"], rows(&[&["A", "10"]])),
            (&["材料", "含税"], rows(&[&["", "2"], &["nan", "3"]])),
        ],
    );

    let result = import_workbook(&path, ImportOptions::default());
    assert!(
        matches!(&result, Err(BudgetError::Import(msg)) if msg.contains("Sheet2")),
        "材料表无有效数据时应失败"
    );
}

/// 只有一个工作表
#[test]
fn test_import_missing_second_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("单表.xlsx");
    write_workbook(
        &path,
        &[(&["类别", "折扣后（含税）37%/元"], rows(&[&["A", "10"]]))],
    );

    let result = import_workbook(&path, ImportOptions::default());
    assert!(matches!(&result, Err(BudgetError::Import(msg)) if msg.contains("Sheet2不存在")));
}

#[test]
fn test_import_file_not_found() {
    let result = import_workbook(
        std::path::Path::new("/nonexistent/预算表.xlsx"),
        ImportOptions::default(),
    );
    assert!(matches!(result, Err(BudgetError::FileNotFound(_))));
}

/// 不是 Excel 的文件
#[test]
fn test_import_not_a_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("预算表.xlsx");
    std::fs::write(&path, b"not a workbook").unwrap();

    let result = import_workbook(&path, ImportOptions::default());
    assert!(matches!(result, Err(BudgetError::Import(_))));
}
