//! 本地数据 (budget_data.json / base_info.json) 读写测试

mod support;

use budget_docgen::store::{BaseInfoStore, LedgerStore};
use budget_docgen_common::{BaseInfoKey, Category, LineItemDraft};
use support::{sample_base_info, scenario_ledger};
use tempfile::tempdir;

/// 保存后重新读取，项目与工程量保持不变
#[test]
fn test_ledger_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = LedgerStore::new(dir.path().join("budget_data.json"));
    let ledger = scenario_ledger();

    let result = store.save(&ledger);
    assert!(result.is_ok(), "保存失败: {:?}", result.err());

    let loaded = store.load();
    assert!(loaded.warning.is_none());
    assert_eq!(loaded.dropped, 0);
    assert_eq!(loaded.ledger.items(), ledger.items());
    assert_eq!(loaded.ledger.recompute_totals().grand_total, 26.0);
}

/// 读取 → 保存 → 读取 结果一致
#[test]
fn test_ledger_reload_is_stable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = LedgerStore::new(dir.path().join("budget_data.json"));
    store.save(&scenario_ledger()).unwrap();

    let first = store.load().ledger;
    store.save(&first).unwrap();
    let first_json = std::fs::read_to_string(store.path()).unwrap();
    let second = store.load().ledger;
    store.save(&second).unwrap();
    let second_json = std::fs::read_to_string(store.path()).unwrap();

    assert_eq!(first.items(), second.items());
    assert_eq!(first_json, second_json);
}

#[test]
fn test_ledger_missing_file_is_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = LedgerStore::new(dir.path().join("budget_data.json"));
    assert!(!store.exists());

    let loaded = store.load();
    assert!(loaded.ledger.is_empty());
    assert!(loaded.warning.is_none());
}

/// 文件损坏时返回空账本和提示，不返回错误
#[test]
fn test_ledger_corrupt_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("budget_data.json");
    std::fs::write(&path, "[{\"category\": ").unwrap();

    let loaded = LedgerStore::new(&path).load();
    assert!(loaded.ledger.is_empty());
    let warning = loaded.warning.expect("应返回警告");
    assert!(warning.contains("重新导入"), "警告内容: {}", warning);
}

/// 文件中的 id 与 total 不作为依据
#[test]
fn test_ledger_ids_renumbered_and_totals_recomputed() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("budget_data.json");
    let json = r#"[
        {"id": 7, "category": "施工项目", "name": "A (元/公里)", "unit": "公里",
         "unitPrice": 10, "quantity": 2, "total": 999, "isLengthUnit": true},
        {"id": 3, "category": "材料项目", "name": "  ", "unitPrice": 1, "quantity": 1},
        {"id": 9, "category": "材料项目", "name": "C", "unit_price": 2, "quantity": 3, "total": 0}
    ]"#;
    std::fs::write(&path, json).unwrap();

    let loaded = LedgerStore::new(&path).load();
    assert_eq!(loaded.dropped, 1, "名称为空的记录应被忽略");
    let items = loaded.ledger.items();
    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(items[0].total(), 20.0);
    assert_eq!(items[1].unit_price, 2.0);
    assert_eq!(loaded.ledger.recompute_totals().grand_total, 26.0);
}

/// 读取时工程量清零
#[test]
fn test_ledger_reset_quantities_on_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("budget_data.json");
    LedgerStore::new(&path).save(&scenario_ledger()).unwrap();

    let loaded = LedgerStore::new(&path).with_reset_quantities(true).load();
    assert_eq!(loaded.ledger.len(), 3);
    assert!(loaded.ledger.items().iter().all(|i| i.quantity == 0.0));
}

/// 保存位置不可写时返回 Persistence 错误
#[test]
fn test_ledger_save_failure() {
    let dir = tempdir().expect("Failed to create temp dir");
    let blocker = dir.path().join("不是目录");
    std::fs::write(&blocker, "x").unwrap();

    let store = LedgerStore::new(blocker.join("budget_data.json"));
    let mut ledger = scenario_ledger();
    ledger
        .add_item(LineItemDraft::new(Category::Material, "尾纤", 3.0))
        .unwrap();
    let result = store.save(&ledger);
    assert!(matches!(result, Err(budget_docgen::error::BudgetError::Persistence(_))));
}

/// 基础信息：首次读取创建默认文件，之后读回保存的值
#[test]
fn test_base_info_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = BaseInfoStore::new(dir.path().join("base_info.json"));

    let first = store.load();
    assert!(first.warning.is_none());
    assert!(store.path().exists(), "首次读取时应创建默认文件");
    assert!(first.info.iter().all(|(_, v)| v.is_empty()));

    store.save(&sample_base_info()).unwrap();
    let loaded = store.load();
    assert_eq!(loaded.info.get(BaseInfoKey::Applicant), "张三");
    assert_eq!(loaded.info.get(BaseInfoKey::ManagerPhone), "13900000000");
}

/// 缺少的键用默认值补齐
#[test]
fn test_base_info_backfill() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("base_info.json");
    std::fs::write(&path, r#"{"申请人": "张三"}"#).unwrap();

    let loaded = BaseInfoStore::new(&path).load();
    assert!(loaded.warning.is_none());
    assert_eq!(loaded.info.get(BaseInfoKey::Applicant), "张三");
    assert_eq!(loaded.info.get(BaseInfoKey::Manager), "");
    assert_eq!(loaded.info.iter().count(), BaseInfoKey::ALL.len());
}
