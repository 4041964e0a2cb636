//! 应用状态
//!
//! 账本与基础信息作为显式状态传给每个操作，修改后由调用方显式保存。

use crate::config::Config;
use crate::error::Result;
use crate::importer::{self, ImportOptions, ImportedBudget};
use crate::store::{BaseInfoStore, LedgerStore};
use budget_docgen_common::{BaseInfo, Ledger, ProjectInfo};
use chrono::{Local, NaiveDate};
use std::path::Path;

/// 文档中的日期格式
pub const DISPLAY_DATE_FORMAT: &str = "%Y年%m月%d日";
/// 文件名中的日期格式
pub const STAMP_DATE_FORMAT: &str = "%Y%m%d";

pub struct AppState {
    pub config: Config,
    pub ledger: Ledger,
    pub base_info: BaseInfo,
    ledger_store: LedgerStore,
    base_info_store: BaseInfoStore,
}

impl AppState {
    /// 读取本地数据，返回状态和需要提示的警告
    pub fn open(config: Config) -> (Self, Vec<String>) {
        let ledger_store = LedgerStore::new(config.ledger_path())
            .with_reset_quantities(config.reset_quantities_on_load);
        let base_info_store = BaseInfoStore::new(config.base_info_path());

        let mut warnings = Vec::new();
        let ledger_load = ledger_store.load();
        warnings.extend(ledger_load.warning);
        if ledger_load.dropped > 0 {
            warnings.push(format!("已忽略{}条名称为空的记录", ledger_load.dropped));
        }
        let info_load = base_info_store.load();
        warnings.extend(info_load.warning);

        let state = Self {
            config,
            ledger: ledger_load.ledger,
            base_info: info_load.info,
            ledger_store,
            base_info_store,
        };
        (state, warnings)
    }

    /// 导入预算表并替换当前账本（不保存）
    ///
    /// 导入失败时当前账本保持不变。
    pub fn import(&mut self, path: &Path, options: ImportOptions) -> Result<ImportedBudget> {
        let imported = importer::import_workbook(path, options)?;
        self.ledger = imported.clone().into_ledger();
        Ok(imported)
    }

    pub fn save_ledger(&self) -> Result<()> {
        self.ledger_store.save(&self.ledger)
    }

    pub fn save_base_info(&self) -> Result<()> {
        self.base_info_store.save(&self.base_info)
    }

    pub fn ledger_store(&self) -> &LedgerStore {
        &self.ledger_store
    }

    /// 项目参数，未指定的部分使用配置中的默认值和今天的日期
    pub fn project_info(
        &self,
        name: Option<String>,
        date: Option<NaiveDate>,
        cycle: Option<String>,
    ) -> ProjectInfo {
        let date = date.unwrap_or_else(today);
        ProjectInfo {
            name: non_empty(name).unwrap_or_else(|| self.config.default_project_name.clone()),
            date: date.format(DISPLAY_DATE_FORMAT).to_string(),
            cycle: non_empty(cycle).unwrap_or_else(|| self.config.default_cycle.clone()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn date_stamp(date: NaiveDate) -> String {
    date.format(STAMP_DATE_FORMAT).to_string()
}

/// 日期输入：2026-10-17 / 2026/10/17 / 2026年10月17日 / 20261017
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    ["%Y-%m-%d", "%Y/%m/%d", DISPLAY_DATE_FORMAT, STAMP_DATE_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_docgen_common::{Category, LineItemDraft};

    fn config_in(dir: &Path) -> Config {
        Config {
            data_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_empty_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (state, warnings) = AppState::open(config_in(dir.path()));
        assert!(warnings.is_empty());
        assert!(state.ledger.is_empty());
        // 基础信息文件在首次读取时创建
        assert!(dir.path().join("base_info.json").exists());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, _) = AppState::open(config_in(dir.path()));
        state
            .ledger
            .add_item(LineItemDraft::new(Category::Material, "光猫", 120.0))
            .unwrap();
        state.ledger.set_quantity(1, 2.0).unwrap();
        state.save_ledger().unwrap();

        let (reopened, warnings) = AppState::open(config_in(dir.path()));
        assert!(warnings.is_empty());
        assert_eq!(reopened.ledger.len(), 1);
        assert_eq!(reopened.ledger.items()[0].quantity, 2.0);
    }

    #[test]
    fn test_reset_quantities_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, _) = AppState::open(config_in(dir.path()));
        state
            .ledger
            .add_item(LineItemDraft::new(Category::Material, "光猫", 120.0))
            .unwrap();
        state.ledger.set_quantity(1, 2.0).unwrap();
        state.save_ledger().unwrap();

        let config = Config {
            reset_quantities_on_load: true,
            ..config_in(dir.path())
        };
        let (reopened, _) = AppState::open(config);
        assert_eq!(reopened.ledger.items()[0].quantity, 0.0);
    }

    #[test]
    fn test_failed_import_keeps_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, _) = AppState::open(config_in(dir.path()));
        state
            .ledger
            .add_item(LineItemDraft::new(Category::Material, "光猫", 120.0))
            .unwrap();
        state.ledger.set_quantity(1, 2.0).unwrap();

        // Sheet1 缺少单价列
        let workbook_path = dir.path().join("缺列.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "类别").unwrap();
        sheet.write_string(0, 1, "单价").unwrap();
        sheet.write_string(1, 0, "A").unwrap();
        sheet.write_number(1, 1, 10.0).unwrap();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "材料").unwrap();
        sheet.write_string(0, 1, "含税").unwrap();
        sheet.write_string(1, 0, "C").unwrap();
        sheet.write_number(1, 1, 2.0).unwrap();
        workbook.save(&workbook_path).unwrap();

        let result = state.import(&workbook_path, ImportOptions::default());
        assert!(matches!(result, Err(crate::error::BudgetError::Import(_))));

        let items = state.ledger.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].name, "光猫");
        assert_eq!(items[0].quantity, 2.0);
    }

    #[test]
    fn test_project_info_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = AppState::open(config_in(dir.path()));
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let info = state.project_info(Some("  ".into()), Some(date), None);
        assert_eq!(info.name, "广电项目光猫安装、开通");
        assert_eq!(info.date, "2026年03月05日");
        assert_eq!(info.cycle, "15天");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 17);
        assert_eq!(parse_date("2026-10-17"), expected);
        assert_eq!(parse_date("2026年10月17日"), expected);
        assert_eq!(parse_date("20261017"), expected);
        assert_eq!(parse_date("明天"), None);
        assert_eq!(date_stamp(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()), "20260102");
    }
}
