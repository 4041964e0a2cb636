//! 预算账本文件 (budget_data.json)

use crate::error::{BudgetError, Result};
use budget_docgen_common::{Category, Ledger, LineItem, LineItemDraft};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 文件中的一条记录
///
/// `id` 与 `total` 仅供阅读，读取时 `id` 按顺序重新编号，`total` 由
/// 工程量与单价重新计算。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    #[serde(default)]
    pub id: usize,
    pub category: Category,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, alias = "unit_price")]
    pub unit_price: f64,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default, alias = "is_length", alias = "is_length_unit")]
    pub is_length_unit: bool,
}

impl From<&LineItem> for LedgerRecord {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id,
            category: item.category,
            name: item.name.clone(),
            unit: item.unit.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            total: item.total(),
            is_length_unit: item.is_length_unit,
        }
    }
}

impl LedgerRecord {
    /// 记录转为待编号项目，名称为空的记录返回 None
    fn into_draft(self) -> Option<LineItemDraft> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return None;
        }
        let is_length_unit = self.is_length_unit && self.category == Category::Construction;
        let unit = match self.unit.trim() {
            "" => self.category.default_unit(is_length_unit).to_string(),
            unit => unit.to_string(),
        };
        Some(LineItemDraft {
            category: self.category,
            name,
            unit,
            unit_price: non_negative(self.unit_price),
            quantity: non_negative(self.quantity),
            is_length_unit,
        })
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// 读取结果
#[derive(Debug, Default)]
pub struct LedgerLoad {
    pub ledger: Ledger,
    /// 文件损坏或无法读取时的提示，此时 `ledger` 为空
    pub warning: Option<String>,
    /// 因名称为空而丢弃的记录数
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    reset_quantities: bool,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reset_quantities: false,
        }
    }

    /// 读取后将所有工程量清零
    pub fn with_reset_quantities(mut self, reset: bool) -> Self {
        self.reset_quantities = reset;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// 读取账本（不返回错误）
    ///
    /// 文件不存在时返回空账本；文件损坏时返回空账本和警告。
    pub fn load(&self) -> LedgerLoad {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "账本文件不存在，使用空账本");
            return LedgerLoad::default();
        }

        let records = match self.read_records() {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "账本文件读取失败");
                return LedgerLoad {
                    warning: Some(format!("本地数据读取失败，请重新导入预算表: {}", e)),
                    ..Default::default()
                };
            }
        };

        let total_records = records.len();
        let drafts: Vec<LineItemDraft> = records
            .into_iter()
            .filter_map(LedgerRecord::into_draft)
            .collect();
        let dropped = total_records - drafts.len();

        let mut ledger = Ledger::from_drafts(drafts);
        if self.reset_quantities {
            ledger.reset_quantities();
        }
        tracing::debug!(items = ledger.len(), dropped, "账本读取完成");

        LedgerLoad {
            ledger,
            warning: None,
            dropped,
        }
    }

    fn read_records(&self) -> Result<Vec<LedgerRecord>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// 整体覆盖保存
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        self.write_records(ledger)
            .map_err(|e| BudgetError::Persistence(format!("{}: {}", self.path.display(), e)))
    }

    fn write_records(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let records: Vec<LedgerRecord> = ledger.items().iter().map(LedgerRecord::from).collect();
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &records)?;
        writer.flush()?;
        Ok(())
    }
}
