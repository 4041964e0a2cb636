//! 预算数据的类型定义
//!
//! - LineItem: 账本中的一条计价项目（施工项目 / 材料项目）
//! - LineItemDraft: 导入或新增时尚未编号的项目
//! - BaseInfo: 申请单位、联系人等与具体项目无关的基础信息
//! - ProjectInfo: 单次生成文档时的项目参数

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 长度类项目的单位
pub const LENGTH_UNIT: &str = "公里";
/// 施工项目（非长度类）的默认单位
pub const CONSTRUCTION_UNIT: &str = "个/户/处等";
/// 材料项目的默认单位
pub const MATERIAL_UNIT: &str = "个";

/// 项目类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "施工项目", alias = "construction")]
    Construction,
    #[serde(rename = "材料项目", alias = "material")]
    Material,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Construction => "施工项目",
            Category::Material => "材料项目",
        }
    }

    /// 导入时未给出单位的默认值
    pub fn default_unit(&self, is_length_unit: bool) -> &'static str {
        match self {
            Category::Construction if is_length_unit => LENGTH_UNIT,
            Category::Construction => CONSTRUCTION_UNIT,
            Category::Material => MATERIAL_UNIT,
        }
    }

    /// 手工新增时未填写单位的默认值
    pub fn manual_unit(&self) -> &'static str {
        match self {
            Category::Construction => LENGTH_UNIT,
            Category::Material => MATERIAL_UNIT,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "construction" | "c" | "施工" | "施工项目" => Ok(Category::Construction),
            "material" | "m" | "材料" | "材料项目" => Ok(Category::Material),
            _ => Err(format!("Unknown category: {}. Use construction or material", s)),
        }
    }
}

/// 账本内不随删除而变化的项目标识
///
/// 显示用的 `id` 在每次增删后重新编号为 1..N，`ItemKey` 在同一账本的生命周期内
/// 单调递增且不复用，不写入持久化文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(pub u64);

/// 尚未编号的项目（导入结果或新增输入）
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemDraft {
    pub category: Category,
    pub name: String,
    pub unit: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub is_length_unit: bool,
}

impl LineItemDraft {
    pub fn new(category: Category, name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            category,
            name: name.into(),
            unit: category.default_unit(false).to_string(),
            unit_price,
            quantity: 0.0,
            is_length_unit: false,
        }
    }
}

/// 账本中的一条计价项目
///
/// 合计金额不单独保存，始终由 `quantity * unit_price` 计算。
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: usize,
    pub key: ItemKey,
    pub category: Category,
    pub name: String,
    pub unit: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub is_length_unit: bool,
}

impl LineItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// 工作量清单中使用的单位
    pub fn display_unit(&self) -> &str {
        if self.is_length_unit {
            LENGTH_UNIT
        } else {
            &self.unit
        }
    }
}

/// 基础信息的固定键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseInfoKey {
    ApplicantOrg,
    Applicant,
    Phone,
    ImplementingOrg,
    Manager,
    ManagerPhone,
    ResponsiblePerson,
}

impl BaseInfoKey {
    pub const ALL: [BaseInfoKey; 7] = [
        BaseInfoKey::ApplicantOrg,
        BaseInfoKey::Applicant,
        BaseInfoKey::Phone,
        BaseInfoKey::ImplementingOrg,
        BaseInfoKey::Manager,
        BaseInfoKey::ManagerPhone,
        BaseInfoKey::ResponsiblePerson,
    ];

    /// 配置文件中的键名
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseInfoKey::ApplicantOrg => "申请单位",
            BaseInfoKey::Applicant => "申请人",
            BaseInfoKey::Phone => "联系电话",
            BaseInfoKey::ImplementingOrg => "实施单位",
            BaseInfoKey::Manager => "项目经理",
            BaseInfoKey::ManagerPhone => "项目经理联系电话",
            BaseInfoKey::ResponsiblePerson => "项目负责人",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.iter().copied().find(|k| k.as_str() == label)
    }
}

/// 基础信息（扁平的 键 → 文本 映射）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseInfo {
    entries: BTreeMap<String, String>,
}

impl Default for BaseInfo {
    fn default() -> Self {
        let entries = BaseInfoKey::ALL
            .iter()
            .map(|k| (k.as_str().to_string(), String::new()))
            .collect();
        Self { entries }
    }
}

impl BaseInfo {
    /// 补齐缺失的固定键，返回补齐的数量
    pub fn backfill_defaults(&mut self) -> usize {
        let mut added = 0;
        for key in BaseInfoKey::ALL {
            if !self.entries.contains_key(key.as_str()) {
                self.entries.insert(key.as_str().to_string(), String::new());
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, key: BaseInfoKey) -> &str {
        self.entries.get(key.as_str()).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: BaseInfoKey, value: &str) {
        self.entries.insert(key.as_str().to_string(), value.trim().to_string());
    }

    /// 按任意键名设置（保留模板中可能使用的自定义键）
    pub fn set_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.trim().to_string(), value.trim().to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// 生成文档时使用的项目参数
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInfo {
    pub name: String,
    /// 已格式化的项目日期（例: 2026年10月17日）
    pub date: String,
    /// 实施周期（例: 15天）
    pub cycle: String,
}
