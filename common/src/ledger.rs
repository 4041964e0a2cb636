//! 预算账本
//!
//! 项目按插入顺序保存。显示用的 `id` 在每次新增/删除后重新编号为 1..N，
//! 合计金额始终由 `quantity * unit_price` 计算，不单独保存。

use crate::error::{Error, Result};
use crate::types::{Category, ItemKey, LineItem, LineItemDraft};

/// 修改项目时的字段（None 表示保持不变）
#[derive(Debug, Clone, Default)]
pub struct ItemEdit {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub quantity: Option<f64>,
    pub is_length_unit: Option<bool>,
}

/// 金额汇总
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerTotals {
    pub grand_total: f64,
    pub construction_total: f64,
    pub material_total: f64,
    /// 工程量 > 0 的项目数
    pub billable_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    items: Vec<LineItem>,
    next_key: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按顺序编号构建账本（导入或从文件恢复）
    pub fn from_drafts(drafts: impl IntoIterator<Item = LineItemDraft>) -> Self {
        let mut ledger = Self::new();
        for draft in drafts {
            ledger.push(draft);
        }
        ledger
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: usize) -> Result<&LineItem> {
        self.items.iter().find(|i| i.id == id).ok_or(Error::NotFound(id))
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(move |i| i.category == category)
    }

    /// 工程量 > 0 的项目
    pub fn billable_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|i| i.quantity > 0.0)
    }

    pub fn key_of(&self, id: usize) -> Option<ItemKey> {
        self.items.iter().find(|i| i.id == id).map(|i| i.key)
    }

    /// 删除操作后用稳定标识重新取得当前的显示ID
    pub fn id_of(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().find(|i| i.key == key).map(|i| i.id)
    }

    /// 新增项目，返回新项目的ID（= 当前项目数）
    pub fn add_item(&mut self, draft: LineItemDraft) -> Result<usize> {
        let draft = validate_draft(draft)?;
        Ok(self.push(draft))
    }

    pub fn edit_item(&mut self, id: usize, edit: ItemEdit) -> Result<()> {
        let index = self.index_of(id)?;

        // 先校验全部字段，失败时不修改任何状态
        let name = match edit.name {
            Some(name) => Some(validate_name(&name)?),
            None => None,
        };
        if let Some(price) = edit.unit_price {
            validate_amount("单价", price)?;
        }
        if let Some(quantity) = edit.quantity {
            validate_amount("工程量", quantity)?;
        }
        let item = &mut self.items[index];
        if edit.is_length_unit == Some(true) && item.category == Category::Material {
            return Err(Error::Validation("材料项目不能设为长度类".into()));
        }

        if let Some(name) = name {
            item.name = name;
        }
        if let Some(unit) = edit.unit {
            // 空单位保持原值
            let unit = unit.trim();
            if !unit.is_empty() {
                item.unit = unit.to_string();
            }
        }
        if let Some(price) = edit.unit_price {
            item.unit_price = price;
        }
        if let Some(quantity) = edit.quantity {
            item.quantity = quantity;
        }
        if let Some(is_length) = edit.is_length_unit {
            item.is_length_unit = is_length;
        }
        Ok(())
    }

    /// 删除项目并将剩余项目重新编号为 1..N（保持相对顺序）
    pub fn delete_item(&mut self, id: usize) -> Result<LineItem> {
        let index = self.index_of(id)?;
        let removed = self.items.remove(index);
        self.renumber();
        Ok(removed)
    }

    pub fn set_quantity(&mut self, id: usize, quantity: f64) -> Result<()> {
        let index = self.index_of(id)?;
        validate_amount("工程量", quantity)?;
        self.items[index].quantity = quantity;
        Ok(())
    }

    /// 所有项目工程量清零（导入新预算表后的初始状态）
    pub fn reset_quantities(&mut self) {
        for item in &mut self.items {
            item.quantity = 0.0;
        }
    }

    pub fn recompute_totals(&self) -> LedgerTotals {
        let mut totals = LedgerTotals::default();
        for item in &self.items {
            let total = item.total();
            totals.grand_total += total;
            match item.category {
                Category::Construction => totals.construction_total += total,
                Category::Material => totals.material_total += total,
            }
            if item.quantity > 0.0 {
                totals.billable_count += 1;
            }
        }
        totals
    }

    fn push(&mut self, draft: LineItemDraft) -> usize {
        let key = ItemKey(self.next_key);
        self.next_key += 1;
        let id = self.items.len() + 1;
        self.items.push(LineItem {
            id,
            key,
            category: draft.category,
            name: draft.name,
            unit: draft.unit,
            unit_price: draft.unit_price,
            quantity: draft.quantity,
            is_length_unit: draft.is_length_unit,
        });
        id
    }

    fn index_of(&self, id: usize) -> Result<usize> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(Error::NotFound(id))
    }

    fn renumber(&mut self) {
        for (idx, item) in self.items.iter_mut().enumerate() {
            item.id = idx + 1;
        }
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("项目名称不能为空".into()));
    }
    Ok(name.to_string())
}

fn validate_amount(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::Validation(format!("{}不是有效数字", label)));
    }
    if value < 0.0 {
        return Err(Error::Validation(format!("{}不能为负数: {}", label, value)));
    }
    Ok(())
}

fn validate_draft(mut draft: LineItemDraft) -> Result<LineItemDraft> {
    draft.name = validate_name(&draft.name)?;
    validate_amount("单价", draft.unit_price)?;
    validate_amount("工程量", draft.quantity)?;
    if draft.category == Category::Material {
        draft.is_length_unit = false;
    }
    let unit = draft.unit.trim();
    draft.unit = if unit.is_empty() {
        draft.category.manual_unit().to_string()
    } else {
        unit.to_string()
    };
    Ok(draft)
}
