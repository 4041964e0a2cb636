//! 申请表 / 会审单的填写布局
//!
//! 每张表由两部分组成：
//! - 固定坐标填写（模板第一张表格的 行, 列）
//! - 关键字定位填写：按行优先顺序查找第一个包含任一关键字的单元格，写入其右侧
//!   一列（已在最后一列时写入该列）。未找到时使用后备坐标，并以 `Located::Fallback`
//!   告知调用方。

use crate::types::{BaseInfo, BaseInfoKey, ProjectInfo};

/// 段落对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellStyle {
    pub alignment: Option<Alignment>,
    /// 字号（磅）
    pub font_size_pt: Option<f32>,
}

impl CellStyle {
    pub const fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
            font_size_pt: None,
        }
    }

    pub const fn sized(alignment: Alignment, font_size_pt: f32) -> Self {
        Self {
            alignment: Some(alignment),
            font_size_pt: Some(font_size_pt),
        }
    }
}

/// 固定坐标单元格的填写内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillValue {
    Info(BaseInfoKey),
    ProjectDate,
    Cycle,
    TotalAmount,
}

#[derive(Debug, Clone, Copy)]
pub struct FixedFill {
    pub row: usize,
    pub col: usize,
    pub value: FillValue,
    pub style: CellStyle,
}

/// 按关键字定位的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ProjectName,
    WorkList,
    ConstructionPlan,
    SupportingFiles,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::ProjectName => "项目名称",
            Field::WorkList => "工作量清单",
            Field::ConstructionPlan => "施工方实施计划",
            Field::SupportingFiles => "其他需求支撑文件",
        }
    }
}

/// 关键字未命中时的后备锚点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    At { row: usize, col: usize },
    /// 倒数第 `rows_from_end` 行（不足时为第 0 行）
    FromBottom { rows_from_end: usize, col: usize },
    /// 倒数第 `rows_from_end` 行的最后一列
    LastColumnFromBottom { rows_from_end: usize },
    /// 已定位字段锚点的下一行
    Below(Field),
}

#[derive(Debug, Clone, Copy)]
pub struct LocateRule {
    pub field: Field,
    pub keywords: &'static [&'static str],
    pub fallback: Fallback,
}

/// 定位字段写入的内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatedContent {
    ProjectName,
    WorkList { prefix: &'static str },
    ConstructionPlan,
    Images,
}

#[derive(Debug, Clone, Copy)]
pub struct LocatedFill {
    pub rule: LocateRule,
    pub content: LocatedContent,
    pub style: CellStyle,
}

/// 一张表单的完整布局
#[derive(Debug, Clone, Copy)]
pub struct FormLayout {
    pub title: &'static str,
    pub fixed: &'static [FixedFill],
    /// 按顺序执行；后面的查找可以看到前面写入的文本
    pub located: &'static [LocatedFill],
}

const fn fixed(row: usize, col: usize, value: FillValue, alignment: Alignment) -> FixedFill {
    FixedFill {
        row,
        col,
        value,
        style: CellStyle::aligned(alignment),
    }
}

const PROJECT_NAME_KEYWORDS: &[&str] = &["维修项目名称", "项目名称"];

/// 申请表
pub const APPLICATION_FORM: FormLayout = FormLayout {
    title: "申请表",
    fixed: &[
        fixed(0, 1, FillValue::Info(BaseInfoKey::ApplicantOrg), Alignment::Left),
        fixed(0, 3, FillValue::ProjectDate, Alignment::Center),
        fixed(0, 4, FillValue::ProjectDate, Alignment::Center),
        fixed(0, 6, FillValue::Info(BaseInfoKey::Applicant), Alignment::Left),
        fixed(1, 6, FillValue::Info(BaseInfoKey::Phone), Alignment::Left),
        fixed(2, 1, FillValue::Cycle, Alignment::Left),
        fixed(2, 3, FillValue::TotalAmount, Alignment::Center),
        fixed(2, 4, FillValue::TotalAmount, Alignment::Center),
    ],
    located: &[
        LocatedFill {
            rule: LocateRule {
                field: Field::ProjectName,
                keywords: PROJECT_NAME_KEYWORDS,
                fallback: Fallback::At { row: 1, col: 1 },
            },
            content: LocatedContent::ProjectName,
            style: CellStyle::sized(Alignment::Center, 10.0),
        },
        LocatedFill {
            rule: LocateRule {
                field: Field::WorkList,
                keywords: &["工作量及材料清单", "工作量", "清单"],
                fallback: Fallback::FromBottom { rows_from_end: 3, col: 0 },
            },
            content: LocatedContent::WorkList { prefix: "" },
            style: CellStyle::sized(Alignment::Left, 9.0),
        },
        LocatedFill {
            rule: LocateRule {
                field: Field::SupportingFiles,
                keywords: &["其他需求支撑文件"],
                fallback: Fallback::LastColumnFromBottom { rows_from_end: 2 },
            },
            content: LocatedContent::Images,
            style: CellStyle::aligned(Alignment::Center),
        },
    ],
};

/// 会审单
pub const REVIEW_FORM: FormLayout = FormLayout {
    title: "会审单",
    fixed: &[
        fixed(1, 1, FillValue::TotalAmount, Alignment::Center),
        fixed(1, 5, FillValue::ProjectDate, Alignment::Center),
        fixed(1, 9, FillValue::Cycle, Alignment::Center),
        fixed(2, 1, FillValue::Info(BaseInfoKey::ResponsiblePerson), Alignment::Center),
        fixed(2, 5, FillValue::Info(BaseInfoKey::Phone), Alignment::Center),
        fixed(3, 1, FillValue::Info(BaseInfoKey::ImplementingOrg), Alignment::Center),
        fixed(3, 5, FillValue::Info(BaseInfoKey::Manager), Alignment::Center),
        fixed(3, 9, FillValue::Info(BaseInfoKey::ManagerPhone), Alignment::Center),
    ],
    located: &[
        LocatedFill {
            rule: LocateRule {
                field: Field::ProjectName,
                keywords: PROJECT_NAME_KEYWORDS,
                fallback: Fallback::At { row: 0, col: 1 },
            },
            content: LocatedContent::ProjectName,
            style: CellStyle::sized(Alignment::Center, 10.0),
        },
        LocatedFill {
            rule: LocateRule {
                field: Field::WorkList,
                keywords: &["主要工作量及材料清单", "工作量", "清单"],
                fallback: Fallback::FromBottom { rows_from_end: 2, col: 0 },
            },
            content: LocatedContent::WorkList { prefix: "工作量：" },
            style: CellStyle::sized(Alignment::Left, 9.0),
        },
        LocatedFill {
            rule: LocateRule {
                field: Field::ConstructionPlan,
                keywords: &["施工方实施计划"],
                fallback: Fallback::Below(Field::WorkList),
            },
            content: LocatedContent::ConstructionPlan,
            style: CellStyle::sized(Alignment::Center, 9.0),
        },
    ],
};

/// 行 × 列 的单元格文本视图
pub trait CellGrid {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    /// 超出范围时返回 None
    fn cell_text(&self, row: usize, col: usize) -> Option<&str>;
}

impl CellGrid for Vec<Vec<String>> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn column_count(&self) -> usize {
        self.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        self.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }
}

/// 定位结果（锚点单元格）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Matched { row: usize, col: usize },
    Fallback { row: usize, col: usize },
}

impl Located {
    pub fn anchor(&self) -> (usize, usize) {
        match *self {
            Located::Matched { row, col } | Located::Fallback { row, col } => (row, col),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Located::Fallback { .. })
    }
}

/// 行优先查找第一个包含任一关键字的单元格
pub fn find_cell<G: CellGrid + ?Sized>(grid: &G, keywords: &[&str]) -> Option<(usize, usize)> {
    let cols = grid.column_count();
    for row in 0..grid.row_count() {
        for col in 0..cols {
            let Some(text) = grid.cell_text(row, col) else {
                continue;
            };
            let text = text.trim();
            if keywords.iter().any(|k| text.contains(k)) {
                return Some((row, col));
            }
        }
    }
    None
}

pub fn locate<G: CellGrid + ?Sized>(
    grid: &G,
    rule: &LocateRule,
    resolved: &[(Field, Located)],
) -> Located {
    if let Some((row, col)) = find_cell(grid, rule.keywords) {
        return Located::Matched { row, col };
    }

    let rows = grid.row_count();
    let (row, col) = match rule.fallback {
        Fallback::At { row, col } => (row, col),
        Fallback::FromBottom { rows_from_end, col } => (rows.saturating_sub(rows_from_end), col),
        Fallback::LastColumnFromBottom { rows_from_end } => (
            rows.saturating_sub(rows_from_end),
            grid.column_count().saturating_sub(1),
        ),
        Fallback::Below(field) => resolved
            .iter()
            .rev()
            .find(|(f, _)| *f == field)
            .map(|(_, located)| {
                let (row, col) = located.anchor();
                (row + 1, col)
            })
            .unwrap_or((0, 0)),
    };
    Located::Fallback { row, col }
}

/// 锚点右侧一列，已在最后一列时保持不动
pub fn write_target(anchor: (usize, usize), column_count: usize) -> (usize, usize) {
    let (row, col) = anchor;
    (row, (col + 1).min(column_count.saturating_sub(1)))
}

/// 填写时使用的数据
#[derive(Debug, Clone, Copy)]
pub struct FillContext<'a> {
    pub base_info: &'a BaseInfo,
    pub project: &'a ProjectInfo,
    pub total: f64,
    pub work_list: &'a str,
}

impl FillContext<'_> {
    pub fn total_text(&self) -> String {
        format!("{:.2}元", self.total)
    }

    pub fn resolve(&self, value: FillValue) -> String {
        match value {
            FillValue::Info(key) => self.base_info.get(key).to_string(),
            FillValue::ProjectDate => self.project.date.clone(),
            FillValue::Cycle => self.project.cycle.clone(),
            FillValue::TotalAmount => self.total_text(),
        }
    }

    /// 图片字段返回 None
    pub fn located_text(&self, content: LocatedContent) -> Option<String> {
        match content {
            LocatedContent::ProjectName => Some(self.project.name.clone()),
            LocatedContent::WorkList { prefix } => Some(format!("{}{}", prefix, self.work_list)),
            LocatedContent::ConstructionPlan => Some(format!(
                "我方计划安排1辆车2人在{}完成施工。",
                self.project.cycle
            )),
            LocatedContent::Images => None,
        }
    }
}
