//! 表头 + 数据行 形式的工作表视图

use calamine::{Data, Range};

/// 第一行为表头的工作表
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
}

impl SheetTable {
    pub fn from_range(range: &Range<Data>) -> Self {
        Self::from_rows(range.rows().map(|r| r.to_vec()).collect())
    }

    pub fn from_rows(mut rows: Vec<Vec<Data>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let header_row = rows.remove(0);
        // 列名去除首尾空白后精确匹配
        let headers = header_row.iter().map(cell_text).collect();
        Self { headers, rows }
    }

    /// 没有数据行（只有表头或完全为空）
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 缺失的列名（按给定顺序）
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| self.column(name).is_none())
            .collect()
    }

    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).map(cell_text).unwrap_or_default()
    }

    pub fn number(&self, row: usize, col: usize) -> f64 {
        self.cell(row, col).map(cell_number).unwrap_or(0.0)
    }

    fn cell(&self, row: usize, col: usize) -> Option<&Data> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// 单元格转文本（去除首尾空白）
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => float_text(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".into(),
        Data::Bool(false) => "False".into(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// 浮点数的文本形式：整数值保留一位小数 (1.0)，极大/极小值用 1e+16 / 1e-05 形式
fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let scientific = format!("{:e}", value);
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => scientific,
        };
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// 数值列的转换：无法解析、非有限值或负数一律视为0
pub fn cell_number(cell: &Data) -> f64 {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}
