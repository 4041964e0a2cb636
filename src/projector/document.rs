//! word/document.xml 的表格模型
//!
//! 正文解析为事件序列后只读不改，单元格的替换内容在输出时插入。
//! 表格按 Word 的网格解释：
//! - `gridSpan` 横向合并的单元格占用多个网格列
//! - `vMerge` 纵向合并的后续单元格指向上方的起始单元格
//! - 列数为 `tblGrid` 中 `gridCol` 的数量

use super::attr_value;
use crate::error::{BudgetError, Result};
use budget_docgen_common::layout::{Alignment, CellGrid, CellStyle};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone)]
struct Cell {
    /// 内容范围 [content_start, content_end)，content_end 为 `</w:tc>` 的位置
    content_start: usize,
    content_end: usize,
    text: String,
    replacement: Option<String>,
}

#[derive(Debug)]
pub struct DocxDocument {
    events: Vec<Event<'static>>,
    cells: Vec<Cell>,
    /// 行 × 网格列 → 单元格
    grid: Vec<Vec<Option<usize>>>,
    column_count: usize,
    next_drawing_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VMerge {
    None,
    Restart,
    Continue,
}

impl DocxDocument {
    /// 解析正文并建立第一张表格的模型
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let events = read_events(xml)?;

        let table_start = find_first_table(&events)
            .ok_or_else(|| BudgetError::Template("模板中没有表格".into()))?;
        let table_end = matching_end(&events, table_start);

        let mut cells = Vec::new();
        let mut grid: Vec<Vec<Option<usize>>> = Vec::new();
        let mut grid_columns = 0;

        for child in direct_children(&events, table_start, table_end) {
            match local_name(&events[child]).as_slice() {
                b"tblGrid" => {
                    let end = matching_end(&events, child);
                    grid_columns = direct_children(&events, child, end)
                        .into_iter()
                        .filter(|&i| local_name(&events[i]) == b"gridCol")
                        .count();
                }
                b"tr" => {
                    let row = parse_row(&events, child, &mut cells, grid.last())?;
                    grid.push(row);
                }
                _ => {}
            }
        }

        let widest = grid.iter().map(Vec::len).max().unwrap_or(0);
        let column_count = if grid_columns > 0 { grid_columns } else { widest };

        let next_drawing_id = max_drawing_id(&events) + 1;
        tracing::debug!(
            rows = grid.len(),
            columns = column_count,
            cells = cells.len(),
            "模板表格解析完成"
        );

        Ok(Self {
            events,
            cells,
            grid,
            column_count,
            next_drawing_id,
        })
    }

    fn cell_index(&self, row: usize, col: usize) -> Result<usize> {
        self.grid
            .get(row)
            .filter(|_| col < self.column_count)
            .and_then(|r| r.get(col).copied().flatten())
            .ok_or(BudgetError::TemplateLayout {
                row,
                col,
                rows: self.grid.len(),
                cols: self.column_count,
            })
    }

    /// 用一段文本替换单元格内容（换行写为 `w:br`）
    pub fn set_cell_text(&mut self, row: usize, col: usize, text: &str, style: CellStyle) -> Result<()> {
        let index = self.cell_index(row, col)?;
        let cell = &mut self.cells[index];
        cell.replacement = Some(text_paragraph_xml(text, style));
        cell.text = text.to_string();
        Ok(())
    }

    /// 用若干段落的原始 XML 替换单元格内容
    pub fn set_cell_paragraphs(&mut self, row: usize, col: usize, paragraphs: &[String]) -> Result<()> {
        let index = self.cell_index(row, col)?;
        let cell = &mut self.cells[index];
        // 单元格至少需要一个段落
        cell.replacement = Some(if paragraphs.is_empty() {
            "<w:p/>".to_string()
        } else {
            paragraphs.concat()
        });
        cell.text = String::new();
        Ok(())
    }

    /// 新的 `wp:docPr` ID（文档内唯一）
    pub fn allocate_drawing_id(&mut self) -> u32 {
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        id
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let replaced: BTreeMap<usize, &Cell> = self
            .cells
            .iter()
            .filter(|c| c.replacement.is_some())
            .map(|c| (c.content_start, c))
            .collect();

        let mut writer = Writer::new(Vec::new());
        let mut i = 0;
        while i < self.events.len() {
            if let Some(cell) = replaced.get(&i) {
                if let Some(raw) = &cell.replacement {
                    writer.get_mut().write_all(raw.as_bytes())?;
                }
                // 原内容跳过，从 </w:tc> 继续
                i = cell.content_end;
                writer.write_event(self.events[i].borrow())?;
                i += 1;
                continue;
            }
            writer.write_event(self.events[i].borrow())?;
            i += 1;
        }
        Ok(writer.into_inner())
    }

    #[cfg(test)]
    fn cell_position(&self, row: usize, col: usize) -> Option<usize> {
        self.cell_index(row, col).ok().map(|i| self.cells[i].content_start)
    }
}

impl CellGrid for DocxDocument {
    fn row_count(&self) -> usize {
        self.grid.len()
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        let index = self.grid.get(row)?.get(col).copied().flatten()?;
        Some(self.cells[index].text.as_str())
    }
}

fn read_events(xml: &[u8]) -> Result<Vec<Event<'static>>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut events = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            event => events.push(event.into_owned()),
        }
        buf.clear();
    }
    Ok(events)
}

fn local_name(event: &Event<'_>) -> Vec<u8> {
    match event {
        Event::Start(e) | Event::Empty(e) => e.local_name().as_ref().to_vec(),
        Event::End(e) => e.local_name().as_ref().to_vec(),
        _ => Vec::new(),
    }
}

/// 正文中第一张非嵌套表格的开始位置
/// `w:body` 的直接子元素中的第一张表格（文本框、单元格内的表格不算）
fn find_first_table(events: &[Event<'static>]) -> Option<usize> {
    let body = events
        .iter()
        .position(|e| matches!(e, Event::Start(s) if s.local_name().as_ref() == b"body"))?;
    let body_end = matching_end(events, body);
    direct_children(events, body, body_end)
        .into_iter()
        .find(|&i| matches!(&events[i], Event::Start(s) if s.local_name().as_ref() == b"tbl"))
}

/// 与 `start` 处的开始标签对应的结束标签位置（自闭合标签返回自身）
fn matching_end(events: &[Event<'static>], start: usize) -> usize {
    if !matches!(events[start], Event::Start(_)) {
        return start;
    }
    let mut depth = 0usize;
    for (i, event) in events.iter().enumerate().skip(start) {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    events.len() - 1
}

/// (start, end) 之间的直接子元素位置
fn direct_children(events: &[Event<'static>], start: usize, end: usize) -> Vec<usize> {
    let mut children = Vec::new();
    let mut i = start + 1;
    while i < end {
        match events[i] {
            Event::Start(_) => {
                children.push(i);
                i = matching_end(events, i) + 1;
            }
            Event::Empty(_) => {
                children.push(i);
                i += 1;
            }
            _ => i += 1,
        }
    }
    children
}

fn parse_row(
    events: &[Event<'static>],
    tr: usize,
    cells: &mut Vec<Cell>,
    above: Option<&Vec<Option<usize>>>,
) -> Result<Vec<Option<usize>>> {
    let tr_end = matching_end(events, tr);
    let mut row: Vec<Option<usize>> = Vec::new();

    for child in direct_children(events, tr, tr_end) {
        match local_name(&events[child]).as_slice() {
            b"trPr" => {
                let before = grid_before(events, child);
                row.extend(std::iter::repeat(None).take(before));
            }
            b"tc" => {
                let (span, v_merge, cell) = parse_cell(events, child)?;
                let col = row.len();
                let index = match v_merge {
                    VMerge::Continue => above.and_then(|r| r.get(col).copied().flatten()),
                    _ => None,
                };
                let index = match index {
                    Some(index) => index,
                    None => {
                        cells.push(cell);
                        cells.len() - 1
                    }
                };
                row.extend(std::iter::repeat(Some(index)).take(span.max(1)));
            }
            _ => {}
        }
    }
    Ok(row)
}

fn grid_before(events: &[Event<'static>], tr_pr: usize) -> usize {
    let end = matching_end(events, tr_pr);
    direct_children(events, tr_pr, end)
        .into_iter()
        .find(|&i| local_name(&events[i]) == b"gridBefore")
        .and_then(|i| start_attr(&events[i], b"val"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn start_attr(event: &Event<'_>, key: &[u8]) -> Option<String> {
    match event {
        Event::Start(e) | Event::Empty(e) => attr_value(e, key),
        _ => None,
    }
}

fn parse_cell(events: &[Event<'static>], tc: usize) -> Result<(usize, VMerge, Cell)> {
    if !matches!(events[tc], Event::Start(_)) {
        return Err(BudgetError::Template("表格中存在空的单元格标签".into()));
    }
    let tc_end = matching_end(events, tc);
    let children = direct_children(events, tc, tc_end);

    let mut span = 1;
    let mut v_merge = VMerge::None;
    let mut content_start = tc + 1;

    if let Some(&first) = children.first() {
        if local_name(&events[first]) == b"tcPr" {
            let pr_end = matching_end(events, first);
            for prop in direct_children(events, first, pr_end) {
                match local_name(&events[prop]).as_slice() {
                    b"gridSpan" => {
                        span = start_attr(&events[prop], b"val")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(1);
                    }
                    b"vMerge" => {
                        v_merge = match start_attr(&events[prop], b"val").as_deref() {
                            Some("restart") => VMerge::Restart,
                            _ => VMerge::Continue,
                        };
                    }
                    _ => {}
                }
            }
            content_start = pr_end + 1;
        }
    }

    let paragraphs: Vec<String> = children
        .into_iter()
        .filter(|&i| local_name(&events[i]) == b"p")
        .map(|p| paragraph_text(events, p))
        .collect::<Result<_>>()?;

    let cell = Cell {
        content_start,
        content_end: tc_end,
        text: paragraphs.join("\n"),
        replacement: None,
    };
    Ok((span, v_merge, cell))
}

/// 段落文本：`w:t` 的内容，文本段中的 `w:tab` 为制表符，`w:br`/`w:cr` 为换行
fn paragraph_text(events: &[Event<'static>], p: usize) -> Result<String> {
    let end = matching_end(events, p);
    let mut text = String::new();
    let mut in_text = false;
    let mut in_run = false;
    for event in &events[p..=end] {
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"r" => in_run = true,
            Event::End(e) if e.local_name().as_ref() == b"r" => in_run = false,
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_text = false,
            Event::Text(t) if in_text => {
                text.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
            }
            Event::CData(t) if in_text => text.push_str(&String::from_utf8_lossy(t)),
            Event::Empty(e) if in_run => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            _ => {}
        }
    }
    Ok(text)
}

fn max_drawing_id(events: &[Event<'static>]) -> u32 {
    events
        .iter()
        .filter(|e| local_name(e) == b"docPr")
        .filter_map(|e| start_attr(e, b"id"))
        .filter_map(|id| id.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

/// 单段落单文本段的单元格内容
pub fn text_paragraph_xml(text: &str, style: CellStyle) -> String {
    let mut xml = String::from("<w:p>");
    if let Some(alignment) = style.alignment {
        xml.push_str(&format!(r#"<w:pPr><w:jc w:val="{}"/></w:pPr>"#, jc_value(alignment)));
    }
    if !text.is_empty() {
        xml.push_str("<w:r>");
        if let Some(size) = style.font_size_pt {
            // 字号以半磅为单位
            let half_points = (size * 2.0).round() as u32;
            xml.push_str(&format!(
                r#"<w:rPr><w:sz w:val="{0}"/><w:szCs w:val="{0}"/></w:rPr>"#,
                half_points
            ));
        }
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<w:br/>");
            }
            xml.push_str(&format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape(line)));
        }
        xml.push_str("</w:r>");
    }
    xml.push_str("</w:p>");
    xml
}

pub fn jc_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
    }
}
