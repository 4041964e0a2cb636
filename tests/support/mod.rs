//! 测试用数据
//!
//! 预算表 (xlsx)、模板 (docx)、图片 都在测试时生成

#![allow(dead_code)]

use budget_docgen_common::{BaseInfo, BaseInfoKey, Category, Ledger, LineItemDraft, ProjectInfo};
use rust_xlsxwriter::Workbook;
use std::io::{Read, Write};
use std::path::Path;

/// 按 (表头, 数据行) 逐个写入工作表，数值文本写为数字
pub fn write_workbook(path: &Path, sheets: &[(&[&str], Vec<Vec<String>>)]) {
    let mut workbook = Workbook::new();
    for (headers, rows) in sheets {
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                let r = (r + 1) as u32;
                let col = col as u16;
                if value.is_empty() {
                    continue;
                }
                // "nan" 也能解析为 f64，只把有限值写成数字
                match value.parse::<f64>().ok().filter(|n| n.is_finite()) {
                    Some(number) => sheet.write_number(r, col, number).unwrap(),
                    None => sheet.write_string(r, col, value).unwrap(),
                };
            }
        }
    }
    workbook.save(path).unwrap();
}

pub fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// 标准预算表：施工 A(元/公里)=10, B=5；材料 C=2
pub fn write_standard_budget(path: &Path) {
    write_workbook(
        path,
        &[
            (
                &["类别", "折扣后（含税）37%/元"],
                rows(&[&["A (元/公里)", "10"], &["B", "5"]]),
            ),
            (&["材料", "含税"], rows(&[&["C", "2"]])),
        ],
    );
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

fn table_xml(cells: &[&[&str]]) -> String {
    let columns = cells.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut xml = String::from("<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/></w:tblPr><w:tblGrid>");
    for _ in 0..columns {
        xml.push_str("<w:gridCol w:w=\"1000\"/>");
    }
    xml.push_str("</w:tblGrid>");
    for row in cells {
        xml.push_str("<w:tr>");
        for text in row.iter() {
            xml.push_str("<w:tc><w:tcPr><w:tcW w:w=\"1000\" w:type=\"dxa\"/></w:tcPr><w:p>");
            if !text.is_empty() {
                xml.push_str(&format!("<w:r><w:t>{}</w:t></w:r>", text));
            }
            xml.push_str("</w:p></w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:p><w:r><w:t>家集客项目</w:t></w:r></w:p>{}<w:sectPr/></w:body></w:document>"#,
        body
    )
}

pub fn write_docx(path: &Path, document: &str) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// 第一张表格为 `cells` 的模板
pub fn write_template(path: &Path, cells: &[&[&str]]) {
    write_docx(path, &document_xml(&table_xml(cells)));
}

/// 申请表模板（7列）
pub const APPLICATION_CELLS: &[&[&str]] = &[
    &["申请单位", "", "申请日期", "", "", "申请人", ""],
    &["维修项目名称", "", "", "", "", "联系电话", ""],
    &["实施周期", "", "申请金额", "", "", "", ""],
    &["工作量及材料清单", "", "", "", "", "", ""],
    &["其他需求支撑文件", "", "", "", "", "", ""],
    &["审批意见", "", "", "", "", "", ""],
];

/// 会审单模板（10列）
pub const REVIEW_CELLS: &[&[&str]] = &[
    &["维修项目名称", "", "", "", "", "", "", "", "", ""],
    &["金额", "", "", "", "日期", "", "", "", "周期", ""],
    &["项目负责人", "", "", "", "电话", "", "", "", "", ""],
    &["实施单位", "", "", "", "项目经理", "", "", "", "电话", ""],
    &["主要工作量及材料清单", "", "", "", "", "", "", "", "", ""],
    &["施工方实施计划", "", "", "", "", "", "", "", "", ""],
    &["会审意见", "", "", "", "", "", "", "", "", ""],
];

pub fn read_part(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut part = zip.by_name(name).unwrap();
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

pub fn has_part(path: &Path, name: &str) -> bool {
    let file = std::fs::File::open(path).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let found = zip.by_name(name).is_ok();
    found
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]))
        .save(path)
        .unwrap();
}

/// A(公里)×2 + B×0 + C×3 = 26.00
pub fn scenario_ledger() -> Ledger {
    let mut ledger = Ledger::from_drafts(vec![
        LineItemDraft {
            category: Category::Construction,
            name: "A".into(),
            unit: "公里".into(),
            unit_price: 10.0,
            quantity: 0.0,
            is_length_unit: true,
        },
        LineItemDraft::new(Category::Construction, "B", 5.0),
        LineItemDraft::new(Category::Material, "C", 2.0),
    ]);
    ledger.set_quantity(1, 2.0).unwrap();
    ledger.set_quantity(3, 3.0).unwrap();
    ledger
}

pub fn sample_base_info() -> BaseInfo {
    let mut info = BaseInfo::default();
    info.set(BaseInfoKey::ApplicantOrg, "广电分公司");
    info.set(BaseInfoKey::Applicant, "张三");
    info.set(BaseInfoKey::Phone, "13800000000");
    info.set(BaseInfoKey::ImplementingOrg, "施工队");
    info.set(BaseInfoKey::Manager, "李四");
    info.set(BaseInfoKey::ManagerPhone, "13900000000");
    info.set(BaseInfoKey::ResponsiblePerson, "王五");
    info
}

pub fn sample_project() -> ProjectInfo {
    ProjectInfo {
        name: "光猫安装".into(),
        date: "2026年10月17日".into(),
        cycle: "15天".into(),
    }
}
