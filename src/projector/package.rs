//! docx 压缩包的读写
//!
//! 所有部件一次性读入内存，修改后整体写出。输出文件只在全部处理成功后写入一次。

use super::attr_value;
use crate::error::{BudgetError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const IMAGE_RELATIONSHIP_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const EMPTY_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#,
);

#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

impl DocxPackage {
    /// 读取模板文件
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BudgetError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            BudgetError::Zip(z) => BudgetError::Template(format!(
                "{} 不是有效的docx文件 ({})",
                path.display(),
                z
            )),
            other => other,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;

        let mut parts = BTreeMap::new();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if !file.is_file() {
                continue;
            }
            let name = file.name().to_string();
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            parts.insert(name, buf);
        }

        if !parts.contains_key(DOCUMENT_PART) {
            return Err(BudgetError::Template(format!("缺少 {}", DOCUMENT_PART)));
        }
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn set_part(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.parts.insert(name.into(), bytes);
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn document_xml(&self) -> Result<&[u8]> {
        self.part(DOCUMENT_PART)
            .ok_or_else(|| BudgetError::Template(format!("缺少 {}", DOCUMENT_PART)))
    }

    /// 添加图片部件，返回正文中引用用的关系ID
    pub fn add_image(&mut self, extension: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let extension = extension.to_ascii_lowercase();
        let mut n = 1;
        while self
            .parts
            .contains_key(&format!("word/media/image{}.{}", n, extension))
        {
            n += 1;
        }
        let target = format!("media/image{}.{}", n, extension);

        self.ensure_default_content_type(&extension, content_type)?;
        let rel_id = self.add_relationship(IMAGE_RELATIONSHIP_TYPE, &target)?;
        self.parts.insert(format!("word/{}", target), bytes);
        Ok(rel_id)
    }

    /// [Content_Types].xml 中确保存在该扩展名的 Default 项
    fn ensure_default_content_type(&mut self, extension: &str, content_type: &str) -> Result<()> {
        let existing = self
            .part(CONTENT_TYPES_PART)
            .ok_or_else(|| BudgetError::Template(format!("缺少 {}", CONTENT_TYPES_PART)))?;

        let mut reader = Reader::from_reader(existing);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(existing.len() + 128));
        let mut buf = Vec::new();
        let mut found = false;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            match event {
                Event::Eof => break,
                Event::Start(ref e) | Event::Empty(ref e)
                    if e.local_name().as_ref() == b"Default" =>
                {
                    if attr_value(e, b"Extension")
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
                    {
                        found = true;
                    }
                    writer.write_event(event.borrow())?;
                }
                Event::End(ref e) if e.local_name().as_ref() == b"Types" => {
                    if !found {
                        let mut default = BytesStart::new("Default");
                        default.push_attribute(("Extension", extension));
                        default.push_attribute(("ContentType", content_type));
                        writer.write_event(Event::Empty(default))?;
                        found = true;
                    }
                    writer.write_event(event.borrow())?;
                }
                _ => writer.write_event(event.borrow())?,
            }
            buf.clear();
        }

        let updated = writer.into_inner();
        self.parts.insert(CONTENT_TYPES_PART.to_string(), updated);
        Ok(())
    }

    /// 在正文的关系文件中追加一条关系，返回新ID (rIdN)
    fn add_relationship(&mut self, rel_type: &str, target: &str) -> Result<String> {
        let existing = self
            .part(DOCUMENT_RELS_PART)
            .map(<[u8]>::to_vec)
            .unwrap_or_else(|| EMPTY_RELATIONSHIPS.as_bytes().to_vec());

        let mut reader = Reader::from_reader(existing.as_slice());
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(existing.len() + 256));
        let mut buf = Vec::new();
        let mut max_id = 0u32;
        let mut new_id = None;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            match event {
                Event::Eof => break,
                Event::Start(ref e) | Event::Empty(ref e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    if let Some(n) = attr_value(e, b"Id")
                        .and_then(|id| id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
                    {
                        max_id = max_id.max(n);
                    }
                    writer.write_event(event.borrow())?;
                }
                Event::End(ref e) if e.local_name().as_ref() == b"Relationships" => {
                    let id = format!("rId{}", max_id + 1);
                    let mut rel = BytesStart::new("Relationship");
                    rel.push_attribute(("Id", id.as_str()));
                    rel.push_attribute(("Type", rel_type));
                    rel.push_attribute(("Target", target));
                    writer.write_event(Event::Empty(rel))?;
                    writer.write_event(event.borrow())?;
                    new_id = Some(id);
                }
                _ => writer.write_event(event.borrow())?,
            }
            buf.clear();
        }

        let id = new_id.ok_or_else(|| {
            BudgetError::Template(format!("{} 结构无效", DOCUMENT_RELS_PART))
        })?;
        self.parts
            .insert(DOCUMENT_RELS_PART.to_string(), writer.into_inner());
        Ok(id)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(cursor);
        let options = zip::write::FileOptions::<()>::default()
            .compression_method(zip::CompressionMethod::Deflated);

        // [Content_Types].xml 放在最前面
        if let Some(bytes) = self.parts.get(CONTENT_TYPES_PART) {
            zip.start_file(CONTENT_TYPES_PART, options)?;
            zip.write_all(bytes)?;
        }
        for (name, bytes) in &self.parts {
            if name == CONTENT_TYPES_PART {
                continue;
            }
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
