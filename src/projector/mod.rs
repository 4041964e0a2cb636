//! 申请表 / 会审单 的生成
//!
//! - package: docx 压缩包读写
//! - document: 第一张表格的网格模型与单元格替换
//! - picture: 图片缩放与嵌入
//! - forms: 按表单布局填写并保存

pub mod document;
pub mod forms;
pub mod package;
pub mod picture;

pub use document::DocxDocument;
pub use forms::{
    default_output_name, fill_package, generate_documents, project_form, FillReport,
    GenerateRequest, GenerationOutcome, ProjectionReport,
};
pub use package::DocxPackage;
pub use picture::PictureOptions;

use quick_xml::events::BytesStart;

/// 按本地名取属性值（忽略命名空间前缀）
pub(crate) fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}
