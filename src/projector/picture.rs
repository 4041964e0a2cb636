//! 图片嵌入
//!
//! 图片按原始宽高比缩放到限定框内，作为居中的独立段落写入单元格。

use super::document::DocxDocument;
use super::package::DocxPackage;
use crate::error::{BudgetError, Result};
use quick_xml::escape::escape;
use std::io::Cursor;
use std::path::Path;

/// 1英寸 = 914400 EMU
pub const EMU_PER_INCH: f64 = 914_400.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PictureOptions {
    pub max_width_in: f64,
    pub max_height_in: f64,
}

impl Default for PictureOptions {
    fn default() -> Self {
        Self {
            max_width_in: 4.0,
            max_height_in: 3.0,
        }
    }
}

/// 扩展名对应的 MIME 类型
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "bmp" => Some("image/bmp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// 缩放到限定框内后的尺寸 (cx, cy)，单位 EMU
pub fn fit_extent(width_px: u32, height_px: u32, options: PictureOptions) -> (u64, u64) {
    let max_cx = options.max_width_in * EMU_PER_INCH;
    let max_cy = options.max_height_in * EMU_PER_INCH;
    if width_px == 0 || height_px == 0 {
        return (max_cx.round() as u64, max_cy.round() as u64);
    }

    let (w, h) = (width_px as f64, height_px as f64);
    let scale = (max_cx / w).min(max_cy / h);
    ((w * scale).round() as u64, (h * scale).round() as u64)
}

/// 读取图片并登记到压缩包，返回图片段落的 XML
pub fn embed_picture(
    package: &mut DocxPackage,
    document: &mut DocxDocument,
    path: &Path,
    options: PictureOptions,
) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let content_type = content_type_for(&extension).ok_or_else(|| {
        BudgetError::ImageLoad(format!("不支持的图片格式: {}", path.display()))
    })?;

    let bytes = std::fs::read(path)
        .map_err(|e| BudgetError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| BudgetError::ImageLoad(format!("{}: {}", path.display(), e)))?
        .into_dimensions()
        .map_err(|e| BudgetError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let (cx, cy) = fit_extent(width, height, options);
    let rel_id = package.add_image(&extension, content_type, bytes)?;
    let drawing_id = document.allocate_drawing_id();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("image{}.{}", drawing_id, extension));

    tracing::debug!(file = %name, width, height, cx, cy, "图片嵌入");
    Ok(drawing_paragraph_xml(&rel_id, drawing_id, &name, cx, cy))
}

/// 居中段落中的嵌入式图片
pub fn drawing_paragraph_xml(rel_id: &str, drawing_id: u32, name: &str, cx: u64, cy: u64) -> String {
    let name = escape(name);
    format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="图片 {id}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        ),
        cx = cx,
        cy = cy,
        id = drawing_id,
        name = name,
        rel = rel_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_image() {
        // 2:1 的图片受宽度限制
        let (cx, cy) = fit_extent(800, 400, PictureOptions::default());
        assert_eq!(cx, 3_657_600);
        assert_eq!(cy, 1_828_800);
    }

    #[test]
    fn test_fit_tall_image() {
        let (cx, cy) = fit_extent(300, 600, PictureOptions::default());
        assert_eq!(cy, 2_743_200);
        assert_eq!(cx, 1_371_600);
    }

    #[test]
    fn test_small_image_is_scaled_up_to_box() {
        let (cx, cy) = fit_extent(4, 3, PictureOptions::default());
        assert_eq!((cx, cy), (3_657_600, 2_743_200));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for("bmp"), Some("image/bmp"));
        assert_eq!(content_type_for("tiff"), None);
    }

    #[test]
    fn test_drawing_xml_references() {
        let xml = drawing_paragraph_xml("rId9", 3, "现场&照片.png", 100, 50);
        assert!(xml.contains(r#"r:embed="rId9""#));
        assert!(xml.contains(r#"<wp:docPr id="3""#));
        assert!(xml.contains("现场&amp;照片.png"));
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
    }
}
