//! 按表单布局填写模板

use super::document::DocxDocument;
use super::package::{DocxPackage, DOCUMENT_PART};
use super::picture::{embed_picture, PictureOptions};
use crate::error::{BudgetError, Result};
use budget_docgen_common::layout::{
    locate, write_target, Field, FillContext, FormLayout, Located, APPLICATION_FORM, REVIEW_FORM,
};
use budget_docgen_common::{format_work_list, BaseInfo, CellGrid, Ledger, ProjectInfo};
use regex::Regex;
use std::path::{Path, PathBuf};

/// 一张表单在内存中的填写结果
#[derive(Debug, Clone, Default)]
pub struct FillReport {
    /// 关键字定位字段的锚点（命中或后备）
    pub placements: Vec<(Field, Located)>,
    pub warnings: Vec<String>,
    pub images_embedded: usize,
    pub images_skipped: usize,
}

impl FillReport {
    pub fn placement(&self, field: Field) -> Option<Located> {
        self.placements
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, located)| *located)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionReport {
    pub title: &'static str,
    pub output: PathBuf,
    pub fill: FillReport,
}

/// 填写压缩包中的正文
///
/// 固定坐标越界时返回 `TemplateLayout`，此时压缩包内容不完整，不应保存。
pub fn fill_package(
    layout: &FormLayout,
    package: &mut DocxPackage,
    ctx: &FillContext<'_>,
    images: &[PathBuf],
    picture: PictureOptions,
) -> Result<FillReport> {
    let mut document = DocxDocument::parse(package.document_xml()?)?;
    let mut report = FillReport::default();

    for fill in layout.fixed {
        document.set_cell_text(fill.row, fill.col, &ctx.resolve(fill.value), fill.style)?;
    }

    for fill in layout.located {
        let text = ctx.located_text(fill.content);
        if text.is_none() && images.is_empty() {
            continue;
        }

        let located = locate(&document, &fill.rule, &report.placements);
        if located.is_fallback() {
            let (row, col) = located.anchor();
            tracing::debug!(form = layout.title, field = fill.rule.field.label(), row, col, "关键字未命中");
            report.warnings.push(format!(
                "{}: 未找到「{}」单元格，使用默认位置({}, {})",
                layout.title,
                fill.rule.field.label(),
                row,
                col
            ));
        }
        let (row, col) = write_target(located.anchor(), document.column_count());

        match text {
            Some(text) => document.set_cell_text(row, col, &text, fill.style)?,
            None => {
                let mut paragraphs = Vec::new();
                for image in images {
                    match embed_picture(package, &mut document, image, picture) {
                        Ok(xml) => paragraphs.push(xml),
                        Err(e) => {
                            tracing::debug!(image = %image.display(), error = %e, "图片插入失败");
                            report.images_skipped += 1;
                        }
                    }
                }
                report.images_embedded = paragraphs.len();
                document.set_cell_paragraphs(row, col, &paragraphs)?;
            }
        }
        report.placements.push((fill.rule.field, located));
    }

    package.set_part(DOCUMENT_PART, document.to_xml()?);
    Ok(report)
}

/// 读取模板、填写并保存到 `output`
pub fn project_form(
    layout: &FormLayout,
    template: &Path,
    ctx: &FillContext<'_>,
    images: &[PathBuf],
    picture: PictureOptions,
    output: &Path,
) -> Result<ProjectionReport> {
    let mut package = DocxPackage::open(template)?;
    let fill = fill_package(layout, &mut package, ctx, images, picture)?;
    package.save(output)?;
    tracing::debug!(form = layout.title, output = %output.display(), "文档已保存");

    Ok(ProjectionReport {
        title: layout.title,
        output: output.to_path_buf(),
        fill,
    })
}

/// 生成两份文档所需的输入
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub application_template: Option<&'a Path>,
    pub review_template: Option<&'a Path>,
    pub output_dir: &'a Path,
    pub ledger: &'a Ledger,
    pub base_info: &'a BaseInfo,
    pub project: &'a ProjectInfo,
    pub images: &'a [PathBuf],
    pub picture: PictureOptions,
    /// 文件名中的日期 (YYYYMMDD)
    pub date_stamp: &'a str,
}

/// 两份文档各自独立的结果
#[derive(Debug)]
pub struct GenerationOutcome {
    pub application: Result<ProjectionReport>,
    pub review: Result<ProjectionReport>,
}

impl GenerationOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.application.is_ok() && self.review.is_ok()
    }
}

/// 生成申请表与会审单
///
/// 未选择模板或总金额为0时不生成任何文件。两份文档互不影响，
/// 一份失败时另一份照常生成。
pub fn generate_documents(request: &GenerateRequest<'_>) -> Result<GenerationOutcome> {
    let application_template = request
        .application_template
        .ok_or(BudgetError::MissingTemplate(APPLICATION_FORM.title))?;
    let review_template = request
        .review_template
        .ok_or(BudgetError::MissingTemplate(REVIEW_FORM.title))?;

    let totals = request.ledger.recompute_totals();
    if totals.grand_total <= 0.0 {
        return Err(BudgetError::NoBillableItems);
    }

    let work_list = format_work_list(request.ledger.items());
    let ctx = FillContext {
        base_info: request.base_info,
        project: request.project,
        total: totals.grand_total,
        work_list: &work_list,
    };

    let output_for = |layout: &FormLayout| {
        request.output_dir.join(default_output_name(
            &request.project.name,
            layout.title,
            request.date_stamp,
        ))
    };

    let application = project_form(
        &APPLICATION_FORM,
        application_template,
        &ctx,
        request.images,
        request.picture,
        &output_for(&APPLICATION_FORM),
    );
    let review = project_form(
        &REVIEW_FORM,
        review_template,
        &ctx,
        request.images,
        request.picture,
        &output_for(&REVIEW_FORM),
    );

    Ok(GenerationOutcome { application, review })
}

/// 默认输出文件名: {项目名称}_{表单}_{YYYYMMDD}.docx
pub fn default_output_name(project_name: &str, form_title: &str, date_stamp: &str) -> String {
    lazy_static::lazy_static! {
        // Windows 文件名中不允许的字符
        static ref ILLEGAL_RE: Regex = Regex::new(r#"[\\/:*?"<>|\x00-\x1F]"#).unwrap();
    }

    let name = ILLEGAL_RE.replace_all(project_name.trim(), "_");
    let name = if name.is_empty() { "未命名项目".into() } else { name };
    format!("{}_{}_{}.docx", name, form_title, date_stamp)
}
