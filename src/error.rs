use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件夹不存在: {0}")]
    FolderNotFound(String),

    /// 预算表缺列、为空或无有效数据，需要重新选择文件
    #[error("预算表加载失败: {0}")]
    Import(String),

    /// 保存/读取本地数据失败，内存中的数据仍可使用
    #[error("数据保存失败: {0}")]
    Persistence(String),

    #[error("模板错误: {0}")]
    Template(String),

    #[error("模板表格结构不匹配: 单元格({row}, {col})超出范围（表格共{rows}行{cols}列）")]
    TemplateLayout {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("图片读取错误: {0}")]
    ImageLoad(String),

    #[error("请先选择{0}模板")]
    MissingTemplate(&'static str),

    #[error("无有效项目：当前总金额为0")]
    NoBillableItems,

    #[error("无工程量>0的项目可导出")]
    NothingToExport,

    #[error("Excel生成错误: {0}")]
    ExcelGeneration(String),

    #[error("命令执行错误: {0}")]
    Cli(String),

    #[error("JSON解析错误: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("docx压缩包错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML解析错误: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Common(#[from] budget_docgen_common::Error),
}

pub type Result<T> = std::result::Result<T, BudgetError>;
