use crate::config::QuantitySource;
use budget_docgen_common::Category;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "budget-docgen")]
#[command(about = "家集客项目预算管理与申请表/会审单生成工具", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 输出详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 导入预算表（Sheet1 施工项目 / Sheet2 材料项目），替换当前账本
    Import {
        /// 预算表文件 (.xlsx/.xls)
        #[arg(required = true)]
        file: PathBuf,

        /// 工程量来源 (zero/sheet)，省略时使用配置
        #[arg(short, long)]
        quantity_source: Option<QuantitySource>,

        /// 不确认直接覆盖现有账本
        #[arg(short, long)]
        yes: bool,
    },

    /// 显示项目列表和总金额
    List {
        /// 只显示指定类别 (construction/material)
        #[arg(short, long)]
        category: Option<Category>,

        /// 只显示工程量 > 0 的项目
        #[arg(short, long)]
        billable: bool,
    },

    /// 手工新增项目
    Add {
        /// 类别 (construction/material)
        #[arg(required = true)]
        category: Category,

        /// 项目名称
        #[arg(short, long)]
        name: String,

        /// 单价（元）
        #[arg(short, long)]
        price: f64,

        /// 单位（省略时施工项目为「公里」，材料项目为「个」）
        #[arg(short, long)]
        unit: Option<String>,

        /// 工程量
        #[arg(short, long, default_value = "0")]
        quantity: f64,

        /// 按公里计量（仅施工项目）
        #[arg(short, long)]
        length: bool,
    },

    /// 修改项目
    Edit {
        /// 项目ID
        #[arg(required = true)]
        id: usize,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        price: Option<f64>,

        #[arg(short, long)]
        quantity: Option<f64>,

        #[arg(short, long)]
        unit: Option<String>,

        /// 是否按公里计量 (true/false)
        #[arg(short, long)]
        length: Option<bool>,
    },

    /// 删除项目（其余项目重新编号）
    Delete {
        /// 项目ID
        #[arg(required = true)]
        id: usize,
    },

    /// 设置工程量（省略数值时交互输入）
    Qty {
        /// 项目ID
        #[arg(required = true)]
        id: usize,

        /// 工程量
        value: Option<f64>,
    },

    /// 显示工作量清单
    Worklist,

    /// 显示/编辑基础信息
    Info {
        /// 设置 键=值（可多次指定）
        #[arg(short, long, value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// 导出预算清单Excel（仅工程量 > 0 的项目）
    Export {
        /// 输出文件/目录
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 生成申请表与会审单
    Generate {
        /// 申请表模板（省略时使用配置）
        #[arg(long)]
        app_template: Option<PathBuf>,

        /// 会审单模板（省略时使用配置）
        #[arg(long)]
        review_template: Option<PathBuf>,

        /// 支撑文件图片（可多次指定）
        #[arg(short, long)]
        image: Vec<PathBuf>,

        /// 支撑文件图片所在文件夹
        #[arg(long)]
        image_dir: Option<PathBuf>,

        /// 项目名称
        #[arg(short = 'n', long)]
        project_name: Option<String>,

        /// 项目日期（例: 2026-10-17）
        #[arg(short, long)]
        date: Option<String>,

        /// 实施周期（例: 15天）
        #[arg(short, long)]
        cycle: Option<String>,

        /// 输出目录
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// 显示/编辑设置
    Config {
        /// 设置申请表模板
        #[arg(long)]
        set_app_template: Option<PathBuf>,

        /// 设置会审单模板
        #[arg(long)]
        set_review_template: Option<PathBuf>,

        /// 工程量来源 (zero/sheet)
        #[arg(long)]
        quantity_source: Option<QuantitySource>,

        /// 数据目录
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// 读取账本时工程量清零 (true/false)
        #[arg(long)]
        reset_quantities_on_load: Option<bool>,

        /// 显示当前设置
        #[arg(long)]
        show: bool,
    },
}

/// `KEY=VALUE` 形式的参数
pub fn parse_key_value(input: &str) -> Option<(&str, &str)> {
    let (key, value) = input.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some((key, value.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "budget-docgen",
            "add",
            "construction",
            "--name",
            "光缆布放",
            "--price",
            "10",
            "--length",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { category, name, price, length, .. } => {
                assert_eq!(category, Category::Construction);
                assert_eq!(name, "光缆布放");
                assert_eq!(price, 10.0);
                assert!(length);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("申请人=张三"), Some(("申请人", "张三")));
        assert_eq!(parse_key_value(" 联系电话 = 123 "), Some(("联系电话", "123")));
        assert_eq!(parse_key_value("=x"), None);
        assert_eq!(parse_key_value("申请人"), None);
    }
}
