//! 家集客项目预算管理与文档生成
//!
//! 预算表导入 → 账本编辑/保存 → 工作量清单与总金额 → 申请表/会审单 与 预算清单Excel

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod importer;
pub mod projector;
pub mod scanner;
pub mod session;
pub mod store;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// 初始化诊断日志（输出到标准错误）
///
/// 默认只输出警告，`verbose` 时本工具输出调试信息；`RUST_LOG` 优先。
pub fn init_tracing(verbose: bool) {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        if verbose {
            for directive in ["budget_docgen=debug", "budget_docgen_common=debug"] {
                if let Ok(directive) = directive.parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
