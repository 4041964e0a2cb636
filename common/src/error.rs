//! 错误类型定义

use thiserror::Error;

/// 账本操作的错误
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// 编辑边界上的输入校验失败（负数工程量、空名称等），账本保持不变
    #[error("输入无效: {0}")]
    Validation(String),

    /// 引用的项目ID不存在
    #[error("未找到项目ID: {0}")]
    NotFound(usize),
}

/// Result型别名
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let error = Error::Validation("工程量不能为负数".to_string());
        assert_eq!(format!("{}", error), "输入无效: 工程量不能为负数");
    }

    #[test]
    fn test_error_display_not_found() {
        let error = Error::NotFound(7);
        assert_eq!(format!("{}", error), "未找到项目ID: 7");
    }
}
