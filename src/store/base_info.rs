//! 基础信息文件 (base_info.json)

use crate::error::{BudgetError, Result};
use budget_docgen_common::BaseInfo;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct BaseInfoLoad {
    pub info: BaseInfo,
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BaseInfoStore {
    path: PathBuf,
}

impl BaseInfoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取基础信息
    ///
    /// 缺失的键用空值补齐；文件不存在时写入默认值；文件损坏时使用默认值并返回警告。
    pub fn load(&self) -> BaseInfoLoad {
        if !self.path.exists() {
            let info = BaseInfo::default();
            let warning = self
                .save(&info)
                .err()
                .map(|e| format!("基础信息文件创建失败: {}", e));
            return BaseInfoLoad { info, warning };
        }

        match self.read() {
            Ok(mut info) => {
                let added = info.backfill_defaults();
                if added > 0 {
                    tracing::debug!(added, "基础信息补齐缺失的键");
                }
                BaseInfoLoad { info, warning: None }
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "基础信息读取失败");
                BaseInfoLoad {
                    info: BaseInfo::default(),
                    warning: Some(format!("基础信息读取失败，已使用默认值: {}", e)),
                }
            }
        }
    }

    fn read(&self) -> Result<BaseInfo> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, info: &BaseInfo) -> Result<()> {
        let write = || -> Result<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let content = serde_json::to_string_pretty(info)?;
            std::fs::write(&self.path, content)?;
            Ok(())
        };
        write().map_err(|e| BudgetError::Persistence(format!("{}: {}", self.path.display(), e)))
    }
}
