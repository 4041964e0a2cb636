use crate::error::{BudgetError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LEDGER_FILE_NAME: &str = "budget_data.json";
pub const BASE_INFO_FILE_NAME: &str = "base_info.json";

/// 导入预算表时工程量的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantitySource {
    /// 所有项目工程量初始化为0，由操作员填写
    #[default]
    Zero,
    /// 读取表中的「工程量」列（无此列时为0）
    Sheet,
}

impl std::str::FromStr for QuantitySource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero" | "0" => Ok(QuantitySource::Zero),
            "sheet" | "excel" => Ok(QuantitySource::Sheet),
            _ => Err(format!("Unknown quantity source: {}. Use zero or sheet", s)),
        }
    }
}

impl std::fmt::Display for QuantitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantitySource::Zero => write!(f, "zero"),
            QuantitySource::Sheet => write!(f, "sheet"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// budget_data.json / base_info.json 所在目录
    pub data_dir: PathBuf,
    pub quantity_source: QuantitySource,
    /// 读取本地账本时将工程量清零
    pub reset_quantities_on_load: bool,
    pub application_template: Option<PathBuf>,
    pub review_template: Option<PathBuf>,
    pub max_images: usize,
    pub image_max_width_in: f64,
    pub image_max_height_in: f64,
    pub default_project_name: String,
    pub default_cycle: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            quantity_source: QuantitySource::Zero,
            reset_quantities_on_load: false,
            application_template: None,
            review_template: None,
            max_images: 12,
            image_max_width_in: 4.0,
            image_max_height_in: 3.0,
            default_project_name: "广电项目光猫安装、开通".into(),
            default_cycle: "15天".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| BudgetError::Config(format!("{}: {}", config_path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BudgetError::Config("找不到用户主目录".into()))?;
        Ok(home.join(".config").join("budget-docgen").join("config.json"))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE_NAME)
    }

    pub fn base_info_path(&self) -> PathBuf {
        self.data_dir.join(BASE_INFO_FILE_NAME)
    }
}
