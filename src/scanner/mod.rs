//! 支撑文件图片的收集

use crate::error::{BudgetError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|e| is_image_extension(&e.to_string_lossy()))
        .unwrap_or(false)
}

/// 收集结果
#[derive(Debug, Clone, Default)]
pub struct ImageSelection {
    pub images: Vec<PathBuf>,
    /// 超出上限而被舍弃的图片
    pub dropped: Vec<PathBuf>,
    /// 不是图片文件而被忽略的路径
    pub ignored: Vec<PathBuf>,
}

impl ImageSelection {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.dropped.is_empty() {
            warnings.push(format!(
                "图片最多{}张，已忽略{}张",
                self.images.len(),
                self.dropped.len()
            ));
        }
        for path in &self.ignored {
            warnings.push(format!("不支持的图片格式，已忽略: {}", path.display()));
        }
        warnings
    }
}

/// 文件夹直下的图片（不递归，按文件名排序）
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(BudgetError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image_path(p))
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// 先取显式指定的图片，再取文件夹中的图片，最多 `limit` 张
pub fn collect_images(explicit: &[PathBuf], folder: Option<&Path>, limit: usize) -> Result<ImageSelection> {
    let mut selection = ImageSelection::default();

    let mut candidates = Vec::new();
    for path in explicit {
        if !path.is_file() {
            return Err(BudgetError::FileNotFound(path.display().to_string()));
        }
        if is_image_path(path) {
            candidates.push(path.clone());
        } else {
            selection.ignored.push(path.clone());
        }
    }
    if let Some(folder) = folder {
        candidates.extend(scan_folder(folder)?);
    }

    for path in candidates {
        if selection.images.contains(&path) {
            continue;
        }
        if selection.images.len() < limit {
            selection.images.push(path);
        } else {
            selection.dropped.push(path);
        }
    }

    if !selection.dropped.is_empty() {
        tracing::debug!(limit, dropped = selection.dropped.len(), "图片数量超出上限");
    }
    Ok(selection)
}
