//! 配置文件加载（TOML）
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::declaration::DeclarationRule;
use crate::error::GuardError;
use crate::options::WalkOptions;
use crate::probe::BomSniffGuesser;
use crate::table::{load_table, ReplacementTable};
use crate::validator::FileValidator;

/// 默认配置文件名（在当前目录查找）
pub const DEFAULT_CONFIG_FILE: &str = "textguard.toml";

/// 顶层配置；所有字段均可省略
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub extensions: Option<Vec<String>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub threads: Option<usize>,
    /// 替换表文件路径；相对路径按配置文件所在目录解析
    pub table: Option<PathBuf>,
    pub declaration: Option<DeclarationRule>,
}

impl GuardConfig {
    pub fn from_toml_str(txt: &str) -> Result<Self, GuardError> {
        let cfg: GuardConfig = toml::from_str(txt).map_err(|e| GuardError::Config(e.to_string()))?;
        if let Some(rule) = &cfg.declaration {
            if rule.marker.is_empty() || rule.charset.is_empty() || rule.max_lines == 0 {
                return Err(GuardError::Config("declaration marker/charset must be non-empty and max_lines > 0".into()));
            }
        }
        if cfg.threads == Some(0) {
            return Err(GuardError::Config("threads must be >= 1".into()));
        }
        Ok(cfg)
    }

    /// 在默认选项上叠加配置值
    pub fn walk_options(&self) -> WalkOptions {
        let mut opts = WalkOptions::default();
        if let Some(ext) = &self.extensions {
            opts.extensions = ext.clone();
        }
        if let Some(dirs) = &self.exclude_dirs {
            opts.exclude_dirs = dirs.clone();
        }
        opts.max_file_size = self.max_file_size;
        opts.threads = self.threads;
        opts
    }

    /// 按配置构建校验器（CLI 使用 BOM 嗅探推测器）
    pub fn build_validator(&self) -> Result<FileValidator> {
        let table = match &self.table {
            Some(path) => load_table(path)?,
            None => ReplacementTable::builtin(),
        };
        let rule = self.declaration.clone().unwrap_or_default();
        let validator = FileValidator::new(table, Box::new(BomSniffGuesser), rule)?;
        Ok(validator)
    }
}

/// 读取配置文件
pub fn load_config(path: &Path) -> Result<GuardConfig> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let mut cfg = GuardConfig::from_toml_str(&txt).with_context(|| format!("parse config {}", path.display()))?;
    if let (Some(table), Some(base)) = (&cfg.table, path.parent()) {
        if table.is_relative() {
            cfg.table = Some(base.join(table));
        }
    }
    Ok(cfg)
}

/// 显式路径优先；否则尝试当前目录下的默认文件，不存在则用默认配置
pub fn resolve_config(explicit: Option<&Path>) -> Result<GuardConfig> {
    match explicit {
        Some(p) => load_config(p),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                load_config(default)
            } else {
                Ok(GuardConfig::default())
            }
        }
    }
}
