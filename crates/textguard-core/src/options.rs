//! 遍历选项与修复模式（模块）
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::Serialize;

/// 修复模式
/// - Preview：只计算并报告将要发生的修改，不落盘。
/// - Apply：计算完成后整体写回文件（每个文件至多写一次）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixMode {
    Preview,
    Apply,
}

impl FixMode {
    pub fn is_preview(self) -> bool {
        matches!(self, FixMode::Preview)
    }
}

/// 目录遍历选项
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// 是否递归进入子目录；false 时只看根目录第一层
    pub recursive: bool,
    /// 扩展名过滤（不含点，大小写不敏感）；为空表示所有文件
    pub extensions: Vec<String>,
    /// 跳过的目录名（精确匹配单段目录名）
    pub exclude_dirs: Vec<String>,
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    /// 取消标记：置位后不再派发新文件，已派发的文件照常完成
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            extensions: vec!["py".to_string()],
            exclude_dirs: [".git", "target", "node_modules", "__pycache__", ".venv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size: None,
            threads: None,
            cancel: None,
        }
    }
}

impl WalkOptions {
    /// 解析后的线程数
    pub(crate) fn effective_threads(&self) -> usize {
        self.threads.filter(|n| *n >= 1).unwrap_or_else(num_cpus::get)
    }
}
