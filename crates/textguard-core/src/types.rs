//! 公共类型（对外暴露）
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::options::FixMode;

/// 编码探测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingVerdict {
    pub is_utf8: bool,
    pub label: String,
}

/// 文件头部的 BOM 类型，仅由前 2~4 个字节决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BomKind {
    None,
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl BomKind {
    /// 签名长度（字节）
    pub fn len(self) -> usize {
        match self {
            BomKind::None => 0,
            BomKind::Utf8 => 3,
            BomKind::Utf16Le | BomKind::Utf16Be => 2,
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, BomKind::None)
    }
}

impl fmt::Display for BomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BomKind::None => "none",
            BomKind::Utf8 => "UTF-8",
            BomKind::Utf16Le => "UTF-16 LE",
            BomKind::Utf16Be => "UTF-16 BE",
        };
        f.write_str(s)
    }
}

/// 含 emoji 的一行（行号从 1 开始，内容已去除首尾空白）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmojiOccurrence {
    pub line_number: usize,
    pub line_text: String,
}

/// 问题严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// 单个文件上发现的问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum Issue {
    /// 不是合法 UTF-8；label 为推测出的字符集（无法推测时为 "unknown"）
    Encoding { label: String },
    Bom { kind: BomKind },
    Emoji { occurrences: Vec<EmojiOccurrence> },
    MissingDeclaration,
    /// 读取文件失败时合成的问题，保证批量扫描不中断
    Unreadable { reason: String },
}

impl Issue {
    /// 缺少编码声明只是提示级别；其余均为错误
    pub fn severity(&self) -> Severity {
        match self {
            Issue::MissingDeclaration => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// 单文件校验报告；`passed` 恒等于 `issues.is_empty()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub passed: bool,
    pub issues: Vec<Issue>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, issues: Vec<Issue>) -> Self {
        Self { path: path.into(), passed: issues.is_empty(), issues }
    }
}

/// 目录校验报告
///
/// 合并操作与顺序无关：同一组文件报告以任意顺序合并，结果一致；
/// 对同一路径重复合并同一报告不改变结果。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryReport {
    pub valid_paths: BTreeSet<PathBuf>,
    pub invalid: BTreeMap<PathBuf, Vec<Issue>>,
    pub total: usize,
}

impl DirectoryReport {
    /// 并入单个文件的结果
    pub fn merge_file(&mut self, report: FileReport) {
        if report.passed {
            self.invalid.remove(&report.path);
            self.valid_paths.insert(report.path);
        } else {
            self.valid_paths.remove(&report.path);
            self.invalid.insert(report.path, report.issues);
        }
        self.recount();
    }

    /// 并入另一个目录报告（用于并行归约）
    pub fn merge(&mut self, other: DirectoryReport) {
        for path in other.valid_paths {
            self.invalid.remove(&path);
            self.valid_paths.insert(path);
        }
        for (path, issues) in other.invalid {
            self.valid_paths.remove(&path);
            self.invalid.insert(path, issues);
        }
        self.recount();
    }

    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }

    fn recount(&mut self) {
        self.total = self.valid_paths.len() + self.invalid.len();
    }
}

/// 单文件修复报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixReport {
    pub path: PathBuf,
    pub mode: FixMode,
    /// 被移除的 BOM 类型；`None` 表示没有 BOM
    pub bom_removed: BomKind,
    /// emoji 替换次数
    pub emoji_replaced: usize,
    /// 内容是否会（或已经）发生变化
    pub changed: bool,
    /// 是否实际写回了磁盘（Preview 模式恒为 false）
    pub written: bool,
    pub error: Option<String>,
}

impl FixReport {
    pub(crate) fn failed(path: &Path, mode: FixMode, error: String) -> Self {
        Self {
            path: path.to_path_buf(),
            mode,
            bom_removed: BomKind::None,
            emoji_replaced: 0,
            changed: false,
            written: false,
            error: Some(error),
        }
    }
}

/// 目录修复汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixSummary {
    pub reports: BTreeMap<PathBuf, FixReport>,
    pub total: usize,
    pub changed: usize,
    pub failed: usize,
}

impl FixSummary {
    /// 并入单个文件的修复结果；同一路径再次并入时先扣除旧结果的计数
    pub fn record(&mut self, report: FixReport) {
        self.count(&report, true);
        if let Some(prev) = self.reports.insert(report.path.clone(), report) {
            self.count(&prev, false);
        }
        self.total = self.reports.len();
    }

    fn count(&mut self, report: &FixReport, add: bool) {
        let step = |n: &mut usize, hit: bool| {
            if hit {
                *n = if add { *n + 1 } else { *n - 1 };
            }
        };
        step(&mut self.changed, report.changed);
        step(&mut self.failed, report.error.is_some());
    }
}
