//! 目录遍历与并行调度
//!
//! - 先收集文件列表（walkdir），按路径排序保证可复现
//! - 多线程时在 Rayon 线程池内逐文件处理，结果经 crossbeam 通道交给调用线程归并
//! - 归并与顺序无关，因此 worker 完成的先后不影响最终报告
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::GuardError;
use crate::options::{FixMode, WalkOptions};
use crate::types::{DirectoryReport, FileReport, FixReport, FixSummary};
use crate::validator::FileValidator;

/// 单文件或目录的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<F, D> {
    File(F),
    Directory(D),
}

/// 枚举根目录下待处理的文件（已排序）
pub fn discover_files(root: &Path, opts: &WalkOptions) -> Vec<PathBuf> {
    let max_depth = if opts.recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, opts));
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !matches_extension(entry.path(), opts) {
            continue;
        }
        if let Some(max) = opts.max_file_size {
            if let Ok(md) = entry.metadata() {
                if md.len() > max {
                    debug!(path = %entry.path().display(), size = md.len(), "skipping large file");
                    continue;
                }
            }
        }
        files.push(entry.into_path());
    }
    files.sort();
    files
}

fn is_excluded_dir(entry: &DirEntry, opts: &WalkOptions) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| opts.exclude_dirs.iter().any(|d| d == name))
}

fn matches_extension(path: &Path, opts: &WalkOptions) -> bool {
    if opts.extensions.is_empty() {
        return true;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => opts
            .extensions
            .iter()
            .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn ensure_exists(root: &Path) -> Result<(), GuardError> {
    if root.exists() {
        Ok(())
    } else {
        Err(GuardError::RootNotFound(root.to_path_buf()))
    }
}

/// 校验目录
pub fn validate_directory(
    root: &Path,
    validator: &FileValidator,
    opts: &WalkOptions,
) -> Result<DirectoryReport, GuardError> {
    ensure_exists(root)?;
    let files = discover_files(root, opts);
    debug!(root = %root.display(), files = files.len(), "validating directory");

    let mut report = DirectoryReport::default();
    dispatch(&files, opts, |p| validator.validate_file(p), |r: FileReport| report.merge_file(r))?;
    Ok(report)
}

/// 修复目录
pub fn fix_directory(
    root: &Path,
    validator: &FileValidator,
    mode: FixMode,
    opts: &WalkOptions,
) -> Result<FixSummary, GuardError> {
    ensure_exists(root)?;
    let files = discover_files(root, opts);
    debug!(root = %root.display(), files = files.len(), ?mode, "fixing directory");

    let mut summary = FixSummary::default();
    dispatch(&files, opts, |p| validator.fix_file(p, mode), |r: FixReport| summary.record(r))?;
    Ok(summary)
}

/// 校验文件或目录
pub fn validate_path(
    path: &Path,
    validator: &FileValidator,
    opts: &WalkOptions,
) -> Result<Target<FileReport, DirectoryReport>, GuardError> {
    ensure_exists(path)?;
    if path.is_dir() {
        validate_directory(path, validator, opts).map(Target::Directory)
    } else {
        Ok(Target::File(validator.validate_file(path)))
    }
}

/// 修复文件或目录
pub fn fix_path(
    path: &Path,
    validator: &FileValidator,
    mode: FixMode,
    opts: &WalkOptions,
) -> Result<Target<FixReport, FixSummary>, GuardError> {
    ensure_exists(path)?;
    if path.is_dir() {
        fix_directory(path, validator, mode, opts).map(Target::Directory)
    } else {
        Ok(Target::File(validator.fix_file(path, mode)))
    }
}

/// 调度：线程数为 1 时串行，否则走 Rayon + 通道；`sink` 始终在调用线程执行
fn dispatch<T, W, S>(files: &[PathBuf], opts: &WalkOptions, work: W, mut sink: S) -> Result<(), GuardError>
where
    T: Send,
    W: Fn(&Path) -> T + Sync,
    S: FnMut(T),
{
    let cancelled = || opts.cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed));
    let threads = opts.effective_threads();

    if threads <= 1 || files.len() <= 1 {
        for path in files {
            if cancelled() {
                debug!("cancelled, stop dispatching");
                break;
            }
            sink(work(path.as_path()));
        }
        return Ok(());
    }

    use crossbeam_channel as channel;
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let (tx, rx) = channel::bounded::<T>(256);

    std::thread::scope(|scope| {
        let work = &work;
        let cancelled = &cancelled;
        scope.spawn(move || {
            pool.install(|| {
                files.par_iter().for_each_with(tx, |tx, path| {
                    if cancelled() {
                        return;
                    }
                    let _ = tx.send(work(path.as_path()));
                });
            });
            // 所有 Sender 在此之前已被丢弃，接收端随之结束
        });

        while let Ok(item) = rx.recv() {
            sink(item);
        }
    });
    Ok(())
}
