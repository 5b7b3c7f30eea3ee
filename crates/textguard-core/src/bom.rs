//! BOM 检测与剥离
use std::path::Path;

use crate::fsio::{read_bytes, write_atomic};
use crate::options::FixMode;
use crate::types::{BomKind, FixReport};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// 只看开头字节判断 BOM 类型
/// 顺序有意义：先 3 字节 UTF-8，再 UTF-16 LE，最后 UTF-16 BE
pub fn detect_bom(bytes: &[u8]) -> BomKind {
    if bytes.starts_with(&UTF8_BOM) {
        BomKind::Utf8
    } else if bytes.starts_with(&UTF16_LE_BOM) {
        BomKind::Utf16Le
    } else if bytes.starts_with(&UTF16_BE_BOM) {
        BomKind::Utf16Be
    } else {
        BomKind::None
    }
}

/// 去掉开头的 BOM，返回首个检测到的类型与剩余字节
/// 叠加的多个签名会被逐个去掉，保证结果不再以 BOM 开头
pub fn strip_bom(bytes: &[u8]) -> (BomKind, &[u8]) {
    let first = detect_bom(bytes);
    let mut rest = bytes;
    loop {
        let kind = detect_bom(rest);
        if kind.is_none() {
            break;
        }
        rest = &rest[kind.len()..];
    }
    (first, rest)
}

/// 单独对文件做 BOM 修复
pub fn fix_bom_file(path: &Path, mode: FixMode) -> FixReport {
    let bytes = match read_bytes(path) {
        Ok(b) => b,
        Err(e) => return FixReport::failed(path, mode, e.to_string()),
    };
    let (kind, rest) = strip_bom(&bytes);
    let changed = !kind.is_none();
    let mut report = FixReport {
        path: path.to_path_buf(),
        mode,
        bom_removed: kind,
        emoji_replaced: 0,
        changed,
        written: false,
        error: None,
    };
    if changed && !mode.is_preview() {
        match write_atomic(path, rest) {
            Ok(()) => report.written = true,
            Err(e) => report.error = Some(e.to_string()),
        }
    }
    report
}
