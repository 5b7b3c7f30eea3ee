//! 单文件校验与修复
//!
//! 校验为一次线性流程：编码 → BOM → emoji → 声明，任何一步失败都只记录问题、不提前返回。
//! 修复在内存中按固定顺序组合（先去 BOM，再规范化 emoji），最后至多写一次磁盘。
use std::path::Path;

use tracing::{debug, warn};

use crate::bom::{detect_bom, strip_bom};
use crate::declaration::DeclarationRule;
use crate::emoji::{scan_emoji, EmojiNormalizer};
use crate::error::GuardError;
use crate::fsio::{read_bytes, write_atomic};
use crate::options::FixMode;
use crate::probe::{CharsetGuesser, EncodingProbe, UnknownGuesser};
use crate::table::ReplacementTable;
use crate::types::{BomKind, FileReport, FixReport, Issue};

/// 内存中的修复结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub bom_removed: BomKind,
    pub emoji_replaced: usize,
    pub content: Vec<u8>,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        !self.bom_removed.is_none() || self.emoji_replaced > 0
    }
}

/// 文件校验器：持有不可变的规则（替换表、字符集推测器、声明规则），可跨线程共享
pub struct FileValidator {
    normalizer: EmojiNormalizer,
    guesser: Box<dyn CharsetGuesser>,
    declaration: DeclarationRule,
}

impl FileValidator {
    pub fn new(
        table: ReplacementTable,
        guesser: Box<dyn CharsetGuesser>,
        declaration: DeclarationRule,
    ) -> Result<Self, GuardError> {
        Ok(Self { normalizer: EmojiNormalizer::new(table)?, guesser, declaration })
    }

    /// 内置替换表 + 不做字符集推测 + 默认声明规则
    pub fn with_defaults() -> Result<Self, GuardError> {
        Self::new(ReplacementTable::builtin(), Box::new(UnknownGuesser), DeclarationRule::default())
    }

    pub fn normalizer(&self) -> &EmojiNormalizer {
        &self.normalizer
    }

    /// 校验一段字节
    pub fn validate_bytes(&self, path: &Path, bytes: &[u8]) -> FileReport {
        let mut issues = Vec::new();

        let verdict = EncodingProbe::new(self.guesser.as_ref()).probe(bytes);
        if !verdict.is_utf8 {
            issues.push(Issue::Encoding { label: verdict.label });
        }

        let bom = detect_bom(bytes);
        if !bom.is_none() {
            issues.push(Issue::Bom { kind: bom });
        }

        if let Ok(text) = std::str::from_utf8(bytes) {
            let occurrences = scan_emoji(text);
            if !occurrences.is_empty() {
                issues.push(Issue::Emoji { occurrences });
            }
            if !self.declaration.has_declaration(text) {
                issues.push(Issue::MissingDeclaration);
            }
        }

        FileReport::new(path, issues)
    }

    /// 读取并校验文件；读取失败转为 `Unreadable` 问题
    pub fn validate_file(&self, path: &Path) -> FileReport {
        match read_bytes(path) {
            Ok(bytes) => {
                let report = self.validate_bytes(path, &bytes);
                debug!(path = %path.display(), passed = report.passed, issues = report.issues.len(), "validated");
                report
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable file");
                FileReport::new(path, vec![Issue::Unreadable { reason: e.to_string() }])
            }
        }
    }

    /// 在内存中计算全部修复
    pub fn fix_bytes(&self, bytes: &[u8]) -> FixOutcome {
        let (bom_removed, rest) = strip_bom(bytes);
        match std::str::from_utf8(rest) {
            Ok(text) => {
                let normalized = self.normalizer.normalize(text);
                FixOutcome {
                    bom_removed,
                    emoji_replaced: normalized.replacements,
                    content: normalized.text.into_bytes(),
                }
            }
            // 非 UTF-8 文本只做 BOM 剥离
            Err(_) => FixOutcome { bom_removed, emoji_replaced: 0, content: rest.to_vec() },
        }
    }

    /// 修复单个文件：整读 → 内存变换 → （Apply 且有变化时）原子写回一次
    pub fn fix_file(&self, path: &Path, mode: FixMode) -> FixReport {
        let bytes = match read_bytes(path) {
            Ok(b) => b,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable file");
                return FixReport::failed(path, mode, e.to_string());
            }
        };

        let outcome = self.fix_bytes(&bytes);
        let changed = outcome.changed();
        let mut report = FixReport {
            path: path.to_path_buf(),
            mode,
            bom_removed: outcome.bom_removed,
            emoji_replaced: outcome.emoji_replaced,
            changed,
            written: false,
            error: None,
        };

        if changed && !mode.is_preview() {
            match write_atomic(path, &outcome.content) {
                Ok(()) => report.written = true,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "write failed, file left unchanged");
                    report.error = Some(e.to_string());
                }
            }
        }
        debug!(path = %path.display(), changed, written = report.written, "fixed");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::BomSniffGuesser;
    use crate::types::EmojiOccurrence;
    use std::fs;

    fn validator() -> FileValidator {
        FileValidator::with_defaults().unwrap()
    }

    const DECL: &str = "# -*- coding: utf-8 -*-\n";

    #[test]
    fn clean_file_passes() {
        let r = validator().validate_bytes(Path::new("ok.py"), format!("{DECL}print('hi')\n").as_bytes());
        assert!(r.passed);
        assert!(r.issues.is_empty());
    }

    #[test]
    fn emoji_on_line_two_is_reported() {
        let r = validator().validate_bytes(Path::new("e.py"), "# -*- coding: utf-8 -*-\nprint('✅ ok')\n".as_bytes());
        assert_eq!(
            r.issues,
            vec![Issue::Emoji {
                occurrences: vec![EmojiOccurrence { line_number: 2, line_text: "print('✅ ok')".into() }]
            }]
        );
        assert!(!r.passed);
    }

    #[test]
    fn missing_declaration_fails_the_file() {
        let r = validator().validate_bytes(Path::new("d.py"), b"x = 1\ny = 2\n");
        assert_eq!(r.issues, vec![Issue::MissingDeclaration]);
        assert!(!r.passed);
    }

    #[test]
    fn bom_is_reported_alongside_other_checks() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(format!("{DECL}x = 1\n").as_bytes());
        let r = validator().validate_bytes(Path::new("b.py"), &bytes);
        assert_eq!(r.issues, vec![Issue::Bom { kind: BomKind::Utf8 }]);
    }

    #[test]
    fn undecodable_file_records_encoding_and_bom_without_text_checks() {
        let v = FileValidator::new(
            ReplacementTable::builtin(),
            Box::new(BomSniffGuesser),
            DeclarationRule::default(),
        )
        .unwrap();
        let bytes = [0xFF, 0xFE, b'x', 0x00, b'\n', 0x00];
        let r = v.validate_bytes(Path::new("u16.py"), &bytes);
        assert_eq!(
            r.issues,
            vec![
                Issue::Encoding { label: "UTF-16LE".into() },
                Issue::Bom { kind: BomKind::Utf16Le },
            ]
        );
    }

    #[test]
    fn unreadable_file_becomes_issue() {
        let r = validator().validate_file(Path::new("/no/such/dir/x.py"));
        assert!(!r.passed);
        assert!(matches!(r.issues.as_slice(), [Issue::Unreadable { .. }]));
    }

    #[test]
    fn fix_bytes_strips_bom_then_normalizes() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("print('✅ 🦀')\n".as_bytes());
        let out = validator().fix_bytes(&bytes);
        assert_eq!(out.bom_removed, BomKind::Utf8);
        assert_eq!(out.emoji_replaced, 2);
        assert_eq!(out.content, b"print('[OK] [EMOJI]')\n");
    }

    #[test]
    fn fixed_content_validates_clean_when_declared() {
        let v = validator();
        let src = format!("{DECL}print('🚀 launch')\n");
        let out = v.fix_bytes(src.as_bytes());
        assert!(v.validate_bytes(Path::new("f.py"), &out.content).passed);
    }

    #[test]
    fn fix_file_preview_leaves_disk_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.py");
        fs::write(&p, "x = '🎉'\n").unwrap();

        let r = validator().fix_file(&p, FixMode::Preview);

        assert!(r.changed);
        assert!(!r.written);
        assert_eq!(r.emoji_replaced, 1);
        assert_eq!(fs::read_to_string(&p).unwrap(), "x = '🎉'\n");
    }

    #[test]
    fn fix_file_apply_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.py");
        fs::write(&p, "\u{feff}x = '🎉'\n").unwrap();

        let r = validator().fix_file(&p, FixMode::Apply);

        assert!(r.written);
        assert_eq!(r.bom_removed, BomKind::Utf8);
        assert_eq!(fs::read_to_string(&p).unwrap(), "x = '[DONE]'\n");

        let again = validator().fix_file(&p, FixMode::Apply);
        assert!(!again.changed);
        assert!(!again.written);
    }

    #[cfg(unix)]
    #[test]
    fn fix_file_apply_through_symlink_fixes_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.py");
        let link = dir.path().join("link.py");
        fs::write(&real, "x = '🚀'\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let r = validator().fix_file(&link, FixMode::Apply);

        assert!(r.written);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "x = '[LAUNCH]'\n");
    }

    #[test]
    fn unmapped_pictograph_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("c.py");
        fs::write(&p, format!("{DECL}name = '🦜'\n")).unwrap();

        validator().fix_file(&p, FixMode::Apply);

        assert_eq!(fs::read_to_string(&p).unwrap(), format!("{DECL}name = '[EMOJI]'\n"));
    }
}
