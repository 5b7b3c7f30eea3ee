//! emoji 替换表（内置版本 + TOML 文件加载）
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::emoji::is_emoji;
use crate::error::GuardError;

/// 内置替换表版本，修改内置条目时递增
pub const BUILTIN_TABLE_VERSION: &str = "1";

const BUILTIN: &[(&str, &str)] = &[
    ("\u{2705}", "[OK]"),
    ("\u{2714}\u{FE0F}", "[OK]"),
    ("\u{2714}", "[OK]"),
    ("\u{2713}", "[OK]"),
    ("\u{274C}", "[FAIL]"),
    ("\u{2716}", "[X]"),
    ("\u{2717}", "[X]"),
    ("\u{26A0}\u{FE0F}", "[WARN]"),
    ("\u{26A0}", "[WARN]"),
    ("\u{2139}\u{FE0F}", "[INFO]"),
    ("\u{2139}", "[INFO]"),
    ("\u{1F680}", "[LAUNCH]"),
    ("\u{1F4DD}", "[NOTE]"),
    ("\u{1F525}", "[HOT]"),
    ("\u{1F4A1}", "[IDEA]"),
    ("\u{1F41B}", "[BUG]"),
    ("\u{1F527}", "[FIX]"),
    ("\u{1F4E6}", "[PKG]"),
    ("\u{1F389}", "[DONE]"),
    ("\u{1F50D}", "[SEARCH]"),
    ("\u{1F4CA}", "[STATS]"),
    ("\u{1F4CB}", "[LIST]"),
    ("\u{1F512}", "[LOCK]"),
    ("\u{2B50}", "[STAR]"),
    ("\u{1F449}", "[->]"),
    ("\u{27A1}\u{FE0F}", "[->]"),
    ("\u{27A1}", "[->]"),
    ("\u{1F916}", "[BOT]"),
    ("\u{2728}", "[NEW]"),
    ("\u{1F9EA}", "[TEST]"),
    ("\u{1F4C1}", "[DIR]"),
    ("\u{1F4C4}", "[FILE]"),
    ("\u{26A1}", "[FAST]"),
    ("\u{1F6D1}", "[STOP]"),
    ("\u{23F3}", "[WAIT]"),
    ("\u{1F3AF}", "[TARGET]"),
];

/// 单条替换
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// 不可变替换表；由调用方在构造校验器时注入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementTable {
    version: String,
    entries: Vec<Replacement>,
}

/// 表文件结构
#[derive(Debug, Clone, Deserialize)]
struct TableFile {
    version: String,
    #[serde(default)]
    replacement: Vec<Replacement>,
}

impl ReplacementTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(from, to)| Replacement { from: from.to_string(), to: to.to_string() })
            .collect();
        Self { version: BUILTIN_TABLE_VERSION.to_string(), entries }
    }

    /// 校验后构建
    ///
    /// 约束（保证替换幂等）：
    /// - 键非空、不重复，且只由非 ASCII 字符组成
    /// - 值非空且为纯 ASCII（因此不可能再被扫描器命中）
    pub fn new(version: impl Into<String>, entries: Vec<Replacement>) -> Result<Self, GuardError> {
        let mut seen = HashSet::new();
        for e in &entries {
            if e.from.is_empty() {
                return Err(GuardError::Table("empty key".into()));
            }
            if e.from.chars().any(|c| c.is_ascii()) {
                return Err(GuardError::Table(format!("key {:?} contains ASCII characters", e.from)));
            }
            if e.to.is_empty() || !e.to.is_ascii() || e.to.chars().any(is_emoji) {
                return Err(GuardError::Table(format!("tag {:?} for key {:?} must be non-empty ASCII", e.to, e.from)));
            }
            if !seen.insert(e.from.as_str()) {
                return Err(GuardError::Table(format!("duplicate key {:?}", e.from)));
            }
        }
        Ok(Self { version: version.into(), entries })
    }

    pub fn from_toml_str(txt: &str) -> Result<Self, GuardError> {
        let parsed: TableFile = toml::from_str(txt).map_err(|e| GuardError::Table(e.to_string()))?;
        Self::new(parsed.version, parsed.replacement)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self) -> &[Replacement] {
        &self.entries
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|e| e.from == key).map(|e| e.to.as_str())
    }
}

impl Default for ReplacementTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// 从 TOML 文件加载替换表
pub fn load_table(path: &Path) -> Result<ReplacementTable> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read replacement table {}", path.display()))?;
    let table = ReplacementTable::from_toml_str(&txt)
        .with_context(|| format!("parse replacement table {}", path.display()))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let b = ReplacementTable::builtin();
        let rebuilt = ReplacementTable::new(b.version(), b.entries().to_vec()).unwrap();
        assert_eq!(rebuilt, b);
        assert_eq!(b.lookup("\u{2705}"), Some("[OK]"));
    }

    #[test]
    fn parses_toml_table() {
        let t = ReplacementTable::from_toml_str(
            r#"
            version = "2024.1"

            [[replacement]]
            from = "🚀"
            to = "[ROCKET]"
            "#,
        )
        .unwrap();
        assert_eq!(t.version(), "2024.1");
        assert_eq!(t.lookup("🚀"), Some("[ROCKET]"));
        assert_eq!(t.entries().len(), 1);
    }

    #[test]
    fn rejects_non_ascii_tag() {
        let err = ReplacementTable::new("x", vec![Replacement { from: "🚀".into(), to: "🔥".into() }]);
        assert!(matches!(err, Err(GuardError::Table(_))));
    }

    #[test]
    fn rejects_ascii_key() {
        let err = ReplacementTable::new("x", vec![Replacement { from: "OK".into(), to: "[OK]".into() }]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_duplicate_key() {
        let e = Replacement { from: "🚀".into(), to: "[A]".into() };
        assert!(ReplacementTable::new("x", vec![e.clone(), e]).is_err());
    }

    #[test]
    fn load_table_reports_missing_file() {
        let err = load_table(Path::new("/nope/table.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nope/table.toml"));
    }
}
