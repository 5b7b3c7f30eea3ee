//! 编码声明检查（如 `# -*- coding: utf-8 -*-`）
use serde::Deserialize;

/// 声明行的判定规则：前 `max_lines` 行中，某一行同时包含 `marker` 与 `charset`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeclarationRule {
    pub marker: String,
    /// 字符集名，按 ASCII 大小写不敏感匹配
    pub charset: String,
    pub max_lines: usize,
}

impl Default for DeclarationRule {
    fn default() -> Self {
        Self { marker: "coding".to_string(), charset: "utf-8".to_string(), max_lines: 3 }
    }
}

impl DeclarationRule {
    pub fn has_declaration(&self, text: &str) -> bool {
        let charset = self.charset.to_ascii_lowercase();
        text.lines()
            .take(self.max_lines)
            .any(|line| line.contains(&self.marker) && line.to_ascii_lowercase().contains(&charset))
    }
}

/// 使用默认规则检查
pub fn has_declaration(text: &str) -> bool {
    DeclarationRule::default().has_declaration(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_forms() {
        assert!(has_declaration("# -*- coding: utf-8 -*-\n"));
        assert!(has_declaration("#!/usr/bin/env python\n# coding=UTF-8\n"));
        assert!(has_declaration("#!/usr/bin/env python\n\n# vim: set fileencoding=utf-8 :\n"));
    }

    #[test]
    fn only_first_three_lines_count() {
        assert!(!has_declaration("a\nb\nc\n# -*- coding: utf-8 -*-\n"));
    }

    #[test]
    fn needs_both_marker_and_charset() {
        assert!(!has_declaration("# coding: latin-1\n"));
        assert!(!has_declaration("# utf-8 text\n"));
        assert!(!has_declaration(""));
    }

    #[test]
    fn custom_rule() {
        let rule = DeclarationRule { marker: "encoding".into(), charset: "utf-8".into(), max_lines: 1 };
        assert!(rule.has_declaration("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(!rule.has_declaration("\n<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    }
}
