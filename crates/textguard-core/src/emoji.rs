//! emoji 扫描与规范化
//!
//! 扫描：逐行判断是否含有下列码点区间内的字符，每行至多报告一次。
//! 规范化：对整份文本做两遍字面替换
//! 1. 按替换表（Aho-Corasick，最左最长）把已知 emoji 换成 ASCII 标签；
//! 2. 剩余区间内码点统一替换为 `[EMOJI]`。
//! 输出只含 ASCII 标签，所以再次规范化不会产生变化。
use std::iter::Peekable;
use std::str::Chars;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::error::GuardError;
use crate::table::ReplacementTable;
use crate::types::EmojiOccurrence;

/// 未收录 emoji 的兜底标签
pub const EMOJI_TAG: &str = "[EMOJI]";

/// 视为 emoji 的码点区间（闭区间）
pub const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs
    (0x1F680, 0x1F6FF), // transport & map
    (0x1F1E6, 0x1F1FF), // regional indicators
    (0x2600, 0x26FF),   // misc symbols
    (0x2700, 0x27BF),   // dingbats
    (0x1F900, 0x1F9FF), // supplemental symbols & pictographs
    (0x1FA70, 0x1FAFF), // symbols & pictographs extended-A
];

const VS16: char = '\u{FE0F}';
const ZWJ: char = '\u{200D}';

pub fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

fn is_regional_indicator(c: char) -> bool {
    (0x1F1E6..=0x1F1FF).contains(&(c as u32))
}

fn is_skin_tone(c: char) -> bool {
    (0x1F3FB..=0x1F3FF).contains(&(c as u32))
}

/// 逐行扫描，返回含 emoji 的行
pub fn scan_emoji(text: &str) -> Vec<EmojiOccurrence> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.chars().any(is_emoji))
        .map(|(idx, line)| EmojiOccurrence { line_number: idx + 1, line_text: line.trim().to_string() })
        .collect()
}

/// 规范化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// 两遍替换的总次数
    pub replacements: usize,
}

impl Normalized {
    pub fn changed(&self) -> bool {
        self.replacements > 0
    }
}

/// emoji 规范化器；持有注入的替换表与由其构建的自动机
pub struct EmojiNormalizer {
    table: ReplacementTable,
    ac: AhoCorasick,
}

impl EmojiNormalizer {
    pub fn new(table: ReplacementTable) -> Result<Self, GuardError> {
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(table.entries().iter().map(|e| e.from.as_str()))
            .map_err(|e| GuardError::Table(e.to_string()))?;
        Ok(Self { table, ac })
    }

    pub fn table(&self) -> &ReplacementTable {
        &self.table
    }

    pub fn normalize(&self, text: &str) -> Normalized {
        let (known, n1) = self.replace_known(text);
        let (text, n2) = replace_remaining(&known);
        Normalized { text, replacements: n1 + n2 }
    }

    /// 第一遍：替换表内的已知序列；紧随其后的 VS16 一并吞掉
    fn replace_known(&self, text: &str) -> (String, usize) {
        let entries = self.table.entries();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut count = 0;
        for m in self.ac.find_iter(text) {
            if m.start() < last {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            out.push_str(&entries[m.pattern().as_usize()].to);
            last = m.end();
            if text[last..].starts_with(VS16) {
                last += VS16.len_utf8();
            }
            count += 1;
        }
        out.push_str(&text[last..]);
        (out, count)
    }
}

/// 第二遍：区间内剩余码点换成兜底标签，连带吸收修饰符与 ZWJ 组合
fn replace_remaining(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut count = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_emoji(c) {
            out.push(c);
            continue;
        }
        out.push_str(EMOJI_TAG);
        count += 1;
        if is_regional_indicator(c) {
            // 国旗由两个区域指示符组成
            if chars.peek().copied().is_some_and(is_regional_indicator) {
                chars.next();
            }
        }
        absorb_components(&mut chars);
    }
    (out, count)
}

fn absorb_components(chars: &mut Peekable<Chars<'_>>) {
    loop {
        match chars.peek().copied() {
            Some(c) if c == VS16 || is_skin_tone(c) => {
                chars.next();
            }
            Some(ZWJ) => {
                let mut ahead = chars.clone();
                ahead.next();
                if !ahead.peek().copied().is_some_and(is_emoji) {
                    break;
                }
                chars.next();
                chars.next();
            }
            _ => break,
        }
    }
}
