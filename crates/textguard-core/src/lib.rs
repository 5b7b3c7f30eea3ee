//! 文本文件编码与内容规范检查库
//!
//! 检查项：
//! - 文件必须是合法 UTF-8（否则尝试推测字符集并报告）
//! - 文件头不得带 BOM
//! - 正文不得包含 emoji（可规范化为 ASCII 标签）
//! - 前几行需包含编码声明（缺失时为 warning，但同样判为不通过）
//!
//! 每个文件的校验/修复只依赖该文件内容与不可变规则，目录级处理可并行，
//! 单个文件失败不会中断整体扫描。

mod bom;
mod config;
mod declaration;
mod emoji;
mod error;
mod fsio;
mod options;
mod probe;
mod report;
mod table;
mod types;
mod validator;
mod walk;

pub use bom::{detect_bom, fix_bom_file, strip_bom};
pub use config::{load_config, resolve_config, GuardConfig, DEFAULT_CONFIG_FILE};
pub use declaration::{has_declaration, DeclarationRule};
pub use emoji::{is_emoji, scan_emoji, EmojiNormalizer, Normalized, EMOJI_RANGES, EMOJI_TAG};
pub use error::GuardError;
pub use options::{FixMode, WalkOptions};
pub use probe::{BomSniffGuesser, CharsetGuesser, EncodingProbe, UnknownGuesser};
pub use report::{render_directory, render_file, render_fix, render_fix_summary, render_json};
pub use table::{load_table, Replacement, ReplacementTable, BUILTIN_TABLE_VERSION};
pub use types::{
    BomKind, DirectoryReport, EmojiOccurrence, EncodingVerdict, FileReport, FixReport, FixSummary, Issue, Severity,
};
pub use validator::{FileValidator, FixOutcome};
pub use walk::{discover_files, fix_directory, fix_path, validate_directory, validate_path, Target};
