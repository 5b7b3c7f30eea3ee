//! 编码探测
//!
//! 严格按 UTF-8 解码；失败时交给可替换的字符集推测器，推测不出来则标记为 "unknown"。
//! 这里的任何失败都不会以错误形式向外传播。
use encoding_rs::Encoding;

use crate::types::EncodingVerdict;

pub const UTF8_LABEL: &str = "utf-8";
pub const UNKNOWN_LABEL: &str = "unknown";

/// 字符集推测能力
pub trait CharsetGuesser: Send + Sync {
    /// 返回推测出的字符集名称；无法判断时返回 None
    fn guess(&self, bytes: &[u8]) -> Option<String>;
}

/// 默认推测器：永远推测不出
#[derive(Debug, Default, Clone, Copy)]
pub struct UnknownGuesser;

impl CharsetGuesser for UnknownGuesser {
    fn guess(&self, _bytes: &[u8]) -> Option<String> {
        None
    }
}

/// 基于 BOM 嗅探的推测器（encoding_rs），主要用于识别带 BOM 的 UTF-16 文件
#[derive(Debug, Default, Clone, Copy)]
pub struct BomSniffGuesser;

impl CharsetGuesser for BomSniffGuesser {
    fn guess(&self, bytes: &[u8]) -> Option<String> {
        Encoding::for_bom(bytes).map(|(enc, _)| enc.name().to_string())
    }
}

/// 编码探测器
pub struct EncodingProbe<'g> {
    guesser: &'g dyn CharsetGuesser,
}

impl<'g> EncodingProbe<'g> {
    pub fn new(guesser: &'g dyn CharsetGuesser) -> Self {
        Self { guesser }
    }

    pub fn probe(&self, bytes: &[u8]) -> EncodingVerdict {
        if std::str::from_utf8(bytes).is_ok() {
            return EncodingVerdict { is_utf8: true, label: UTF8_LABEL.to_string() };
        }
        let label = self
            .guesser
            .guess(bytes)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        EncodingVerdict { is_utf8: false, label }
    }
}
