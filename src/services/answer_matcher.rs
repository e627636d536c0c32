//! 答案匹配服务 - 业务能力层
//!
//! 根据答案文本中的 `X)` 模式（X 为 A-D，不区分大小写）确定正确选项。
//! 这是固定模式匹配：答案里只有 `B.` 或单独的 `B` 时不会高亮任何选项。

use crate::models::mcq::{MarkedOption, McqRecord};
use regex::Regex;
use std::sync::OnceLock;

fn correct_letter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Da-d]\)").expect("答案字母正则无效"))
}

/// 从答案文本中找出正确选项字母（大写）
pub fn correct_letter(answer: &str) -> Option<char> {
    correct_letter_regex()
        .find(answer)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_uppercase())
}

/// 选项字母：去掉前导空白后的第一个字符（大写）
pub fn option_letter(option: &str) -> Option<char> {
    option
        .trim_start()
        .chars()
        .next()
        .map(|c| c.to_uppercase().next().unwrap_or(c))
}

/// 返回正确选项的下标（按选项顺序第一个匹配的）
pub fn correct_index(record: &McqRecord) -> Option<usize> {
    let letter = correct_letter(&record.answer)?;
    record
        .options
        .iter()
        .position(|opt| option_letter(opt) == Some(letter))
}

/// 为每个选项标记是否正确
pub fn mark_options(record: &McqRecord) -> Vec<MarkedOption> {
    let letter = correct_letter(&record.answer);
    record
        .options
        .iter()
        .map(|opt| MarkedOption {
            text: opt.clone(),
            is_correct: letter.is_some() && option_letter(opt) == letter,
        })
        .collect()
}
