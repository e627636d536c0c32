//! 选择题解析服务 - 业务能力层
//!
//! 把后端返回的 `mcqs`（结构化列表或自由文本）规范化为 `Vec<McqRecord>`。
//! 解析是全函数：任何输入都返回结果，不会失败。

use crate::models::mcq::{McqPayload, McqRecord, RawMcqItem};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// 选项行：行首单个大写 A-D 后跟句点
fn option_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-D]\.").expect("选项正则无效"))
}

/// 答案行：包含 correct / answer（不区分大小写）或 ✓
fn answer_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)correct|answer|✓").expect("答案正则无效"))
}

/// 解析选择题载荷
pub fn parse_mcqs(payload: McqPayload) -> Vec<McqRecord> {
    match payload {
        McqPayload::Structured(items) => normalize_structured(items),
        McqPayload::Freeform(text) => parse_mcqs_from_text(&text),
    }
}

/// 结构化列表：保持顺序，仅补默认值
///
/// 没有题目字段的条目：带 `raw_text` 的按自由文本展开，其余丢弃
fn normalize_structured(items: Vec<RawMcqItem>) -> Vec<McqRecord> {
    let mut records = Vec::with_capacity(items.len());

    for item in items {
        let is_marker = item.question.is_none() && item.options.is_none() && item.answer.is_none();
        if is_marker {
            if let Some(raw_text) = item.raw_text.as_deref() {
                debug!("结构化结果中包含原始文本，按自由文本解析");
                records.extend(parse_mcqs_from_text(raw_text));
            } else {
                warn!("丢弃无题目的选择题条目: {:?}", item.error);
            }
            continue;
        }

        records.push(McqRecord {
            question: item.question.unwrap_or_default(),
            options: item.options.unwrap_or_default(),
            answer: item.answer.unwrap_or_default(),
        });
    }

    records
}

/// 解析自由文本形式的选择题
///
/// 1. 以一个或多个空行（仅含空白的行）分块
/// 2. 块内第一行是题干（原样保留）
/// 3. 其余行中以 `A.`-`D.` 开头的是选项
/// 4. 其余非选项行中第一个含 correct/answer/✓ 的是答案行
/// 5. 答案取最后一个冒号之后的内容；没有冒号则取整行
pub fn parse_mcqs_from_text(text: &str) -> Vec<McqRecord> {
    split_blocks(text)
        .into_iter()
        .filter_map(|lines| parse_block(&lines))
        .collect()
}

fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(lines: &[&str]) -> Option<McqRecord> {
    let (question, rest) = lines.split_first()?;

    let (options, others): (Vec<&str>, Vec<&str>) = rest
        .iter()
        .copied()
        .partition(|line| option_line_regex().is_match(line));

    let answer = others
        .iter()
        .find(|line| answer_line_regex().is_match(line))
        .map(|line| extract_answer(line))
        .unwrap_or_default();

    Some(McqRecord {
        question: question.to_string(),
        options: options.into_iter().map(str::to_string).collect(),
        answer,
    })
}

fn extract_answer(line: &str) -> String {
    match line.rfind(':') {
        Some(pos) => line[pos + 1..].trim().to_string(),
        None => line.trim().to_string(),
    }
}
