use serde::{Deserialize, Serialize};

/// 规范化后的选择题
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqRecord {
    /// 题干（保留原始首行，不去掉题号）
    pub question: String,
    /// 选项，保持原顺序，可以为空
    pub options: Vec<String>,
    /// 后端给出的正确答案原文，格式不保证
    pub answer: String,
}

impl McqRecord {
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            answer: answer.into(),
        }
    }
}

/// 后端返回的单条结构化选择题，字段都可能缺失
///
/// 后端解析失败时会返回 `[{"error": ...}, {"raw_text": ...}]`，
/// 因此这里也接收 `error` / `raw_text`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMcqItem {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl From<McqRecord> for RawMcqItem {
    fn from(record: McqRecord) -> Self {
        Self {
            question: Some(record.question),
            options: Some(record.options),
            answer: Some(record.answer),
            error: None,
            raw_text: None,
        }
    }
}

/// `mcqs` 字段的两种形态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McqPayload {
    /// 已结构化的题目列表
    Structured(Vec<RawMcqItem>),
    /// 需要解析的自由文本
    Freeform(String),
}

impl Default for McqPayload {
    fn default() -> Self {
        McqPayload::Freeform(String::new())
    }
}

/// 带有判定结果的选项，供展示层高亮
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedOption {
    pub text: String,
    pub is_correct: bool,
}
