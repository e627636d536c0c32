//! 展示层渲染
//!
//! 只把状态和结果格式化为文本，不做任何判断

use crate::models::mcq::McqRecord;
use crate::models::operation::{OperationKind, OperationOutcome, SkipReason};
use crate::services::answer_matcher::mark_options;
use crate::session::SessionSnapshot;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

/// 去掉题干前面的 "1." / "1)" 题号
pub fn strip_question_number(question: &str) -> &str {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\s*\d+\s*[.)]\s*").expect("题号正则无效"));
    match re.find(question) {
        Some(m) => &question[m.end()..],
        None => question,
    }
}

/// 渲染一组选择题，正确选项前加 ✓
pub fn render_mcqs(mcqs: &[McqRecord]) -> String {
    if mcqs.is_empty() {
        return "No MCQs generated.".to_string();
    }

    let mut out = String::new();
    for (idx, record) in mcqs.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, strip_question_number(&record.question));
        for option in mark_options(record) {
            let mark = if option.is_correct { "✓" } else { " " };
            let _ = writeln!(out, "   {} {}", mark, option.text);
        }
        if !record.answer.is_empty() {
            let _ = writeln!(out, "   Answer: {}", record.answer);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// 渲染一次操作的结果
pub fn render_outcome<T>(
    kind: OperationKind,
    outcome: &OperationOutcome<T>,
    success: impl FnOnce(&T) -> String,
) -> String {
    match outcome {
        OperationOutcome::Succeeded(value) => success(value),
        OperationOutcome::Failed(report) => format!("⚠️ {}", report.message),
        OperationOutcome::Skipped(SkipReason::AlreadyInFlight) => {
            format!("⏳ {} is already running, please wait.", kind)
        }
        OperationOutcome::Skipped(SkipReason::EmptyQuestion) => {
            "Please enter a question.".to_string()
        }
        OperationOutcome::Discarded => {
            format!("{} result discarded: documents changed while it was running.", kind)
        }
    }
}

/// 渲染会话状态
pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Documents: {}", render_document_list(&snapshot.document_names));
    let _ = writeln!(
        out,
        "Session: {} ({})",
        snapshot.session_id.as_deref().unwrap_or("none"),
        if snapshot.ready { "ready" } else { "not ready" }
    );
    for kind in OperationKind::ALL {
        let _ = writeln!(out, "  {:<14} {}", kind.name(), snapshot.status(kind));
    }
    if let Some(err) = &snapshot.last_error {
        let _ = writeln!(out, "Last error: {}", err);
    }
    out.trim_end().to_string()
}

pub fn render_document_list(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
