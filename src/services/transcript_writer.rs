//! 会话记录服务 - 业务能力层
//!
//! 只负责"把结果追加到记录文件"，不关心流程

use crate::error::{AppResult, FileError};
use crate::models::mcq::McqRecord;
use crate::services::answer_matcher::mark_options;
use std::fmt::Write as _;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 会话记录服务
pub struct TranscriptWriter {
    file_path: String,
}

impl TranscriptWriter {
    /// 使用指定文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }

    /// 记录一次问答
    pub async fn write_answer(&self, question: &str, answer: &str) -> AppResult<()> {
        self.append("问答", &format!("Q: {}\nA: {}\n", question, answer))
            .await
    }

    /// 记录摘要
    pub async fn write_summary(&self, summary: &str) -> AppResult<()> {
        self.append("摘要", &format!("{}\n", summary)).await
    }

    /// 记录一组选择题，正确选项用 ✓ 标出
    pub async fn write_mcqs(&self, mcqs: &[McqRecord]) -> AppResult<()> {
        let mut body = String::new();
        for (idx, record) in mcqs.iter().enumerate() {
            let _ = writeln!(body, "[{}] {}", idx + 1, record.question);
            for option in mark_options(record) {
                let mark = if option.is_correct { "✓" } else { " " };
                let _ = writeln!(body, "  {} {}", mark, option.text);
            }
            if !record.answer.is_empty() {
                let _ = writeln!(body, "  答案: {}", record.answer);
            }
        }
        self.append("选择题", &body).await
    }

    async fn append(&self, title: &str, body: &str) -> AppResult<()> {
        debug!("写入会话记录: {} | 长度: {}", title, body.len());

        let entry = format!(
            "--- {} | {} ---\n{}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            title,
            body
        );

        let write_failed = |source| FileError::WriteFailed {
            path: self.file_path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await
            .map_err(write_failed)?;
        file.write_all(entry.as_bytes())
            .await
            .map_err(write_failed)?;

        Ok(())
    }
}
