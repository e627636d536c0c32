//! 远程操作的种类、状态与结果

use crate::error::ErrorKind;
use std::fmt;

/// 四种远程操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Process,
    Ask,
    Summarize,
    GenerateMcqs,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Process,
        OperationKind::Ask,
        OperationKind::Summarize,
        OperationKind::GenerateMcqs,
    ];

    /// 在状态表中的下标
    pub(crate) fn index(self) -> usize {
        match self {
            OperationKind::Process => 0,
            OperationKind::Ask => 1,
            OperationKind::Summarize => 2,
            OperationKind::GenerateMcqs => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Process => "process",
            OperationKind::Ask => "ask",
            OperationKind::Summarize => "summarize",
            OperationKind::GenerateMcqs => "generate-mcqs",
        }
    }

    /// 展示给用户的失败提示
    pub fn user_message(self, kind: ErrorKind) -> &'static str {
        use ErrorKind::*;
        use OperationKind::*;
        match (self, kind) {
            (Process, Precondition) => "Please upload at least one PDF file.",
            (Process, Transport) => "Failed to process documents. Please check backend connection.",
            (Process, Protocol) => "Failed to process documents: unexpected response from backend.",
            (Ask, Precondition) | (Summarize, Precondition) => "Please process a document first.",
            (Ask, Transport) => "Error fetching answer. Please check backend connection.",
            (Ask, Protocol) => "Error fetching answer: unexpected response from backend.",
            (Summarize, Transport) => "Error generating summary. Please check backend connection.",
            (Summarize, Protocol) => "Error generating summary: unexpected response from backend.",
            (GenerateMcqs, Precondition) => "Please process a document first to get a session ID.",
            (GenerateMcqs, Transport) => "Error generating MCQs. Please check backend connection.",
            (GenerateMcqs, Protocol) => "Error generating MCQs: unexpected response from backend.",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单个操作种类的状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

impl OperationStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, OperationStatus::InFlight)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::Idle => write!(f, "idle"),
            OperationStatus::InFlight => write!(f, "in-flight"),
            OperationStatus::Succeeded => write!(f, "succeeded"),
            OperationStatus::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

/// 失败信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
}

/// 未发起远程调用就返回的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 同类操作正在进行
    AlreadyInFlight,
    /// 问题为空
    EmptyQuestion,
}

/// 协调器每个操作的返回值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome<T> {
    Succeeded(T),
    Failed(FailureReport),
    Skipped(SkipReason),
    /// 响应到达时文档集合已变化，结果被丢弃
    Discarded,
}

impl<T> OperationOutcome<T> {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, OperationOutcome::Succeeded(_))
    }

    pub fn succeeded(self) -> Option<T> {
        match self {
            OperationOutcome::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReport> {
        match self {
            OperationOutcome::Failed(report) => Some(report),
            _ => None,
        }
    }
}
