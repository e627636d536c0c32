//! 会话生命周期管理
//!
//! `SessionState` 是会话的唯一写入者：持有文档集合、会话 ID、就绪标记、
//! 文档集合代数（generation）、各操作状态以及派生结果（回答、摘要、选择题）。
//! 这里不做任何 IO，远程调用由 `workflow::RequestCoordinator` 负责。

use crate::models::document::Document;
use crate::models::mcq::McqRecord;
use crate::models::operation::{OperationKind, OperationStatus};
use tracing::{debug, info};

/// 会话状态
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    documents: Vec<Document>,
    session_id: Option<String>,
    ready: bool,
    /// 每次文档集合变化加一，用于丢弃过期响应
    generation: u64,
    answer: Option<String>,
    summary: Option<String>,
    mcqs: Vec<McqRecord>,
    statuses: [OperationStatus; 4],
    /// 每种操作最近一次启动的请求编号，只有持有当前编号的请求能写回状态
    tokens: [u64; 4],
    last_error: Option<String>,
}

/// 只读快照，供展示层使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub document_names: Vec<String>,
    pub session_id: Option<String>,
    pub ready: bool,
    pub generation: u64,
    pub answer: Option<String>,
    pub summary: Option<String>,
    pub mcqs: Vec<McqRecord>,
    pub statuses: Vec<(OperationKind, OperationStatus)>,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn status(&self, kind: OperationKind) -> &OperationStatus {
        &self.statuses[kind.index()].1
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 文档集合 ==========

    /// 追加文档（允许重名）
    ///
    /// 会话变为未就绪，之前的回答、摘要和选择题全部清空
    pub fn add_documents(&mut self, new_docs: impl IntoIterator<Item = Document>) {
        let before = self.documents.len();
        self.documents.extend(new_docs);
        let added = self.documents.len() - before;
        if added == 0 {
            return;
        }

        self.ready = false;
        self.last_error = None;
        self.clear_results();
        self.bump_generation();
        info!("📄 添加了 {} 个文档，当前共 {} 个", added, self.documents.len());
    }

    /// 按名称移除第一个匹配的文档，返回是否移除了文档
    ///
    /// 集合变空时会话 ID 和就绪标记一并清除
    pub fn remove_document(&mut self, name: &str) -> bool {
        let Some(pos) = self.documents.iter().position(|d| d.name == name) else {
            debug!("没有名为 {} 的文档", name);
            return false;
        };

        self.documents.remove(pos);
        self.clear_results();
        self.bump_generation();
        info!("🗑️ 移除文档 {}，剩余 {} 个", name, self.documents.len());

        if self.documents.is_empty() {
            self.ready = false;
            self.session_id = None;
            info!("文档已全部移除，会话已清除");
        }
        true
    }

    /// 丢弃全部文档、会话和结果
    ///
    /// 仍在进行的请求保持 in-flight，它们的响应会因代数变化被丢弃
    pub fn reset(&mut self) {
        self.documents.clear();
        self.session_id = None;
        self.ready = false;
        self.clear_results();
        for status in &mut self.statuses {
            if !status.is_in_flight() {
                *status = OperationStatus::Idle;
            }
        }
        self.last_error = None;
        self.bump_generation();
        info!("🔄 会话已重置");
    }

    // ========== 读取 ==========

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document_names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn mcqs(&self) -> &[McqRecord] {
        &self.mcqs
    }

    pub fn status(&self, kind: OperationKind) -> &OperationStatus {
        &self.statuses[kind.index()]
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// 派生操作可用时返回会话 ID
    pub fn active_session(&self) -> Option<&str> {
        if self.ready {
            self.session_id()
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            document_names: self.document_names(),
            session_id: self.session_id.clone(),
            ready: self.ready,
            generation: self.generation,
            answer: self.answer.clone(),
            summary: self.summary.clone(),
            mcqs: self.mcqs.clone(),
            statuses: OperationKind::ALL
                .iter()
                .map(|kind| (*kind, self.status(*kind).clone()))
                .collect(),
            last_error: self.last_error.clone(),
        }
    }

    // ========== 操作状态（由协调器驱动） ==========

    /// 进入 in-flight 并返回本次请求编号；同类操作已在进行时返回 None
    pub(crate) fn try_start(&mut self, kind: OperationKind) -> Option<u64> {
        if self.status(kind).is_in_flight() {
            return None;
        }
        let slot = kind.index();
        self.statuses[slot] = OperationStatus::InFlight;
        self.tokens[slot] = self.tokens[slot].wrapping_add(1);
        match kind {
            OperationKind::Process => {}
            OperationKind::Ask => self.answer = None,
            OperationKind::Summarize => self.summary = None,
            OperationKind::GenerateMcqs => self.mcqs.clear(),
        }
        Some(self.tokens[slot])
    }

    /// 编号不是当前请求时不写状态
    fn finish(&mut self, kind: OperationKind, token: u64, status: OperationStatus) -> bool {
        let slot = kind.index();
        if self.tokens[slot] != token {
            debug!("{} 的请求编号 {} 已过期，不更新状态", kind, token);
            return false;
        }
        self.statuses[slot] = status;
        true
    }

    pub(crate) fn finish_succeeded(&mut self, kind: OperationKind, token: u64) {
        self.finish(kind, token, OperationStatus::Succeeded);
    }

    pub(crate) fn finish_failed(&mut self, kind: OperationKind, token: u64, message: &str) {
        if self.finish(kind, token, OperationStatus::Failed(message.to_string())) {
            self.last_error = Some(message.to_string());
        }
    }

    /// 过期响应被丢弃，状态回到 idle
    pub(crate) fn finish_discarded(&mut self, kind: OperationKind, token: u64) {
        self.finish(kind, token, OperationStatus::Idle);
    }

    pub(crate) fn record_error(&mut self, message: &str) {
        self.last_error = Some(message.to_string());
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }

    // ========== 结果写入 ==========

    pub(crate) fn complete_processing(&mut self, session_id: String) {
        info!("✅ 文档处理完成，会话 ID: {}", session_id);
        self.session_id = Some(session_id);
        self.ready = true;
        self.clear_results();
    }

    pub(crate) fn fail_processing(&mut self) {
        self.ready = false;
    }

    pub(crate) fn set_answer(&mut self, answer: String) {
        self.answer = Some(answer);
    }

    pub(crate) fn set_summary(&mut self, summary: String) {
        self.summary = Some(summary);
    }

    pub(crate) fn set_mcqs(&mut self, mcqs: Vec<McqRecord>) {
        self.mcqs = mcqs;
    }

    fn clear_results(&mut self) {
        self.answer = None;
        self.summary = None;
        self.mcqs.clear();
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}
