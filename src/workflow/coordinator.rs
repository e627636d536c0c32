//! 请求协调器 - 流程层
//!
//! 核心职责：发起四种远程操作（process / ask / summarize / generate-mcqs），
//! 并把所有结果和错误写回 `SessionState`。
//!
//! 规则：
//! 1. 每种操作同一时间最多一个 in-flight，重复触发直接跳过，不排队
//! 2. 不同种类的操作可以并发
//! 3. 请求发出时记录文档集合代数，响应到达时代数已变化则丢弃结果
//! 4. 所有错误都在这里转换为 `Failed` 状态和提示信息，不向上抛出
//! 5. 锁只在读写状态时持有，从不跨越 `.await`
//! 6. 每次请求带一个编号，只有当前编号的请求能写回操作状态；
//!    reset 保留 in-flight 状态，重置后同类请求仍需等待旧请求返回

use crate::clients::Backend;
use crate::error::{AppError, AppResult, ErrorKind, PreconditionError};
use crate::models::document::Document;
use crate::models::mcq::McqRecord;
use crate::models::operation::{
    FailureReport, OperationKind, OperationOutcome, OperationStatus, SkipReason,
};
use crate::services::mcq_parser::parse_mcqs;
use crate::session::{SessionSnapshot, SessionState};
use crate::utils::truncate_text;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// 回答为空时展示的文本
pub const NO_ANSWER: &str = "No response from model.";
/// 摘要为空时展示的文本
pub const NO_SUMMARY: &str = "No summary available.";

/// 请求协调器
///
/// 克隆后共享同一份状态，可以在多个任务中并发调用
pub struct RequestCoordinator<B: Backend> {
    backend: Arc<B>,
    state: Arc<Mutex<SessionState>>,
}

impl<B: Backend> Clone for RequestCoordinator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

/// 发出请求时记录的上下文
struct Ticket {
    /// 本次请求编号，只有当前编号能写回操作状态
    token: u64,
    generation: u64,
}

impl<B: Backend> RequestCoordinator<B> {
    /// 创建新的协调器
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    pub fn with_shared_backend(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // 状态修改都是单步完成的，锁中毒时继续使用内部数据
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ========== 文档集合（委托给 SessionState） ==========

    pub fn add_documents(&self, documents: impl IntoIterator<Item = Document>) {
        self.lock().add_documents(documents);
    }

    pub fn remove_document(&self, name: &str) -> bool {
        self.lock().remove_document(name)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        self.lock().status(kind).clone()
    }

    // ========== 远程操作 ==========

    /// 上传当前文档并建立会话
    pub async fn process(&self) -> OperationOutcome<String> {
        let kind = OperationKind::Process;

        let (ticket, documents) = {
            let mut state = self.lock();
            if state.documents().is_empty() {
                return refuse(&mut state, kind, PreconditionError::NoDocuments);
            }
            let Some(token) = state.try_start(kind) else {
                debug!("文档处理正在进行，忽略重复请求");
                return OperationOutcome::Skipped(SkipReason::AlreadyInFlight);
            };
            state.clear_error();
            let ticket = Ticket {
                token,
                generation: state.generation(),
            };
            (ticket, state.documents().to_vec())
        };

        info!("📤 正在处理 {} 个文档...", documents.len());
        let result = self.backend.process(&documents).await;

        let mut state = self.lock();
        if state.generation() != ticket.generation {
            warn!("⚠️ 文档集合在处理期间已变化，丢弃本次处理结果");
            state.finish_discarded(kind, ticket.token);
            return OperationOutcome::Discarded;
        }

        match result {
            Ok(session_id) => {
                state.complete_processing(session_id.clone());
                state.finish_succeeded(kind, ticket.token);
                OperationOutcome::Succeeded(session_id)
            }
            Err(err) => {
                state.fail_processing();
                fail(&mut state, kind, ticket.token, &err)
            }
        }
    }

    /// 针对当前会话提问
    pub async fn ask(&self, question: &str) -> OperationOutcome<String> {
        let question = question.trim().to_string();
        if question.is_empty() {
            debug!("问题为空，不发送请求");
            return OperationOutcome::Skipped(SkipReason::EmptyQuestion);
        }

        let backend = Arc::clone(&self.backend);
        let outcome = self
            .run_session_op(
                OperationKind::Ask,
                move |session_id| async move {
                    info!("❓ 提问: {}", truncate_text(&question, 80));
                    let answer = backend.ask(&session_id, &question).await?;
                    Ok::<_, AppError>(non_empty_or(answer, NO_ANSWER))
                },
                |state, answer: &String| state.set_answer(answer.clone()),
            )
            .await;

        if let OperationOutcome::Succeeded(answer) = &outcome {
            debug!("回答: {}", truncate_text(answer, 200));
        }
        outcome
    }

    /// 生成整个文档的摘要
    pub async fn summarize(&self) -> OperationOutcome<String> {
        let backend = Arc::clone(&self.backend);
        self.run_session_op(
            OperationKind::Summarize,
            move |session_id| async move {
                info!("📝 正在生成摘要...");
                let summary = backend.summarize(&session_id).await?;
                Ok::<_, AppError>(non_empty_or(summary, NO_SUMMARY))
            },
            |state, summary: &String| state.set_summary(summary.clone()),
        )
        .await
    }

    /// 生成选择题，原始载荷经过解析后再写入状态
    pub async fn generate_mcqs(&self) -> OperationOutcome<Vec<McqRecord>> {
        let backend = Arc::clone(&self.backend);
        self.run_session_op(
            OperationKind::GenerateMcqs,
            move |session_id| async move {
                info!("🧩 正在生成选择题...");
                let payload = backend.fetch_mcqs(&session_id).await?;
                let records = parse_mcqs(payload);

                let degenerate = records.iter().filter(|r| r.options.is_empty()).count();
                if degenerate > 0 {
                    warn!("{} 道选择题没有解析出选项", degenerate);
                }
                info!("✓ 解析出 {} 道选择题", records.len());
                Ok::<_, AppError>(records)
            },
            |state, records: &Vec<McqRecord>| state.set_mcqs(records.clone()),
        )
        .await
    }

    /// 派生操作的公共流程：检查会话 → 进入 in-flight → 调用 → 校验是否过期 → 写回
    async fn run_session_op<T, F, Fut>(
        &self,
        kind: OperationKind,
        call: F,
        store: impl FnOnce(&mut SessionState, &T),
    ) -> OperationOutcome<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let (ticket, session_id) = {
            let mut state = self.lock();
            let Some(session_id) = state.active_session().map(str::to_string) else {
                return refuse(&mut state, kind, PreconditionError::NoSession);
            };
            let Some(token) = state.try_start(kind) else {
                debug!("{} 正在进行，忽略重复请求", kind);
                return OperationOutcome::Skipped(SkipReason::AlreadyInFlight);
            };
            let ticket = Ticket {
                token,
                generation: state.generation(),
            };
            (ticket, session_id)
        };

        let result = call(session_id.clone()).await;

        let mut state = self.lock();
        let still_current = state.generation() == ticket.generation
            && state.active_session() == Some(session_id.as_str());
        if !still_current {
            warn!("⚠️ {} 的响应已过期（会话或文档已变化），丢弃", kind);
            state.finish_discarded(kind, ticket.token);
            return OperationOutcome::Discarded;
        }

        match result {
            Ok(value) => {
                store(&mut state, &value);
                state.finish_succeeded(kind, ticket.token);
                OperationOutcome::Succeeded(value)
            }
            Err(err) => fail(&mut state, kind, ticket.token, &err),
        }
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

/// 前置条件不满足：不发请求，不改变操作状态，只给出提示
fn refuse<T>(
    state: &mut SessionState,
    kind: OperationKind,
    reason: PreconditionError,
) -> OperationOutcome<T> {
    let message = kind.user_message(ErrorKind::Precondition);
    warn!("{} 被拒绝: {}", kind, AppError::from(reason));
    state.record_error(message);
    OperationOutcome::Failed(FailureReport {
        kind: ErrorKind::Precondition,
        message: message.to_string(),
    })
}

fn fail<T>(
    state: &mut SessionState,
    kind: OperationKind,
    token: u64,
    err: &AppError,
) -> OperationOutcome<T> {
    let error_kind = err.kind().unwrap_or(ErrorKind::Protocol);
    let message = kind.user_message(error_kind);
    error!("❌ {} 失败: {}", kind, err);
    state.finish_failed(kind, token, message);
    OperationOutcome::Failed(FailureReport {
        kind: error_kind,
        message: message.to_string(),
    })
}
