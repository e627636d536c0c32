#![allow(dead_code)]

use async_trait::async_trait;
use doc_study_client::error::TransportError;
use doc_study_client::{AppError, AppResult, Backend, Document, McqPayload};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// 调用暂停点：后端进入调用时通知 `entered`，等待 `release` 后才返回
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// 脚本化后端：按顺序返回预设结果并统计调用次数
#[derive(Default)]
pub struct ScriptedBackend {
    pub process_calls: AtomicUsize,
    pub ask_calls: AtomicUsize,
    pub summarize_calls: AtomicUsize,
    pub mcq_calls: AtomicUsize,
    process_results: Mutex<VecDeque<AppResult<String>>>,
    answers: Mutex<VecDeque<AppResult<String>>>,
    summaries: Mutex<VecDeque<AppResult<String>>>,
    mcq_payloads: Mutex<VecDeque<AppResult<McqPayload>>>,
    uploads: Mutex<Vec<Vec<String>>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

pub fn transport_error(endpoint: &str) -> AppError {
    TransportError::BadStatus {
        endpoint: endpoint.to_string(),
        status: 502,
        detail: Some("Bad Gateway".to_string()),
    }
    .into()
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_process(&self, result: AppResult<String>) -> &Self {
        self.process_results.lock().unwrap().push_back(result);
        self
    }

    pub fn push_answer(&self, result: AppResult<String>) -> &Self {
        self.answers.lock().unwrap().push_back(result);
        self
    }

    pub fn push_summary(&self, result: AppResult<String>) -> &Self {
        self.summaries.lock().unwrap().push_back(result);
        self
    }

    pub fn push_mcqs(&self, result: AppResult<McqPayload>) -> &Self {
        self.mcq_payloads.lock().unwrap().push_back(result);
        self
    }

    /// 让之后的调用在 gate 上暂停
    pub fn hold(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// 每次 process 上传的文档名
    pub fn uploads(&self) -> Vec<Vec<String>> {
        self.uploads.lock().unwrap().clone()
    }

    async fn pause(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }

    fn next<T>(queue: &Mutex<VecDeque<AppResult<T>>>, endpoint: &str) -> AppResult<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_error(endpoint)))
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn process(&self, documents: &[Document]) -> AppResult<String> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        self.uploads
            .lock()
            .unwrap()
            .push(documents.iter().map(|d| d.name.clone()).collect());
        self.pause().await;
        Self::next(&self.process_results, "/process")
    }

    async fn ask(&self, _session_id: &str, _question: &str) -> AppResult<String> {
        self.ask_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Self::next(&self.answers, "/chat/")
    }

    async fn summarize(&self, _session_id: &str) -> AppResult<String> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Self::next(&self.summaries, "/summary")
    }

    async fn fetch_mcqs(&self, _session_id: &str) -> AppResult<McqPayload> {
        self.mcq_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Self::next(&self.mcq_payloads, "/mcqs")
    }
}

pub fn doc(name: &str) -> Document {
    Document::new(name, format!("%PDF-{}", name).into_bytes())
}

pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
