//! 文档处理后端客户端
//!
//! 封装 process / chat / summary / mcqs 四个远程调用，
//! 所有请求都指向同一个 `backend_url`

use crate::config::Config;
use crate::error::{AppError, AppResult, ProtocolError, TransportError};
use crate::models::document::Document;
use crate::models::mcq::McqPayload;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// 后端能力
///
/// 协调器只依赖这个 trait，测试中可以替换为脚本化实现
#[async_trait]
pub trait Backend: Send + Sync {
    /// 上传文档，返回会话 ID
    async fn process(&self, documents: &[Document]) -> AppResult<String>;

    /// 提问；响应中没有 `answer` 时返回空字符串
    async fn ask(&self, session_id: &str, question: &str) -> AppResult<String>;

    /// 生成摘要；响应中没有 `summary` 时返回空字符串
    async fn summarize(&self, session_id: &str) -> AppResult<String>;

    /// 获取选择题原始载荷；`mcqs` 缺失或为 null 时视为空文本
    async fn fetch_mcqs(&self, session_id: &str) -> AppResult<McqPayload>;
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct McqResponse {
    #[serde(default)]
    mcqs: Option<McqPayload>,
}

/// FastAPI 错误响应体
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// 基于 reqwest 的后端客户端
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("无法创建 HTTP 客户端")?;

        Ok(Self {
            client,
            base_url: config.backend_base().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求并把响应体解析为 JSON
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::request_failed(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::request_failed(endpoint, e))?;

        debug!("{} 响应状态: {} | 响应长度: {}", endpoint, status, body.len());

        if !status.is_success() {
            let detail = parse_error_detail(&body);
            warn!("{} 返回错误状态 {}: {:?}", endpoint, status, detail);
            return Err(TransportError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        parse_body(endpoint, &body)
    }
}

fn parse_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> AppResult<T> {
    serde_json::from_str(body).map_err(|source| {
        ProtocolError::InvalidBody {
            endpoint: endpoint.to_string(),
            source,
        }
        .into()
    })
}

fn parse_error_detail(body: &str) -> Option<String> {
    let detail = serde_json::from_str::<ErrorBody>(body).ok()?.detail?;
    match detail {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn session_id_from(endpoint: &str, response: ProcessResponse) -> AppResult<String> {
    response
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::missing_field(endpoint, "session_id"))
}

#[async_trait]
impl Backend for BackendClient {
    async fn process(&self, documents: &[Document]) -> AppResult<String> {
        const ENDPOINT: &str = "/process";

        let mut form = Form::new();
        for doc in documents {
            let part = Part::bytes(doc.content.clone())
                .file_name(doc.name.clone())
                .mime_str(&doc.mime)
                .map_err(|e| AppError::request_failed(ENDPOINT, e))?;
            form = form.part("files", part);
        }

        debug!("上传 {} 个文档到 {}", documents.len(), self.url(ENDPOINT));

        let request = self.client.post(self.url(ENDPOINT)).multipart(form);
        let response: ProcessResponse = self.send_json(ENDPOINT, request).await?;
        session_id_from(ENDPOINT, response)
    }

    async fn ask(&self, session_id: &str, question: &str) -> AppResult<String> {
        const ENDPOINT: &str = "/chat/";

        let form = Form::new()
            .text("session_id", session_id.to_string())
            .text("question", question.to_string());

        let request = self.client.post(self.url(ENDPOINT)).multipart(form);
        let response: AskResponse = self.send_json(ENDPOINT, request).await?;
        Ok(response.answer.unwrap_or_default())
    }

    async fn summarize(&self, session_id: &str) -> AppResult<String> {
        let endpoint = format!("/summary/{}", session_id);
        let request = self.client.get(self.url(&endpoint));
        let response: SummaryResponse = self.send_json(&endpoint, request).await?;
        Ok(response.summary.unwrap_or_default())
    }

    async fn fetch_mcqs(&self, session_id: &str) -> AppResult<McqPayload> {
        let endpoint = format!("/mcqs/{}", session_id);
        let request = self.client.get(self.url(&endpoint));
        let response: McqResponse = self.send_json(&endpoint, request).await?;
        Ok(response.mcqs.unwrap_or_default())
    }
}
