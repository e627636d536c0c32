//! # Doc Study Client
//!
//! 文档问答 / 摘要 / 选择题生成的客户端
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - `Backend` trait 和基于 reqwest 的 `BackendClient`
//!
//! ### ② 业务能力层（Services）
//! - `mcq_parser` - 把结构化或自由文本的选择题规范化
//! - `answer_matcher` - 根据答案文本确定正确选项
//! - `transcript_writer` - 写会话记录
//!
//! ### ③ 会话层（Session）
//! - `SessionState` - 文档集合、会话 ID、就绪标记、各操作状态的唯一持有者
//!
//! ### ④ 流程层（Workflow）
//! - `RequestCoordinator` - 发起远程操作，防止同类重复请求，丢弃过期响应，
//!   把错误转换为失败状态
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator::App` - 终端命令循环与展示
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{Backend, BackendClient};
pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind};
pub use models::{
    Document, McqPayload, McqRecord, OperationKind, OperationOutcome, OperationStatus,
};
pub use orchestrator::App;
pub use session::{SessionSnapshot, SessionState};
pub use workflow::RequestCoordinator;
