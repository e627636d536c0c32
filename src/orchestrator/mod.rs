//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 终端前端
//! - 初始化（会话记录、后端客户端、文档目录）
//! - 命令循环，远程操作放入后台任务
//! - 成功结果写入会话记录
//!
//! ### `commands` - 命令表
//!
//! ### `render` - 纯文本渲染，不做任何判断
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (命令 / 展示)
//!     ↓
//! workflow::RequestCoordinator (远程操作 / 状态转换)
//!     ↓                         ↓
//! session::SessionState      clients::Backend
//!     ↓
//! services (mcq_parser / answer_matcher / transcript_writer)
//! ```

pub mod app;
pub mod commands;
pub mod render;

pub use app::{App, Reply};
pub use commands::{parse_command, Command};
