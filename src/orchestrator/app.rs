//! 终端前端 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：写会话记录头、创建后端客户端和协调器、加载文档目录
//! 2. **命令循环**：从标准输入读取命令，分派给协调器
//! 3. **并发**：远程操作在独立任务中执行，不同种类可同时进行，
//!    同类重复触发由协调器直接拒绝
//! 4. **记录**：成功的回答、摘要、选择题追加到会话记录文件

use crate::clients::{Backend, BackendClient};
use crate::config::Config;
use crate::models::loaders::{load_document, load_documents_from_folder};
use crate::models::operation::OperationKind;
use crate::orchestrator::commands::{parse_command, Command, HELP_TEXT};
use crate::orchestrator::render::{
    render_document_list, render_mcqs, render_outcome, render_status,
};
use crate::services::TranscriptWriter;
use crate::utils::logging::{init_log_file, log_documents_loaded, log_startup};
use crate::workflow::RequestCoordinator;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// 一行命令的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// 应用主结构
pub struct App<B: Backend = BackendClient> {
    config: Config,
    coordinator: RequestCoordinator<B>,
    transcript: Arc<TranscriptWriter>,
}

impl<B: Backend> Clone for App<B> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            coordinator: self.coordinator.clone(),
            transcript: Arc::clone(&self.transcript),
        }
    }
}

impl App<BackendClient> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(config.backend_base(), config.request_timeout_secs);

        let backend = BackendClient::new(&config)?;
        let app = Self::with_backend(config, backend);
        app.load_documents_folder().await;
        Ok(app)
    }
}

impl<B: Backend + 'static> App<B> {
    /// 使用指定后端创建应用（不加载文档目录）
    pub fn with_backend(config: Config, backend: B) -> Self {
        let transcript = Arc::new(TranscriptWriter::with_path(config.output_log_file.clone()));
        Self {
            config,
            coordinator: RequestCoordinator::new(backend),
            transcript,
        }
    }

    /// 加载配置中的文档目录；目录不存在时只提示
    async fn load_documents_folder(&self) {
        let folder = &self.config.documents_folder;
        match load_documents_from_folder(folder).await {
            Ok(docs) => {
                log_documents_loaded(docs.len(), folder);
                self.coordinator.add_documents(docs);
            }
            Err(e) => warn!("⚠️ 无法加载文档目录: {}", e),
        }
    }

    /// 运行命令循环
    pub async fn run(&self) -> Result<()> {
        println!("{}", HELP_TEXT);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            let Some((command, arg)) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    println!("Unknown command. Type `help` for the list of commands.");
                }
                continue;
            };

            if is_remote(command) {
                // 远程操作放到后台，命令循环继续响应
                let app = self.clone();
                let arg = arg.to_string();
                tokio::spawn(async move {
                    if let Reply::Output(text) = app.execute(command, &arg).await {
                        println!("{}", text);
                    }
                });
                continue;
            }

            match self.execute(command, arg).await {
                Reply::Output(text) => println!("{}", text),
                Reply::Quit => break,
            }
        }

        info!("👋 程序结束，会话记录已保存至: {}", self.transcript.path());
        Ok(())
    }

    /// 执行一条命令并等待结果
    pub async fn execute(&self, command: Command, arg: &str) -> Reply {
        let text = match command {
            Command::Add => self.add(arg).await,
            Command::Remove => self.remove(arg),
            Command::List => render_document_list(&self.coordinator.snapshot().document_names),
            Command::Process => {
                let outcome = self.coordinator.process().await;
                render_outcome(OperationKind::Process, &outcome, |sid| {
                    format!("✅ Documents processed. Session: {}", sid)
                })
            }
            Command::Ask => self.ask(arg).await,
            Command::Summary => self.summarize().await,
            Command::Mcqs => self.generate_mcqs().await,
            Command::Status => render_status(&self.coordinator.snapshot()),
            Command::Reset => {
                self.coordinator.reset();
                "Session reset.".to_string()
            }
            Command::Help => HELP_TEXT.to_string(),
            Command::Quit => return Reply::Quit,
        };
        Reply::Output(text)
    }

    async fn add(&self, arg: &str) -> String {
        if arg.is_empty() {
            return "Usage: add <path>".to_string();
        }

        let path = Path::new(arg);
        let loaded = if path.is_dir() {
            load_documents_from_folder(arg).await
        } else {
            load_document(path).await.map(|doc| vec![doc])
        };

        match loaded {
            Ok(docs) if docs.is_empty() => format!("No PDF files found in {}", arg),
            Ok(docs) => {
                let count = docs.len();
                self.coordinator.add_documents(docs);
                format!(
                    "Added {} document(s). Pending: {}",
                    count,
                    render_document_list(&self.coordinator.snapshot().document_names)
                )
            }
            Err(e) => {
                warn!("添加文档失败: {}", e);
                format!("⚠️ Could not add {}: {}", arg, e)
            }
        }
    }

    fn remove(&self, name: &str) -> String {
        if self.coordinator.remove_document(name) {
            format!(
                "Removed {}. Pending: {}",
                name,
                render_document_list(&self.coordinator.snapshot().document_names)
            )
        } else {
            format!("No document named {}", name)
        }
    }

    async fn ask(&self, question: &str) -> String {
        let outcome = self.coordinator.ask(question).await;
        if let Some(answer) = outcome.clone().succeeded() {
            if let Err(e) = self.transcript.write_answer(question, &answer).await {
                warn!("写入会话记录失败: {}", e);
            }
        }
        render_outcome(OperationKind::Ask, &outcome, |answer| {
            format!("Answer:\n{}", answer)
        })
    }

    async fn summarize(&self) -> String {
        let outcome = self.coordinator.summarize().await;
        if let Some(summary) = outcome.clone().succeeded() {
            if let Err(e) = self.transcript.write_summary(&summary).await {
                warn!("写入会话记录失败: {}", e);
            }
        }
        render_outcome(OperationKind::Summarize, &outcome, |summary| {
            format!("Summary:\n{}", summary)
        })
    }

    async fn generate_mcqs(&self) -> String {
        let outcome = self.coordinator.generate_mcqs().await;
        if let Some(mcqs) = outcome.clone().succeeded() {
            if let Err(e) = self.transcript.write_mcqs(&mcqs).await {
                warn!("写入会话记录失败: {}", e);
            }
        }
        render_outcome(OperationKind::GenerateMcqs, &outcome, |mcqs| render_mcqs(mcqs))
    }
}

fn is_remote(command: Command) -> bool {
    matches!(
        command,
        Command::Process | Command::Ask | Command::Summary | Command::Mcqs
    )
}
