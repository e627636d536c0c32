/// 日志工具模块
///
/// 提供日志初始化、会话记录文件和格式化的辅助函数
use anyhow::{Context, Result};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化会话记录文件
///
/// # 参数
/// - `log_file_path`: 记录文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n文档学习会话记录 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入会话记录文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(backend_url: &str, timeout_secs: Option<u64>) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文档问答/摘要/选择题模式");
    info!("🌐 后端地址: {}", backend_url);
    match timeout_secs {
        Some(secs) => info!("⏱️ 请求超时: {} 秒", secs),
        None => info!("⏱️ 请求超时: 无限等待"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_documents_loaded(total: usize, folder: &str) {
    if total == 0 {
        info!("📁 目录 {} 中没有找到 PDF 文档，可用 add <路径> 手动添加", folder);
    } else {
        info!("✓ 从 {} 加载了 {} 个文档", folder, total);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
