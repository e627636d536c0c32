use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 后端地址（四个远程操作共用）
    pub backend_url: String,
    /// 请求超时秒数，None 表示一直等待
    pub request_timeout_secs: Option<u64>,
    /// 启动时自动加载的文档目录
    pub documents_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 会话记录文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            request_timeout_secs: None,
            documents_folder: "documents".to_string(),
            verbose_logging: false,
            output_log_file: "session_log.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，缺失或无法解析的项使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|source| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })
        })
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 加载配置：`DOC_STUDY_CONFIG` 指定的 TOML 文件（如有），再叠加环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("DOC_STUDY_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(path.trim())?,
            _ => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            backend_url: std::env::var("BACKEND_URL").unwrap_or(self.backend_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(self.request_timeout_secs),
            documents_folder: std::env::var("DOCUMENTS_FOLDER").unwrap_or(self.documents_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 请求超时
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// 去掉末尾斜杠的后端地址
    pub fn backend_base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}
