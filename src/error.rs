use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 前置条件不满足（未发起任何远程调用）
    #[error("前置条件错误: {0}")]
    Precondition(#[from] PreconditionError),
    /// 无法连接后端或后端返回失败状态
    #[error("传输错误: {0}")]
    Transport(#[from] TransportError),
    /// 后端可达但响应结构不可用
    #[error("协议错误: {0}")]
    Protocol(#[from] ProtocolError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 面向用户的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Precondition,
    Transport,
    Protocol,
}

impl AppError {
    /// 返回该错误在会话层面的分类，文件/配置错误不属于会话操作
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Precondition(_) => Some(ErrorKind::Precondition),
            AppError::Transport(_) => Some(ErrorKind::Transport),
            AppError::Protocol(_) => Some(ErrorKind::Protocol),
            AppError::File(_) | AppError::Config(_) => None,
        }
    }
}

/// 前置条件错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// 没有待处理的文档
    #[error("没有可处理的文档")]
    NoDocuments,
    /// 尚未建立会话
    #[error("尚未建立会话")]
    NoSession,
}

/// 传输错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 网络请求失败（连接失败、超时等）
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 后端返回非成功状态码
    #[error("后端返回错误状态 ({endpoint}): {status}, detail={detail:?}")]
    BadStatus {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
}

/// 协议错误
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// 响应体不是合法 JSON 或结构不符
    #[error("响应解析失败 ({endpoint}): {source}")]
    InvalidBody {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 响应缺少必需字段
    #[error("响应缺少字段 `{field}` ({endpoint})")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Transport(TransportError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建响应字段缺失错误
    pub fn missing_field(endpoint: impl Into<String>, field: &'static str) -> Self {
        AppError::Protocol(ProtocolError::MissingField {
            endpoint: endpoint.into(),
            field,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
