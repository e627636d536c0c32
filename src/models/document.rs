use std::fmt;

/// 默认的文档类型
pub const PDF_MIME: &str = "application/pdf";

/// 用户选择的待上传文档
///
/// `name` 是文档在待处理集合中的键，但允许重名
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: Vec<u8>,
    pub mime: String,
}

impl Document {
    /// 创建 PDF 文档
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            mime: PDF_MIME.to_string(),
        }
    }
}

// 内容可能很大，调试输出只显示长度
impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("size", &self.content.len())
            .field("mime", &self.mime)
            .finish()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} 字节)", self.name, self.content.len())
    }
}
