use crate::error::{AppError, AppResult, FileError};
use crate::models::document::Document;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从文件读取单个文档，文档名取文件名
pub async fn load_document(path: &Path) -> AppResult<Document> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Document::new(name, content))
}

/// 加载文件夹中所有 PDF 文档（按文件名排序）
///
/// 读取失败的文件只记录警告并跳过
pub async fn load_documents_from_folder(folder_path: &str) -> AppResult<Vec<Document>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut pdf_paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            pdf_paths.push(path);
        }
    }
    pdf_paths.sort();

    // 并发读取，结果仍按文件名顺序排列
    let loaded = join_all(pdf_paths.iter().map(|path| async move {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        (path, load_document(path).await)
    }))
    .await;

    let mut documents = Vec::with_capacity(loaded.len());
    for (path, result) in loaded {
        match result {
            Ok(doc) => {
                tracing::debug!("成功加载 {}", doc);
                documents.push(doc);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(documents)
}
