pub mod file_loader;

pub use file_loader::{load_document, load_documents_from_folder};
