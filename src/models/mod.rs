pub mod document;
pub mod loaders;
pub mod mcq;
pub mod operation;

pub use document::Document;
pub use loaders::{load_document, load_documents_from_folder};
pub use mcq::{MarkedOption, McqPayload, McqRecord, RawMcqItem};
pub use operation::{FailureReport, OperationKind, OperationOutcome, OperationStatus, SkipReason};
