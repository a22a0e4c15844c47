pub mod document;
pub mod docx;
pub mod summary;

pub use document::{AssembleRequest, DOCX_CONTENT_TYPE, DocumentStore};
pub use summary::{FieldResponses, SummaryInput, compose};
