//! Simulated file uploads for the wizard steps that accept documents.

mod config;
mod magic;
mod uploader;

pub use config::{UploadProfile, UploaderConfig};
pub use magic::{MagicKind, sniff};
pub use uploader::{ArchivoMetadata, FileCandidate, FileUploader, UPLOAD_TICK_MS};
