use serde::{Deserialize, Serialize};

use super::KycError;

pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
];

/// Which proof a document backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Pan,
    Emd,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pan => "PAN",
            Self::Emd => "EMD",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A file selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl DocumentFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Size is checked before type, matching the order users see messages in.
    pub fn validate(&self, kind: DocumentKind) -> Result<(), KycError> {
        if self.file_name.trim().is_empty() && self.is_empty() {
            return Err(KycError::DocumentMissing(kind));
        }
        if self.len() > MAX_DOCUMENT_BYTES {
            return Err(KycError::DocumentTooLarge(kind));
        }
        let mime = self.mime_type.trim().to_ascii_lowercase();
        if !ALLOWED_DOCUMENT_TYPES.contains(&mime.as_str()) {
            return Err(KycError::UnsupportedDocumentType(kind));
        }
        Ok(())
    }
}
