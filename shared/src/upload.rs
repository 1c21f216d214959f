use serde::{Deserialize, Serialize};

use crate::format::format_file_size;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UploadError {
    #[error("{name}: unsupported file type {mime}")]
    UnsupportedType { name: String, mime: String },
    #[error("{name}: file too large ({size} exceeds {limit})")]
    FileTooLarge {
        name: String,
        size: String,
        limit: String,
    },
    #[error("{name}: file is empty")]
    Empty { name: String },
    #[error("too many files: {count} (max {max})")]
    TooManyFiles { count: usize, max: usize },
}

/// Client-side limits applied before images are sent for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_file_size: u64,
    pub max_files: usize,
    pub accepted_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_files: 10,
            accepted_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

/// Metadata of a file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl UploadCandidate {
    /// Derives the MIME type from the file extension; unknown extensions map
    /// to `application/octet-stream`.
    pub fn from_name(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let mime = mime_for_extension(&name)
            .unwrap_or("application/octet-stream")
            .to_string();
        Self { name, mime, size }
    }
}

pub fn mime_for_extension(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

impl UploadLimits {
    pub fn validate_file(&self, file: &UploadCandidate) -> Result<(), UploadError> {
        if !self.accepted_types.iter().any(|t| t == &file.mime) {
            return Err(UploadError::UnsupportedType {
                name: file.name.clone(),
                mime: file.mime.clone(),
            });
        }
        if file.size == 0 {
            return Err(UploadError::Empty {
                name: file.name.clone(),
            });
        }
        if file.size > self.max_file_size {
            return Err(UploadError::FileTooLarge {
                name: file.name.clone(),
                size: format_file_size(file.size),
                limit: format_file_size(self.max_file_size),
            });
        }
        Ok(())
    }

    /// Checks the batch size, then each file. Per-file failures are returned
    /// alongside their index so callers can drop only the offending files.
    pub fn validate_batch(
        &self,
        files: &[UploadCandidate],
    ) -> Result<Vec<(usize, UploadError)>, UploadError> {
        if files.len() > self.max_files {
            return Err(UploadError::TooManyFiles {
                count: files.len(),
                max: self.max_files,
            });
        }

        Ok(files
            .iter()
            .enumerate()
            .filter_map(|(i, file)| self.validate_file(file).err().map(|e| (i, e)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_extensions() {
        assert_eq!(mime_for_extension("lesion.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("lesion.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("a.b.webp"), Some("image/webp"));
        assert_eq!(mime_for_extension("scan.tiff"), None);
        assert_eq!(mime_for_extension("noextension"), None);
    }

    #[test]
    fn accepts_supported_file_within_limit() {
        let limits = UploadLimits::default();
        let file = UploadCandidate::from_name("arm.png", 2 * 1024 * 1024);
        assert_eq!(limits.validate_file(&file), Ok(()));
    }

    #[test]
    fn rejects_unsupported_empty_and_oversized_files() {
        let limits = UploadLimits::default();

        let tiff = UploadCandidate::from_name("scan.tiff", 100);
        assert!(matches!(
            limits.validate_file(&tiff),
            Err(UploadError::UnsupportedType { .. })
        ));

        let empty = UploadCandidate::from_name("empty.jpg", 0);
        assert!(matches!(limits.validate_file(&empty), Err(UploadError::Empty { .. })));

        let big = UploadCandidate::from_name("big.jpg", 10 * 1024 * 1024 + 1);
        let err = limits.validate_file(&big).unwrap_err();
        assert_eq!(err.to_string(), "big.jpg: file too large (10 MB exceeds 10 MB)");
    }

    #[test]
    fn batch_reports_offending_indices() {
        let limits = UploadLimits::default();
        let files = vec![
            UploadCandidate::from_name("a.jpg", 10),
            UploadCandidate::from_name("b.gif", 10),
            UploadCandidate::from_name("c.webp", 10),
        ];
        let failures = limits.validate_batch(&files).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 1);
    }

    #[test]
    fn batch_over_file_limit_is_rejected() {
        let limits = UploadLimits {
            max_files: 2,
            ..UploadLimits::default()
        };
        let files: Vec<UploadCandidate> = (0..3)
            .map(|i| UploadCandidate::from_name(format!("{i}.jpg"), 10))
            .collect();
        assert_eq!(
            limits.validate_batch(&files),
            Err(UploadError::TooManyFiles { count: 3, max: 2 })
        );
    }
}
