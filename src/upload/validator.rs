//! Upload admission rules
//!
//! Two deployment policies exist: a single-document policy with a per-file
//! ceiling, and a multi-document policy with an aggregate ceiling. Which one
//! is active is chosen through configuration.

use super::UploadCandidate;
use tracing::debug;

const MIB: u64 = 1024 * 1024;

pub const PDF: AllowedType = AllowedType {
    media_type: "application/pdf",
    extension: ".pdf",
};
pub const TXT: AllowedType = AllowedType {
    media_type: "text/plain",
    extension: ".txt",
};
pub const DOC: AllowedType = AllowedType {
    media_type: "application/msword",
    extension: ".doc",
};
pub const DOCX: AllowedType = AllowedType {
    media_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    extension: ".docx",
};
pub const PPTX: AllowedType = AllowedType {
    media_type: "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    extension: ".pptx",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedType {
    pub media_type: &'static str,
    pub extension: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLimit {
    /// Each file must fit under the ceiling on its own
    PerFile(u64),
    /// All accepted files together must fit under the ceiling
    Aggregate(u64),
}

impl SizeLimit {
    pub fn bytes(&self) -> u64 {
        match self {
            SizeLimit::PerFile(n) | SizeLimit::Aggregate(n) => *n,
        }
    }

    fn megabytes(&self) -> u64 {
        self.bytes() / MIB
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub name: &'static str,
    pub allowed: Vec<AllowedType>,
    pub limit: SizeLimit,
    pub max_files: Option<usize>,
}

impl UploadPolicy {
    /// PDF, TXT, DOC, DOCX or PPTX; one file of at most 10 MB
    pub fn single_document() -> Self {
        Self {
            name: "single",
            allowed: vec![PDF, TXT, DOCX, DOC, PPTX],
            limit: SizeLimit::PerFile(10 * MIB),
            max_files: Some(1),
        }
    }

    /// PDF or DOCX; any number of files up to 20 MB in total
    pub fn multi_document() -> Self {
        Self {
            name: "multi",
            allowed: vec![PDF, DOCX],
            limit: SizeLimit::Aggregate(20 * MIB),
            max_files: None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "single" | "a" => Some(Self::single_document()),
            "multi" | "b" => Some(Self::multi_document()),
            _ => None,
        }
    }

    /// Comma-separated list such as ".pdf,.docx"
    pub fn allowed_extensions(&self) -> String {
        self.allowed
            .iter()
            .map(|t| t.extension)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn allows(&self, media_type: &str) -> bool {
        self.allowed.iter().any(|t| t.media_type == media_type)
    }
}

/// Result of admitting a batch: the accepted set and the first rejection reason
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<UploadCandidate>,
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn total_size(&self) -> u64 {
        self.accepted.iter().map(|c| c.size).sum()
    }
}

pub struct FileValidator {
    policy: UploadPolicy,
}

impl FileValidator {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Check one candidate against the files already accepted
    pub fn check(&self, candidate: &UploadCandidate, accepted: &[UploadCandidate]) -> Result<(), String> {
        if accepted
            .iter()
            .any(|c| c.name == candidate.name && c.size == candidate.size)
        {
            return Err(format!("File '{}' has already been added.", candidate.name));
        }

        if !self.policy.allows(&candidate.media_type) {
            return Err(format!(
                "Invalid file type for '{}'. Please upload one of: {}.",
                candidate.name,
                self.policy.allowed_extensions()
            ));
        }

        if let Some(max) = self.policy.max_files {
            if accepted.len() >= max {
                return Err(if max == 1 {
                    format!(
                        "Only one document can be attached. Remove '{}' before adding '{}'.",
                        accepted[0].name, candidate.name
                    )
                } else {
                    format!(
                        "At most {} documents can be attached; '{}' was not added.",
                        max, candidate.name
                    )
                });
            }
        }

        match self.policy.limit {
            SizeLimit::PerFile(max) if candidate.size > max => Err(format!(
                "File '{}' is too large. Max size is {}MB.",
                candidate.name,
                self.policy.limit.megabytes()
            )),
            SizeLimit::Aggregate(max) => {
                let current: u64 = accepted.iter().map(|c| c.size).sum();
                if current.saturating_add(candidate.size) > max {
                    Err(format!(
                        "Adding '{}' would exceed the {}MB total upload limit.",
                        candidate.name,
                        self.policy.limit.megabytes()
                    ))
                } else {
                    Ok(())
                }
            }
            SizeLimit::PerFile(_) => Ok(()),
        }
    }

    /// Admit a batch on top of an already accepted set.
    ///
    /// Scanning stops at the first rejected file; files accepted before it
    /// stay accepted and the rest of the batch is dropped.
    pub fn admit(&self, already_accepted: Vec<UploadCandidate>, batch: Vec<UploadCandidate>) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            accepted: already_accepted,
            error: None,
        };

        for candidate in batch {
            match self.check(&candidate, &outcome.accepted) {
                Ok(()) => {
                    debug!(file = %candidate.name, size = candidate.size, "Upload accepted");
                    outcome.accepted.push(candidate);
                }
                Err(reason) => {
                    debug!(file = %candidate.name, %reason, "Upload rejected");
                    outcome.error = Some(reason);
                    break;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, media_type: &str, size: u64) -> UploadCandidate {
        UploadCandidate {
            name: name.to_string(),
            size,
            media_type: media_type.to_string(),
            bytes: bytes::Bytes::new(),
        }
    }

    #[test]
    fn test_aggregate_ceiling_rejects_overflowing_file() {
        let validator = FileValidator::new(UploadPolicy::multi_document());
        let outcome = validator.admit(
            vec![],
            vec![
                file("a.pdf", PDF.media_type, 12 * MIB),
                file("b.pdf", PDF.media_type, 13 * MIB),
                file("c.pdf", PDF.media_type, MIB),
            ],
        );

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].name, "a.pdf");
        assert!(outcome.total_size() <= 20 * MIB);
        let error = outcome.error.unwrap();
        assert!(error.contains("b.pdf"));
        assert!(error.contains("20MB"));
    }

    #[test]
    fn test_aggregate_ceiling_is_inclusive() {
        let validator = FileValidator::new(UploadPolicy::multi_document());
        let outcome = validator.admit(
            vec![],
            vec![
                file("a.pdf", PDF.media_type, 10 * MIB),
                file("b.docx", DOCX.media_type, 10 * MIB),
            ],
        );
        assert_eq!(outcome.accepted.len(), 2);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.total_size(), 20 * MIB);
    }

    #[test]
    fn test_rejected_type_names_file_and_extensions() {
        let validator = FileValidator::new(UploadPolicy::multi_document());
        let outcome = validator.admit(
            vec![file("deck.pdf", PDF.media_type, 100)],
            vec![file("notes.txt", TXT.media_type, 10), file("x.pdf", PDF.media_type, 10)],
        );

        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.accepted.iter().all(|c| c.name != "notes.txt"));
        assert_eq!(
            outcome.error.as_deref(),
            Some("Invalid file type for 'notes.txt'. Please upload one of: .pdf,.docx.")
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let validator = FileValidator::new(UploadPolicy::multi_document());
        let existing = vec![file("deck.pdf", PDF.media_type, 100)];

        let err = validator
            .check(&file("deck.pdf", PDF.media_type, 100), &existing)
            .unwrap_err();
        assert!(err.contains("already been added"));

        // Same name, different size is a different file
        assert!(validator
            .check(&file("deck.pdf", PDF.media_type, 101), &existing)
            .is_ok());
    }

    #[test]
    fn test_single_document_policy() {
        let validator = FileValidator::new(UploadPolicy::single_document());

        let err = validator
            .check(&file("big.pdf", PDF.media_type, 10 * MIB + 1), &[])
            .unwrap_err();
        assert_eq!(err, "File 'big.pdf' is too large. Max size is 10MB.");

        assert!(validator.check(&file("notes.txt", TXT.media_type, 10), &[]).is_ok());
        assert!(validator.check(&file("slides.pptx", PPTX.media_type, 10), &[]).is_ok());

        let outcome = validator.admit(
            vec![],
            vec![file("a.doc", DOC.media_type, 10), file("b.pdf", PDF.media_type, 10)],
        );
        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.error.unwrap().contains("Only one document"));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(UploadPolicy::from_name("single"), Some(UploadPolicy::single_document()));
        assert_eq!(UploadPolicy::from_name(" MULTI "), Some(UploadPolicy::multi_document()));
        assert_eq!(UploadPolicy::from_name("other"), None);
        assert_eq!(
            UploadPolicy::single_document().allowed_extensions(),
            ".pdf,.txt,.docx,.doc,.pptx"
        );
    }
}
