use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::consts::MAX_DIGEST_LENGTH;

/// Coarse classification of a [`VmcError`].
///
/// Everything except `MissingReference` aborts the operation that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad settings, detected before any I/O happens.
    Configuration,
    /// Malformed registry line, expression, FASTA or VCF content.
    Parse,
    /// Well-formed input this system refuses to process (multi-allelic records).
    UnsupportedInput,
    /// A sequence name with no registry entry.
    MissingReference,
    /// Failure to open, read or write a stream.
    Io,
}

#[derive(Error, Debug)]
pub enum VmcError {
    #[error("Invalid digest length {0}: must be between 1 and {max}", max = MAX_DIGEST_LENGTH)]
    InvalidDigestLength(usize),

    #[error("Invalid thread count {0}: must be at least 1")]
    InvalidThreadCount(usize),

    #[error("Annotation pipeline cannot start from the {0} state")]
    PipelineState(String),

    #[error("Invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("Malformed registry line {line} in {path:?}: {reason}")]
    RegistryParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Malformed FASTA input: {0}")]
    FastaParse(String),

    #[error("Malformed VCF input at line {line}: {reason}")]
    VcfParse { line: usize, reason: String },

    #[error("Malformed expression '{expression}': {reason}")]
    ExpressionParse { expression: String, reason: String },

    #[error("Character '{character}' is not an allowed state in expression '{expression}'")]
    InvalidStateCharacter { expression: String, character: char },

    #[error("Unsupported expression '{0}': only genomic (g.) expressions are digested")]
    UnsupportedExpression(String),

    #[error(
        "Multi-allelic variant at {chrom}:{pos} (ALT={alts}); decompose the VCF before annotating"
    )]
    MultiAllelic {
        chrom: String,
        pos: u64,
        alts: String,
    },

    #[error("Sequence '{0}' not found in registry")]
    UnknownSequence(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl VmcError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VmcError::InvalidDigestLength(_)
            | VmcError::InvalidThreadCount(_)
            | VmcError::PipelineState(_) => ErrorCategory::Configuration,
            VmcError::InvalidIdentifier { .. }
            | VmcError::RegistryParse { .. }
            | VmcError::FastaParse(_)
            | VmcError::VcfParse { .. }
            | VmcError::ExpressionParse { .. }
            | VmcError::InvalidStateCharacter { .. } => ErrorCategory::Parse,
            VmcError::UnsupportedExpression(_) | VmcError::MultiAllelic { .. } => {
                ErrorCategory::UnsupportedInput
            }
            VmcError::UnknownSequence(_) => ErrorCategory::MissingReference,
            VmcError::Io(_) => ErrorCategory::Io,
        }
    }

    /// True for conditions that abort the current top-level operation.
    pub fn is_fatal(&self) -> bool {
        self.category() != ErrorCategory::MissingReference
    }
}

/// Result type alias for vmc operations.
pub type Result<T> = std::result::Result<T, VmcError>;

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(VmcError::InvalidDigestLength(65), ErrorCategory::Configuration)]
    #[case(VmcError::FastaParse("no header".to_string()), ErrorCategory::Parse)]
    #[case(
        VmcError::MultiAllelic { chrom: "chr1".to_string(), pos: 5, alts: "A,T".to_string() },
        ErrorCategory::UnsupportedInput
    )]
    #[case(VmcError::UnknownSequence("chrUn".to_string()), ErrorCategory::MissingReference)]
    #[case(VmcError::Io(io::Error::other("disk full")), ErrorCategory::Io)]
    fn test_error_category(#[case] error: VmcError, #[case] expected: ErrorCategory) {
        assert_eq!(error.category(), expected);
    }

    #[rstest]
    fn test_missing_reference_is_not_fatal() {
        assert!(!VmcError::UnknownSequence("chrM".to_string()).is_fatal());
        assert!(VmcError::InvalidDigestLength(0).is_fatal());
    }

    #[rstest]
    fn test_digest_length_message_names_bound() {
        let msg = VmcError::InvalidDigestLength(100).to_string();
        assert_eq!(msg, "Invalid digest length 100: must be between 1 and 64");
    }
}
