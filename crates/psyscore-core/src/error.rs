//! Parse error types.
//!
//! Every failure aborts the parse and surfaces here as its own variant, so
//! callers can report what went wrong without string matching.

use thiserror::Error;

/// Errors that can occur while turning an export archive into a [`Battery`].
///
/// [`Battery`]: crate::model::Battery
#[derive(Debug, Error)]
pub enum ParseError {
    /// The archive file could not be opened or read.
    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not a readable zip archive.
    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// No member of the archive has a `.csv` name.
    #[error("no .csv data member found in archive")]
    MissingDataMember,

    /// The data member is not valid UTF-16 text.
    #[error("data member `{member}` is not valid UTF-16 text")]
    Decoding { member: String },

    /// A required section marker line is absent.
    #[error("section `{marker}` not found")]
    MissingSection { marker: String },

    /// A section runs to the end of input without a terminating blank line.
    #[error("section `{marker}` is not terminated by a blank line")]
    TruncatedSection { marker: String },

    /// A data row has the wrong field count or a non-integer numeric field.
    #[error("malformed row at line {line}: {reason} (`{row}`)")]
    MalformedRow {
        line: usize,
        row: String,
        reason: String,
    },

    /// A name field has no space separating the code token from the name.
    #[error("malformed label at line {line}: `{label}` has no code prefix")]
    MalformedLabel { line: usize, label: String },
}

/// The failure class of a [`ParseError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Archive,
    MissingDataMember,
    Decoding,
    MissingSection,
    TruncatedSection,
    MalformedRow,
    MalformedLabel,
}

impl ParseError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Io(_) => ErrorKind::Io,
            ParseError::Archive(_) => ErrorKind::Archive,
            ParseError::MissingDataMember => ErrorKind::MissingDataMember,
            ParseError::Decoding { .. } => ErrorKind::Decoding,
            ParseError::MissingSection { .. } => ErrorKind::MissingSection,
            ParseError::TruncatedSection { .. } => ErrorKind::TruncatedSection,
            ParseError::MalformedRow { .. } => ErrorKind::MalformedRow,
            ParseError::MalformedLabel { .. } => ErrorKind::MalformedLabel,
        }
    }

    /// Returns the 1-based line in the decoded text this error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedRow { line, .. } | ParseError::MalformedLabel { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}
