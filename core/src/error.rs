//! Errors.

use std::{fmt, io, path::PathBuf};

/// An error arising while loading, filtering or summarising genotypes.
#[derive(Debug)]
pub enum Error {
    /// The input path does not exist.
    MissingFile {
        /// Offending path.
        path: PathBuf,
    },
    /// The input does not follow the expected layout.
    MalformedInput {
        /// Description of the problem.
        reason: String,
    },
    /// A statistic needs data that the filtered matrix cannot supply.
    InsufficientData {
        /// Description of the problem.
        reason: String,
    },
    /// Filtering removed every locus or individual.
    EmptyInput {
        /// What was being computed.
        context: &'static str,
    },
    /// An underlying I/O error.
    Io(io::Error),
}

impl Error {
    pub(crate) fn malformed<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient<S>(reason: S) -> Self
    where
        S: Into<String>,
    {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }

    pub(crate) fn empty(context: &'static str) -> Self {
        Self::EmptyInput { context }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingFile { path } => {
                write!(f, "input file '{}' does not exist", path.display())
            }
            Error::MalformedInput { reason } => write!(f, "malformed input: {reason}"),
            Error::InsufficientData { reason } => write!(f, "insufficient data: {reason}"),
            Error::EmptyInput { context } => {
                write!(f, "cannot compute {context}: no loci or individuals remain")
            }
            Error::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|position| position.line());

        match e.into_kind() {
            csv::ErrorKind::Io(e) => Self::Io(e),
            kind => {
                let reason = match kind {
                    csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {err}"),
                    csv::ErrorKind::UnequalLengths {
                        expected_len, len, ..
                    } => format!("expected {expected_len} fields, found {len}"),
                    _ => String::from("unreadable CSV record"),
                };

                match line {
                    Some(line) => Self::malformed(format!("line {line}: {reason}")),
                    None => Self::malformed(reason),
                }
            }
        }
    }
}
