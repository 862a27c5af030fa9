use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;
use std::path::PathBuf;

/// Simulator errors.
///
/// Both are fatal and can only happen before the first trace record is
/// replayed; once a run has started nothing fails.
#[derive(Debug)]
pub enum Error {
    /// `s`, `E` and `b` do not describe a cache we can build.
    InvalidGeometry(String),
    /// the trace file could not be opened for reading
    OpenTrace(PathBuf, IoError),
}

impl Error {
    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidGeometry(msg) => write!(f, "invalid cache geometry: {msg}"),
            Self::OpenTrace(path, error) => {
                write!(f, "cannot open trace file: {}: {error}", path.display())
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidGeometry(_) => None,
            Self::OpenTrace(_, error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn geometry_message_is_shown() {
        let err = Error::geometry("E must be positive, got 0");
        assert_eq!(
            err.to_string(),
            "invalid cache geometry: E must be positive, got 0"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn open_trace_names_the_file_and_keeps_the_cause() {
        let err = Error::OpenTrace(
            PathBuf::from("traces/missing.trace"),
            IoError::new(ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("traces/missing.trace"));
        assert!(msg.contains("no such file"));
        assert!(err.source().is_some());
    }
}
