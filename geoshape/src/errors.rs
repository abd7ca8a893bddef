use backtrace::Backtrace;
use parking_lot::RwLock;
use std::collections::TryReserveError;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for shapefile operations
///
/// Each kind describes one category of failure so callers can decide whether
/// to retry, report or abort.
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape::errors::{GeoShapeError, ErrorKind, GeoShapeResult};
///
/// fn example() -> GeoShapeResult<()> {
///     Err(GeoShapeError::new("bad magic number", ErrorKind::FormatError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // IO and storage errors
    /// Generic seek/read/write/flush failure
    IOError,
    /// One of the files of the pair does not exist
    FileNotFound,
    /// The file pair cannot be opened with the requested access
    PermissionDenied,

    // Content errors
    /// Header or record bytes do not follow the shapefile layout
    FormatError,
    /// A buffer could not be grown to the size the file asks for
    AllocationError,

    // Programming errors
    /// An internal structural rule was broken (wrong shape type on write,
    /// corrupt tree)
    InvariantViolation,
    /// The caller passed arguments that cannot describe a valid shape
    ValidationError,
    /// The operation is not valid in the current state of the handle
    InvalidOperation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::FormatError => write!(f, "Format error"),
            ErrorKind::AllocationError => write!(f, "Allocation error"),
            ErrorKind::InvariantViolation => write!(f, "Invariant violation"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
        }
    }
}

/// Error type for every fallible operation of the crate.
///
/// `GeoShapeError` carries a message, a kind and an optional cause. The
/// backtrace is captured unresolved and only symbolized when the error is
/// printed with `{:?}`.
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape::errors::{GeoShapeError, ErrorKind};
///
/// let cause = GeoShapeError::new("short read", ErrorKind::IOError);
/// let err = GeoShapeError::new_with_cause("cannot read header", ErrorKind::FormatError, cause);
/// ```
#[derive(Clone)]
pub struct GeoShapeError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<GeoShapeError>>,
    backtrace: Arc<RwLock<Backtrace>>,
}

impl GeoShapeError {
    /// Creates a new `GeoShapeError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        GeoShapeError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(RwLock::new(Backtrace::new_unresolved())),
        }
    }

    /// Creates a new `GeoShapeError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: GeoShapeError) -> Self {
        GeoShapeError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(RwLock::new(Backtrace::new_unresolved())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&GeoShapeError> {
        self.cause.as_deref()
    }
}

impl Display for GeoShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for GeoShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}\nCaused by: {:?}", self.error_kind, self.message, cause),
            None => {
                let mut backtrace = self.backtrace.write();
                backtrace.resolve();
                write!(f, "{}: {}\n{:?}", self.error_kind, self.message, *backtrace)
            }
        }
    }
}

impl Error for GeoShapeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Result alias used by all fallible operations of the crate.
pub type GeoShapeResult<T> = Result<T, GeoShapeError>;

impl From<std::io::Error> for GeoShapeError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            // a short read means the file ends before the layout says it should
            std::io::ErrorKind::UnexpectedEof => ErrorKind::FormatError,
            _ => ErrorKind::IOError,
        };
        GeoShapeError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<TryReserveError> for GeoShapeError {
    fn from(err: TryReserveError) -> Self {
        GeoShapeError::new(
            &format!("Allocation failed: {}", err),
            ErrorKind::AllocationError,
        )
    }
}

impl From<String> for GeoShapeError {
    fn from(msg: String) -> Self {
        GeoShapeError::new(&msg, ErrorKind::InvalidOperation)
    }
}

impl From<&str> for GeoShapeError {
    fn from(msg: &str) -> Self {
        GeoShapeError::new(msg, ErrorKind::InvalidOperation)
    }
}
