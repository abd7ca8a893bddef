use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How a file pair is opened.
///
/// Parsing accepts the classic fopen access strings. Only `"rb+"`, `"r+b"`
/// and `"r+"` request write access; every other string, including unknown
/// ones, opens read-only.
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape::AccessMode;
///
/// let mode: AccessMode = "rb+".parse().unwrap();
/// assert_eq!(mode, AccessMode::ReadWrite);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessMode {
    #[default]
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn is_writable(self) -> bool {
        self == AccessMode::ReadWrite
    }

    /// The canonical fopen string for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "rb",
            AccessMode::ReadWrite => "rb+",
        }
    }
}

impl FromStr for AccessMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rb+" | "r+b" | "r+" => Ok(AccessMode::ReadWrite),
            _ => Ok(AccessMode::ReadOnly),
        }
    }
}

impl Display for AccessMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
