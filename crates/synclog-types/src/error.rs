use std::fmt;

/// Result type for synclog-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A textual value could not be mapped onto one of the known variants
    InvalidValue { kind: &'static str, value: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidValue { kind, value } => {
                write!(f, "Invalid {}: '{}'", kind, value)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) fn invalid(kind: &'static str, value: &str) -> Self {
        Error::InvalidValue {
            kind,
            value: value.to_string(),
        }
    }
}
