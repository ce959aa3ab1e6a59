/// Errors raised by tree rewrites, type mapping and pruning.
///
/// Predicate-removal paths never return these for shapes they do not
/// understand; they degrade to an always-true predicate instead. Errors are
/// reserved for cases with no safe default.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A node kind, cast target or literal type the operation cannot handle
    UnsupportedShape(String),

    /// A required field is missing or has the wrong JSON type
    MalformedTree(String),

    /// A literal could not be parsed as its declared type
    TypeConversion { value: String, target: String },

    /// The external front end flagged the tree as a failed parse
    Parser(String),

    /// An external file listing or table scan failed
    Listing { path: String, message: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsupportedShape(msg) => write!(f, "Unsupported shape: {}", msg),
            Error::MalformedTree(msg) => write!(f, "Malformed tree: {}", msg),
            Error::TypeConversion { value, target } => {
                write!(f, "Type conversion error: cannot convert '{}' to {}", value, target)
            }
            Error::Parser(msg) => write!(f, "Parser error: {}", msg),
            Error::Listing { path, message } => {
                write!(f, "Listing error for '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
