use std::fmt;

#[derive(Debug)]
pub enum Error {
    YamlParsingError(serde_yaml::Error),
    IOError(std::io::Error),
    MissingSchemaKey(&'static str),
    InvalidSchema,
    UnknownPatternOperator(String),
    UndefinedPatternReference(String),
    InvalidPatternNode(String),
    EmptyUnion(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::YamlParsingError(e) => write!(f, "failed to parse yaml: {}", e),
            Error::IOError(e) => write!(f, "i/o error: {}", e),
            Error::MissingSchemaKey(key) => write!(f, "missing schema key `{}`", key),
            Error::InvalidSchema => write!(f, "invalid schema"),
            Error::UnknownPatternOperator(op) => write!(f, "unknown pattern operator `{}`", op),
            Error::UndefinedPatternReference(name) => {
                write!(f, "reference to undefined pattern `{}`", name)
            }
            Error::InvalidPatternNode(pattern) => {
                write!(f, "malformed node in pattern `{}`", pattern)
            }
            Error::EmptyUnion(pattern) => write!(f, "empty `or` in pattern `{}`", pattern),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::YamlParsingError(e) => Some(e),
            Error::IOError(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
