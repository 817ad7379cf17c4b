use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
    time::Duration,
};

#[derive(Debug)]
pub enum Error {
    ConnectionClosed { received: usize },
    Timeout(Duration),
    UnknownFrameRule(String),
    EmptyCommand,
    ParseError,
    CommandNotFound,
    InvalidTarget(String),
    InvalidValue(String),
    TooLong(usize),
    OtherError(Box<dyn StdError + Send + Sync>),
}

impl Error {
    /// Whether the connection this error came from can no longer be used.
    pub fn unrecoverable_error(&self) -> bool {
        match self {
            Error::ConnectionClosed { .. } => true,
            Error::Timeout(_) => true,
            Error::UnknownFrameRule(_) => false,
            Error::EmptyCommand => false,
            Error::ParseError => false,
            Error::CommandNotFound => false,
            Error::InvalidTarget(_) => false,
            Error::InvalidValue(_) => false,
            Error::TooLong(_) => false,
            Error::OtherError(_) => true,
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::OtherError(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionClosed { received } => {
                write!(f, "connection closed by peer ({} bytes of an unfinished message)", received)
            }
            Self::Timeout(limit) => write!(f, "no data received within {} ms", limit.as_millis()),
            Self::UnknownFrameRule(name) => {
                write!(f, "unknown frame rule '{}' (expected line, rolloffino or raw)", name)
            }
            Self::EmptyCommand => write!(f, "empty command"),
            Self::ParseError => write!(f, "malformed command"),
            Self::CommandNotFound => write!(f, "command not found"),
            Self::InvalidTarget(target) => write!(f, "invalid target: {}", target),
            Self::InvalidValue(value) => write!(f, "invalid value: {}", value),
            Self::TooLong(size) => write!(f, "command too long: {} bytes", size),
            Self::OtherError(err) => write!(f, "{}", err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::OtherError(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_end_the_connection() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(err.unrecoverable_error());
        assert!(err.source().is_some());
        assert!(Error::ConnectionClosed { received: 3 }.unrecoverable_error());
    }

    #[test]
    fn protocol_errors_keep_the_connection() {
        assert!(!Error::ParseError.unrecoverable_error());
        assert!(!Error::TooLong(64).unrecoverable_error());
        assert_eq!(Error::InvalidTarget("DOOR".into()).to_string(), "invalid target: DOOR");
    }
}
