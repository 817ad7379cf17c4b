use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::Error;

/// Rule deciding when the bytes received so far hold a whole response.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FrameRule {
    /// Done once a newline arrived.
    Line,
    /// Done once both a newline and a closing parenthesis arrived.
    #[default]
    Rolloffino,
    /// Done with the first chunk, whatever it holds.
    Raw,
}

impl FrameRule {
    pub fn is_complete(&self, buffer: &[u8]) -> bool {
        match self {
            Self::Line => buffer.contains(&b'\n'),
            Self::Rolloffino => buffer.contains(&b'\n') && buffer.contains(&b')'),
            Self::Raw => !buffer.is_empty(),
        }
    }
}

impl FromStr for FrameRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" | "snapcap" => Ok(Self::Line),
            "rolloffino" => Ok(Self::Rolloffino),
            "raw" => Ok(Self::Raw),
            _ => Err(Error::UnknownFrameRule(s.to_string())),
        }
    }
}

impl Display for FrameRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}",
            match self {
                Self::Line => "line",
                Self::Rolloffino => "rolloffino",
                Self::Raw => "raw",
            }
        )
    }
}
