//! Server version token.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a server version string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid server version {0:?}")]
pub struct VersionParseError(pub String);

/// `major.minor.patch` version of a database server.
///
/// Ordering is numeric, so `5.7` < `5.7.30` < `8.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// Parses `VERSION()` output such as `8.0.36`, `5.7.44-log` or
/// `10.11.6-MariaDB-0+deb12u1`; anything after the numeric prefix is ignored.
impl FromStr for ServerVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numeric = s
            .trim()
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or_default();

        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let mut next = || -> Result<Option<u32>, VersionParseError> {
            parts
                .next()
                .map(|p| p.parse::<u32>().map_err(|_| VersionParseError(s.to_string())))
                .transpose()
        };

        let major = next()?.ok_or_else(|| VersionParseError(s.to_string()))?;
        let minor = next()?.ok_or_else(|| VersionParseError(s.to_string()))?;
        let patch = next()?.unwrap_or(0);
        Ok(Self::new(major, minor, patch))
    }
}
