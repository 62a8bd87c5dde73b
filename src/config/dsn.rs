//! Database DSN handling.
//!
//! DSNs are written with `${VAR}` placeholders so credentials stay out of the
//! config file, then parsed into a [`Dsn`] whose `Display` never shows the
//! password.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use super::ConfigError;

static ENV_VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("env var pattern is valid")
});

/// Expand `${VAR}` and `${VAR:-default}` placeholders.
///
/// Values are inserted verbatim; credentials containing URL delimiters must
/// already be percent-encoded in the environment.
///
/// # Errors
/// Returns `ConfigError::MissingEnvVar` for the first placeholder whose
/// variable is unset and has no default.
pub fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut missing: Option<String> = None;
    let expanded = ENV_VAR_REGEX.replace_all(input, |caps: &Captures| {
        match (std::env::var(&caps[1]), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_string(),
            (Err(_), None) => {
                missing.get_or_insert_with(|| caps[1].to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(ConfigError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}

/// Expanded, validated `mysql://` connection URL.
#[derive(Clone, PartialEq, Eq)]
pub struct Dsn(Url);

impl Dsn {
    /// Expand placeholders in `raw` and validate the result.
    ///
    /// # Errors
    /// - `ConfigError::MissingEnvVar` if a placeholder cannot be expanded
    /// - `ConfigError::InvalidDsn` if the expanded text is not a URL
    /// - `ConfigError::ValidationError` if the scheme is not `mysql` or the host is missing
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(raw)?;
        let url = Url::parse(expanded.trim())?;

        if url.scheme() != "mysql" {
            return Err(ConfigError::ValidationError(format!(
                "database dsn must use the mysql:// scheme, got {}://",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::ValidationError(
                "database dsn has no host".to_string(),
            ));
        }
        Ok(Self(url))
    }

    /// Full URL including the password, for handing to the driver.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// URL with the password replaced by `***`, safe to log.
    pub fn redacted(&self) -> String {
        let mut url = self.0.clone();
        if url.password().is_some() {
            // Cannot fail: the host was checked in `parse`.
            let _ = url.set_password(Some("***"));
        }
        url.into()
    }
}

impl FromStr for Dsn {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dsn").field(&self.redacted()).finish()
    }
}
