use semver::Version;
use std::{io, path::PathBuf};

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Various error types for loading, validating and resolving the toolchain
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A referenced environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),
    /// A referenced environment variable is set to the empty string.
    #[error("environment variable {0} is set but empty")]
    EmptyEnvVar(String),
    /// A referenced environment variable holds non-unicode data.
    #[error("environment variable {0} is not valid unicode")]
    NonUnicodeEnvVar(String),
    /// A value written out in the file is empty.
    #[error("network {network}: {field} must not be empty")]
    EmptyValue { network: String, field: &'static str },
    /// Two networks are declared under the same name.
    #[error("duplicate network {0}")]
    DuplicateNetwork(String),
    /// The `solidity` section declares no `default` profile.
    #[error("no default solidity profile declared")]
    MissingDefaultProfile,
    /// Lookup of a profile name that is not declared.
    #[error("unknown solidity profile {0}")]
    UnknownProfile(String),
    /// A profile pins a compiler version the toolchain cannot install.
    #[error("unsupported solc version {0}")]
    UnsupportedVersion(Version),
    /// A resolved RPC url does not parse.
    #[error("network {network}: invalid url: {source}")]
    InvalidUrl {
        network: String,
        #[source]
        source: url::ParseError,
    },
    /// Failed to read the configuration file.
    #[error("error while reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
}

impl ConfigError {
    pub fn msg(msg: impl std::fmt::Display) -> Self {
        ConfigError::Message(msg.to_string())
    }

    pub(crate) fn read(err: io::Error, path: impl Into<PathBuf>) -> Self {
        ConfigError::Read { path: path.into(), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_variable() {
        let err = ConfigError::MissingEnvVar("SEPOLIA_RPC_URL".to_string());
        assert_eq!(err.to_string(), "environment variable SEPOLIA_RPC_URL is not set");

        let err = ConfigError::EmptyEnvVar("PRIVATE_KEY".to_string());
        assert_eq!(err.to_string(), "environment variable PRIVATE_KEY is set but empty");
    }

    #[test]
    fn msg_wraps_any_display() {
        assert_eq!(ConfigError::msg("custom failure").to_string(), "custom failure");
    }

    #[test]
    fn read_error_names_the_path() {
        let err = ConfigError::read(
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
            "mason.config.json",
        );
        assert!(err.to_string().contains("mason.config.json"));
    }
}
