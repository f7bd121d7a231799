//! Indirect configuration values and the secrets they resolve to.

use crate::error::{ConfigError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{env, fmt};
use zeroize::Zeroizing;

/// A regex that matches a braced environment reference like `${SEPOLIA_RPC_URL}`
/// with the named group "var".
pub static RE_ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{(?P<var>[A-Za-z_][A-Za-z0-9_]*)\}$").unwrap());

/// A regex that matches a bare environment reference like `$PRIVATE_KEY`
/// with the named group "var".
pub static RE_ENV_REF_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$(?P<var>[A-Za-z_][A-Za-z0-9_]*)$").unwrap());

/// A configuration value that is either written out in the file or looked up
/// in the process environment when the tool starts.
///
/// The string forms `${VAR}` and `$VAR` parse as [`ConfigValue::Env`]; any
/// other string is taken verbatim as [`ConfigValue::Literal`]. References
/// always serialize in the braced form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigValue {
    /// Reference to an environment variable, stored by name.
    Env(String),
    /// Value written out in the configuration file.
    Literal(String),
}

impl ConfigValue {
    /// Creates a reference to the given environment variable.
    pub fn env(var: impl Into<String>) -> Self {
        ConfigValue::Env(var.into())
    }

    /// Creates a literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        ConfigValue::Literal(value.into())
    }

    /// Returns the referenced variable name, if this is a reference.
    pub fn var_name(&self) -> Option<&str> {
        match self {
            ConfigValue::Env(var) => Some(var),
            ConfigValue::Literal(_) => None,
        }
    }

    /// Resolves the value against the process environment.
    ///
    /// A reference fails with an error naming the variable if it is unset,
    /// empty or not valid unicode. A literal is returned as is.
    pub fn resolve(&self) -> Result<Secret> {
        match self {
            ConfigValue::Env(var) => match env::var(var) {
                Ok(value) if value.is_empty() => Err(ConfigError::EmptyEnvVar(var.clone())),
                Ok(value) => Ok(Secret::new(value)),
                Err(env::VarError::NotPresent) => Err(ConfigError::MissingEnvVar(var.clone())),
                Err(env::VarError::NotUnicode(_)) => {
                    Err(ConfigError::NonUnicodeEnvVar(var.clone()))
                }
            },
            ConfigValue::Literal(value) => Ok(Secret::new(value.clone())),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        if let Some(caps) = RE_ENV_REF.captures(s).or_else(|| RE_ENV_REF_BARE.captures(s)) {
            ConfigValue::Env(caps["var"].to_string())
        } else {
            ConfigValue::Literal(s.to_string())
        }
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Env(var) => write!(f, "${{{var}}}"),
            ConfigValue::Literal(value) => f.write_str(value),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(String::deserialize(deserializer)?.into())
    }
}

/// A resolved configuration value, usually credential material.
///
/// The inner string is zeroized on drop and never printed by `Debug`. There
/// is no `Serialize` impl; resolved values never go back into a written
/// configuration.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(Zeroizing::new(value.into()))
    }

    /// Read access to the raw value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(REDACTED)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn parses_braced_reference() {
        let value = ConfigValue::from("${SEPOLIA_RPC_URL}");
        assert_eq!(value, ConfigValue::env("SEPOLIA_RPC_URL"));
        assert_eq!(value.var_name(), Some("SEPOLIA_RPC_URL"));
    }

    #[test]
    fn parses_bare_reference() {
        let value = ConfigValue::from("$PRIVATE_KEY");
        assert_eq!(value, ConfigValue::env("PRIVATE_KEY"));
    }

    #[test]
    fn anything_else_is_literal() {
        for s in ["https://example.org", "", "$", "${}", "${not-a-var}", "$ leading space"] {
            assert_eq!(ConfigValue::from(s), ConfigValue::literal(s), "{s:?}");
        }
    }

    #[test]
    fn references_serialize_in_braced_form() {
        let value = ConfigValue::env("RPC_URL_FUJI");
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"${RPC_URL_FUJI}\"");

        let back: ConfigValue = serde_json::from_str("\"${RPC_URL_FUJI}\"").unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn literal_round_trips() {
        let value = ConfigValue::literal("0x1234");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"0x1234\"");
        assert_eq!(serde_json::from_str::<ConfigValue>(&json).unwrap(), value);
    }

    #[test]
    fn resolves_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        env::set_var("MASON_TEST_VALUE", "resolved");
        let secret = ConfigValue::env("MASON_TEST_VALUE").resolve().unwrap();
        assert_eq!(secret.expose(), "resolved");
        env::remove_var("MASON_TEST_VALUE");
    }

    #[test]
    fn missing_variable_fails_with_its_name() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        env::remove_var("MASON_TEST_UNSET");
        let err = ConfigValue::env("MASON_TEST_UNSET").resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref var) if var == "MASON_TEST_UNSET"));
        assert!(err.to_string().contains("MASON_TEST_UNSET"));
    }

    #[test]
    fn empty_variable_fails_with_its_name() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        env::set_var("MASON_TEST_EMPTY", "");
        let err = ConfigValue::env("MASON_TEST_EMPTY").resolve().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyEnvVar(ref var) if var == "MASON_TEST_EMPTY"));
        env::remove_var("MASON_TEST_EMPTY");
    }

    #[test]
    #[cfg(unix)]
    fn non_unicode_variable_fails_with_its_name() {
        use std::os::unix::ffi::OsStringExt;

        let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        env::set_var("MASON_TEST_NOT_UTF8", std::ffi::OsString::from_vec(vec![0x66, 0xff, 0x6f]));
        let err = ConfigValue::env("MASON_TEST_NOT_UTF8").resolve().unwrap_err();
        env::remove_var("MASON_TEST_NOT_UTF8");

        assert!(
            matches!(err, ConfigError::NonUnicodeEnvVar(ref var) if var == "MASON_TEST_NOT_UTF8"),
            "got: {err}"
        );
        assert_eq!(
            err.to_string(),
            "environment variable MASON_TEST_NOT_UTF8 is not valid unicode"
        );
    }

    #[test]
    fn literals_resolve_without_environment() {
        let secret = ConfigValue::literal("plain").resolve().unwrap();
        assert_eq!(secret.expose(), "plain");
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("0xdeadbeef");
        assert_eq!(format!("{secret:?}"), "Secret(REDACTED)");
    }

    #[test]
    fn secret_reports_emptiness() {
        assert!(Secret::new("").is_empty());
        assert!(!Secret::new("0x1234").is_empty());
    }
}
