//! The `solidity` section: named compiler profiles and build settings.

use crate::error::{ConfigError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the profile used when the caller selects none.
pub const PROFILE_DEFAULT: &str = "default";

/// Name of the profile intended for release builds.
pub const PROFILE_PRODUCTION: &str = "production";

/// Earliest solc release the toolchain can install.
/// <https://github.com/ethereum/solidity/releases/tag/v0.4.10>
pub const EARLIEST_SOLC: Version = Version::new(0, 4, 10);

/// Latest solc release the toolchain can install.
/// <https://github.com/ethereum/solidity/releases/tag/v0.8.30>
pub const LATEST_SOLC: Version = Version::new(0, 8, 30);

/// Release pinned by the stock profiles.
pub const STOCK_SOLC: Version = Version::new(0, 8, 28);

/// The `solidity` section of the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityConfig {
    /// Named profiles selectable per build invocation.
    pub profiles: BTreeMap<String, Profile>,
}

impl SolidityConfig {
    /// Returns the profile registered under `name`.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles.get(name).ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    /// Returns the `default` profile.
    pub fn default_profile(&self) -> Result<&Profile> {
        self.profiles.get(PROFILE_DEFAULT).ok_or(ConfigError::MissingDefaultProfile)
    }

    /// Checks that a `default` profile exists and that every pinned version
    /// is installable.
    pub fn validate(&self) -> Result<()> {
        self.default_profile()?;
        for (name, profile) in &self.profiles {
            if profile.version < EARLIEST_SOLC || profile.version > LATEST_SOLC {
                return Err(ConfigError::UnsupportedVersion(profile.version.clone()));
            }
            trace!("profile {name} pins solc {}", profile.version);
        }
        Ok(())
    }
}

impl Default for SolidityConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(PROFILE_DEFAULT.to_string(), Profile::new(STOCK_SOLC));
        profiles.insert(
            PROFILE_PRODUCTION.to_string(),
            Profile::new(STOCK_SOLC).with_settings(Settings::optimized(200)),
        );
        Self { profiles }
    }
}

/// A named bundle of compiler settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Compiler release this profile pins.
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl Profile {
    pub fn new(version: Version) -> Self {
        Self { version, settings: None }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// Build settings forwarded to the compiler.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub optimizer: Optimizer,
}

impl Settings {
    /// Settings with the optimizer enabled for the given number of runs.
    pub fn optimized(runs: usize) -> Self {
        let mut optimizer = Optimizer::default();
        optimizer.enable();
        optimizer.runs(runs);
        Self { optimizer }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Estimated number of times each opcode executes over the contract's
    /// lifetime, guiding the size versus gas trade-off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<usize>,
}

impl Optimizer {
    pub fn runs(&mut self, runs: usize) {
        self.runs = Some(runs);
    }

    pub fn disable(&mut self) {
        self.enabled.take();
    }

    pub fn enable(&mut self) {
        self.enabled = Some(true)
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self { enabled: Some(false), runs: Some(200) }
    }
}
