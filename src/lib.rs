//! Typed configuration for the Mason solidity toolchain.
//!
//! A project's `mason.config.json` declares the compiler profiles it builds
//! with and the networks it deploys and tests against. Endpoints and account
//! keys are not written out in the file; they appear as `${VAR}` references
//! and are resolved from the process environment when the tool starts. A
//! reference that does not resolve fails the whole invocation with an error
//! naming the variable.
//!
//! # Examples
//!
//! ```no_run
//! use mason_config::Config;
//!
//! # fn main() -> Result<(), mason_config::ConfigError> {
//! mason_config::load_dotenv();
//!
//! let config = Config::load("mason.config.json")?;
//! let resolved = config.resolve()?;
//! for network in &resolved.networks {
//!     println!("{} -> {}", network.name, network.url);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

mod error;
pub use error::{ConfigError, Result};

mod value;
pub use value::{ConfigValue, Secret};

pub mod solidity;
pub use solidity::{Optimizer, Profile, Settings, SolidityConfig};

pub mod network;
pub use network::{ChainKind, NetworkConfig, NetworksConfig, ResolvedNetwork, Transport};

/// Plugin bundle activated in new projects.
pub const STOCK_PLUGINS: &[&str] = &["toolbox"];

/// Root of the toolchain configuration.
///
/// `Default` yields the stock configuration shipped with new projects: the
/// `default` and `production` compiler profiles and the `sepolia` and `fuji`
/// test networks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Plugin identifiers the host tool activates, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
    /// Compiler profiles and build settings.
    pub solidity: SolidityConfig,
    /// Networks to deploy and test against.
    pub networks: NetworksConfig,
}

impl Config {
    /// Reads and validates the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        trace!("loading config at {}", path.display());
        let content = fs::read_to_string(path).map_err(|err| ConfigError::read(err, path))?;
        Self::from_json(&content)
    }

    /// Parses and validates a configuration from its json representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the declared sections without touching the environment.
    pub fn validate(&self) -> Result<()> {
        self.solidity.validate()?;
        for (name, network) in self.networks.iter() {
            network.validate(name)?;
        }
        Ok(())
    }

    /// Resolves every environment reference and returns the connection
    /// values, in declaration order.
    ///
    /// The declared sections are validated first, so the result is usable
    /// whether or not the configuration came through [`Config::load`]. Fails
    /// on the first reference that does not resolve, naming the variable. No
    /// partial result is produced.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.solidity.validate()?;
        let mut networks = Vec::with_capacity(self.networks.len());
        for (name, network) in self.networks.iter() {
            networks.push(network.resolve(name)?);
        }
        debug!("resolved {} networks", networks.len());
        Ok(ResolvedConfig {
            plugins: self.plugins.clone(),
            solidity: self.solidity.clone(),
            networks,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugins: STOCK_PLUGINS.iter().map(|plugin| plugin.to_string()).collect(),
            solidity: SolidityConfig::default(),
            networks: NetworksConfig::stock(),
        }
    }
}

/// Post resolution view of the configuration, ready to hand to RPC clients
/// and the compiler driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Plugin identifiers, unchanged from the declaration.
    pub plugins: Vec<String>,
    /// Compiler profiles, unchanged from the declaration.
    pub solidity: SolidityConfig,
    /// Resolved networks, in declaration order.
    pub networks: Vec<ResolvedNetwork>,
}

impl ResolvedConfig {
    /// Returns the resolved network declared under `name`.
    pub fn network(&self, name: &str) -> Option<&ResolvedNetwork> {
        self.networks.iter().find(|network| network.name == name)
    }
}

/// Loads environment variables from the nearest `.env` file, if one exists.
///
/// Variables already present in the process environment take precedence over
/// the file. Returns the path of the file that was read; a missing file is
/// not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    let path = dotenvy::dotenv().ok()?;
    debug!("loaded environment from {}", path.display());
    Some(path)
}
