//! The `networks` section: connection parameters per named network.

use crate::{
    error::{ConfigError, Result},
    value::{ConfigValue, Secret},
};
use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{collections::HashSet, fmt, str::FromStr};
use url::Url;

/// Chain id of the Avalanche Fuji test network.
pub const FUJI_CHAIN_ID: u64 = 43113;

/// Transport used to reach a network's RPC endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Transport {
    /// JSON-RPC over http(s).
    #[default]
    #[serde(rename = "http")]
    Http,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            s => Err(format!("unknown transport: {s}")),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
        }
    }
}

/// Chain family a network belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainKind {
    /// A settlement layer chain.
    #[default]
    #[serde(rename = "l1")]
    L1,
    /// A rollup settling on an l1.
    #[serde(rename = "l2")]
    L2,
}

impl FromStr for ChainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "l1" => Ok(Self::L1),
            "l2" => Ok(Self::L2),
            s => Err(format!("unknown chain type: {s}")),
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::L1 => "l1",
            Self::L2 => "l2",
        };
        f.write_str(s)
    }
}

/// Connection parameters for one named network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Transport used to reach the endpoint.
    #[serde(rename = "type")]
    pub transport: Transport,
    /// Chain family, `l1` unless stated otherwise.
    #[serde(default)]
    pub chain_type: ChainKind,
    /// RPC endpoint, usually an environment reference.
    pub url: ConfigValue,
    /// Private keys of the accounts to operate with, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<ConfigValue>,
    /// Numeric chain id, if pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl NetworkConfig {
    /// An http network with the given endpoint and no accounts.
    pub fn http(url: impl Into<ConfigValue>) -> Self {
        Self {
            transport: Transport::Http,
            chain_type: ChainKind::default(),
            url: url.into(),
            accounts: Vec::new(),
            chain_id: None,
        }
    }

    /// Appends an account key.
    pub fn account(mut self, key: impl Into<ConfigValue>) -> Self {
        self.accounts.push(key.into());
        self
    }

    /// Pins the numeric chain id.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Checks values written out in the file, without touching the
    /// environment.
    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        if matches!(&self.url, ConfigValue::Literal(url) if url.is_empty()) {
            return Err(ConfigError::EmptyValue { network: name.to_string(), field: "url" });
        }
        for account in &self.accounts {
            if matches!(account, ConfigValue::Literal(key) if key.is_empty()) {
                return Err(ConfigError::EmptyValue {
                    network: name.to_string(),
                    field: "accounts",
                });
            }
        }
        Ok(())
    }

    /// Resolves the entry's references into connection values.
    pub fn resolve(&self, name: &str) -> Result<ResolvedNetwork> {
        trace!("resolving network {name}");
        self.validate(name)?;
        let url = self.url.resolve()?;
        let url = Url::parse(url.expose())
            .map_err(|source| ConfigError::InvalidUrl { network: name.to_string(), source })?;

        let mut accounts = Vec::with_capacity(self.accounts.len());
        for account in &self.accounts {
            accounts.push(account.resolve()?);
        }

        Ok(ResolvedNetwork {
            name: name.to_string(),
            transport: self.transport,
            chain_type: self.chain_type,
            url,
            accounts,
            chain_id: self.chain_id,
        })
    }
}

/// Connection values for one network after resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNetwork {
    /// Name the network is declared under.
    pub name: String,
    pub transport: Transport,
    pub chain_type: ChainKind,
    /// Parsed endpoint.
    pub url: Url,
    /// Private keys, in declaration order.
    pub accounts: Vec<Secret>,
    pub chain_id: Option<u64>,
}

/// Insertion ordered collection of named [`NetworkConfig`] entries.
///
/// Serialized as a json map keyed by network name. Names are unique; a
/// duplicate is rejected both by [`NetworksConfig::new`] and during
/// deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworksConfig {
    networks: Vec<(String, NetworkConfig)>,
}

impl NetworksConfig {
    /// Creates a collection from name and configuration pairs, rejecting
    /// duplicate names.
    pub fn new(networks: Vec<(String, NetworkConfig)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (name, _) in &networks {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateNetwork(name.clone()));
            }
        }
        Ok(Self { networks })
    }

    /// The two test networks preconfigured in new projects.
    pub fn stock() -> Self {
        Self {
            networks: vec![
                (
                    "sepolia".to_string(),
                    NetworkConfig::http(ConfigValue::env("SEPOLIA_RPC_URL"))
                        .account(ConfigValue::env("SEPOLIA_PRIVATE_KEY")),
                ),
                (
                    "fuji".to_string(),
                    NetworkConfig::http(ConfigValue::env("RPC_URL_FUJI"))
                        .account(ConfigValue::env("PRIVATE_KEY"))
                        .with_chain_id(FUJI_CHAIN_ID),
                ),
            ],
        }
    }

    /// Returns the configuration registered under `name`.
    pub fn get(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.iter().find(|(n, _)| n == name).map(|(_, config)| config)
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkConfig)> {
        self.networks.iter().map(|(name, config)| (name.as_str(), config))
    }

    /// Iterates network names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.networks.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl Serialize for NetworksConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.networks.len()))?;
        for (name, config) in &self.networks {
            map.serialize_entry(name, config)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NetworksConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NetworksVisitor;

        impl<'de> Visitor<'de> for NetworksVisitor {
            type Value = NetworksConfig;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of network names to network configurations")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut networks = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, NetworkConfig>()? {
                    networks.push(entry);
                }
                NetworksConfig::new(networks).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(NetworksVisitor)
    }
}
