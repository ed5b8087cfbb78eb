//! The YAML configuration of a flow run.
//!
//! ```yaml
//! issuerURL: https://accounts.example.com/
//! insecure: false
//! scopes: [openid, email]
//! extraParams:
//!   audience: api
//!   resource: [a, b]
//! clientID: my-client
//! clientSecret: my-secret
//! clientPort: 4447
//! ```
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeMap, path::Path};

/// Port of the local callback listener when none is configured.
pub const DEFAULT_CLIENT_PORT: i64 = 4447;

/// Scope requested when none is configured, required for OpenID Connect.
pub const SCOPE_OPENID: &str = "openid";

/// Configuration of a single flow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "issuerURL")]
    pub issuer_url: String,

    /// Skip verification of the provider's TLS certificate.
    pub insecure: bool,

    pub scopes: Vec<String>,

    /// Additional parameters sent with the authorization request.
    #[serde(rename = "extraParams")]
    pub extra_params: BTreeMap<String, MultiValue>,

    #[serde(rename = "clientID")]
    pub client_id: String,

    #[serde(rename = "clientSecret")]
    pub client_secret: String,

    /// Kept signed and wide so out of range values can be reported.
    #[serde(rename = "clientPort")]
    pub client_port: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            issuer_url: String::new(),
            insecure: false,
            scopes: Vec::new(),
            extra_params: BTreeMap::new(),
            client_id: String::new(),
            client_secret: String::new(),
            client_port: DEFAULT_CLIENT_PORT,
        }
    }
}

impl Config {
    /// Reads the configuration from a YAML file.
    ///
    /// # Errors
    /// - the file cannot be read
    /// - the file is not valid YAML for a [`Config`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parses the configuration from a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Checks the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::with_capacity(3);

        if self.issuer_url.is_empty() {
            errors.push("issuerURL is required".to_string());
        }
        if self.client_id.is_empty() {
            errors.push("clientID is required".to_string());
        }
        if self.port().is_none() {
            errors.push(invalid_port(self.client_port));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { errors })
        }
    }

    /// The callback listener port, if it is within 1..=65535.
    pub fn port(&self) -> Option<u16> {
        u16::try_from(self.client_port).ok().filter(|port| *port > 0)
    }

    /// The scopes to request. Falls back to `openid` when none are configured.
    pub fn scopes(&self) -> Vec<String> {
        if self.scopes.is_empty() {
            vec![SCOPE_OPENID.to_string()]
        } else {
            self.scopes.clone()
        }
    }

    /// The extra authorization parameters with all their values.
    pub fn extra_params(&self) -> BTreeMap<String, Vec<String>> {
        self.extra_params
            .iter()
            .map(|(key, value)| (key.clone(), value.0.clone()))
            .collect()
    }

    /// Renders the configuration as YAML with `prefix` in front of every line.
    pub fn to_display_string(&self, prefix: &str) -> Result<String, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(self)?;
        let lines: Vec<String> = yaml
            .trim()
            .lines()
            .map(|line| format!("{prefix}{line}"))
            .collect();
        Ok(lines.join("\n"))
    }
}

/// One or many string values. Written in YAML either as a scalar or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiValue(pub Vec<String>);

impl<'de> Deserialize<'de> for MultiValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(value) => Self(vec![value]),
            Repr::Many(values) => Self(values),
        })
    }
}

impl Serialize for MultiValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.as_slice() {
            [value] => serializer.serialize_str(value),
            values => values.serialize(serializer),
        }
    }
}

impl<const N: usize> From<[&str; N]> for MultiValue {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}

/// The configuration file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    Read(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Every problem found while validating a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("config errors:\n  {}", .errors.join("\n  "))]
pub struct ConfigError {
    pub errors: Vec<String>,
}

impl ConfigError {
    pub(crate) fn invalid_port(client_port: i64) -> Self {
        Self {
            errors: vec![invalid_port(client_port)],
        }
    }
}

fn invalid_port(client_port: i64) -> String {
    format!("clientPort [{client_port}] is invalid")
}
