//! Client configuration.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ResolveError, ResolveResult};
use crate::resolve::guards::MAX_PARENT_DEPTH;

pub const DEFAULT_REGISTRY_URL: &str = "https://repo.maven.apache.org/maven2";

pub const DEFAULT_USER_AGENT: &str = concat!("pomgraph/", env!("CARGO_PKG_VERSION"));

static DEFAULT_URL: LazyLock<Url> = LazyLock::new(|| Url::parse(DEFAULT_REGISTRY_URL).unwrap());

/// Settings for one registry client. Each client owns its own value, so an
/// offline and an online client can live side by side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub registry_url: Url,
    /// Serve only from the response cache; a miss fails instead of fetching.
    pub offline: bool,
    pub max_parent_depth: usize,
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            offline: false,
            max_parent_depth: MAX_PARENT_DEPTH,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn default_registry_url() -> Url {
    DEFAULT_URL.clone()
}

impl RegistryConfig {
    pub fn new(registry_url: &str) -> ResolveResult<Self> {
        let registry_url = Url::parse(registry_url)
            .map_err(|e| ResolveError::InvalidRegistryUrl(format!("{registry_url}: {e}")))?;
        Ok(Self {
            registry_url,
            ..Self::default()
        })
    }

    pub fn from_json(text: &str) -> ResolveResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_max_parent_depth(mut self, depth: usize) -> Self {
        self.max_parent_depth = depth.max(1);
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.registry_url.as_str().trim_end_matches('/')
    }
}
