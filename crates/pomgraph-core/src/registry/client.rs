//! Registry API client with a process-lifetime response cache.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::context::Context;
use crate::errors::{ResolveError, ResolveResult};
use crate::registry::metadata::Metadata;
use crate::registry::pom::Project;
use crate::registry::transport::{HttpTransport, RawResponse, RegistryTransport};
use crate::registry::xml;

/// Read-only client for a Maven repository layout.
///
/// Every response that reached us, 404s and other client errors included, is
/// kept in memory keyed by request URL; asking again never goes back to the
/// network. Server errors (5xx) are not kept, so a later request retries. The cache may be filled concurrently: two callers racing on one
/// URL may both fetch it, and the later insert wins with an equal value.
pub struct MavenRegistryApiClient {
    config: RegistryConfig,
    transport: Arc<dyn RegistryTransport>,
    responses: RwLock<IndexMap<String, RawResponse>>,
}

impl MavenRegistryApiClient {
    pub fn new(config: RegistryConfig) -> ResolveResult<Self> {
        let transport = HttpTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: RegistryConfig, transport: Arc<dyn RegistryTransport>) -> Self {
        Self {
            config,
            transport,
            responses: RwLock::new(IndexMap::new()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    pub fn project_url(&self, group_id: &str, artifact_id: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}-{}.pom",
            self.config.base_url(),
            group_id.replace('.', "/"),
            artifact_id,
            version,
            artifact_id,
            version,
        )
    }

    pub fn metadata_url(&self, group_id: &str, artifact_id: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            self.config.base_url(),
            group_id.replace('.', "/"),
            artifact_id,
        )
    }

    /// Fetch and decode the descriptor of one version.
    pub async fn get_project(
        &self,
        ctx: &Context,
        group_id: &str,
        artifact_id: &str,
        version: &str,
    ) -> ResolveResult<Project> {
        let url = self.project_url(group_id, artifact_id, version);
        let text = self.get_text(ctx, &url).await?;
        Project::from_xml(&text).map_err(|reason| ResolveError::malformed(&url, reason))
    }

    /// Fetch and decode the version listing of an artifact.
    pub async fn get_artifact_metadata(
        &self,
        ctx: &Context,
        group_id: &str,
        artifact_id: &str,
    ) -> ResolveResult<Metadata> {
        let url = self.metadata_url(group_id, artifact_id);
        let text = self.get_text(ctx, &url).await?;
        Metadata::from_xml(&text).map_err(|reason| ResolveError::malformed(&url, reason))
    }

    async fn get_text(&self, ctx: &Context, url: &str) -> ResolveResult<String> {
        let response = self.get(ctx, url).await?;
        match response.status {
            404 => Err(ResolveError::NotFound {
                url: url.to_string(),
            }),
            status if !response.is_success() => {
                warn!("{url} returned status {status}");
                Err(ResolveError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            _ => xml::decode(&response.body).map_err(|reason| ResolveError::malformed(url, reason)),
        }
    }

    async fn get(&self, ctx: &Context, url: &str) -> ResolveResult<RawResponse> {
        if ctx.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        let cached = self.responses.read().get(url).cloned();
        if let Some(cached) = cached {
            debug!("registry cache hit: {url}");
            return Ok(cached);
        }
        if self.config.offline {
            return Err(ResolveError::Offline {
                url: url.to_string(),
            });
        }

        debug!("registry cache miss, fetching {url}");
        let response = ctx.run(self.transport.get(url)).await?;
        if response.is_server_error() {
            debug!("not caching status {} from {url}", response.status);
        } else {
            self.responses
                .write()
                .insert(url.to_string(), response.clone());
        }
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Cache export / import
    // -----------------------------------------------------------------------

    pub fn cached_responses(&self) -> usize {
        self.responses.read().len()
    }

    /// Copy of every cached response, in insertion order.
    pub fn cache_snapshot(&self) -> IndexMap<String, RawResponse> {
        self.responses.read().clone()
    }

    /// Swap in a whole cache at once, dropping the current entries.
    pub fn replace_cache(&self, entries: IndexMap<String, RawResponse>) {
        *self.responses.write() = entries;
    }
}
