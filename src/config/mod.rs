use crate::auth::{AuthConfig, StaticKeychain};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};


/// Contents of `containers.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainersConfig {
    /// Optional label to registry URL table
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,

    /// Images to resolve, in declaration order
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// One `[[containers]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    /// Registry host, or a label from `[repositories]`
    pub repository: String,
    /// Repository path inside the registry (e.g. `library/busybox`)
    pub name: String,
    pub tag: String,
    #[serde(default)]
    pub architectures: Vec<String>,
}

/// Contents of `authentication.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthFile {
    /// Keyed by repository label (or registry host)
    #[serde(default)]
    pub credentials: HashMap<String, Credential>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// One image to resolve, with its registry already resolved to a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSpec {
    pub registry: String,
    pub name: String,
    pub tag: String,
    pub architectures: Vec<String>,
}

impl ContainersConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read containers config {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse containers config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: ContainersConfig = toml::from_str(content)?;
        debug!(
            "Parsed {} container(s), {} repository label(s)",
            config.containers.len(),
            config.repositories.len()
        );
        Ok(config)
    }

    /// Registry host a container's `repository` field refers to.
    ///
    /// Labels found in `[repositories]` resolve through the table. Anything
    /// else is taken as a host, unless the table is in use and the value does
    /// not look like a host at all.
    pub fn registry_host(&self, repository: &str) -> Result<String> {
        if let Some(url) = self.repositories.get(repository) {
            return Ok(host_from_url(url));
        }
        if !self.repositories.is_empty() && !looks_like_host(repository) {
            anyhow::bail!("repository {} not found in configuration", repository);
        }
        Ok(host_from_url(repository))
    }

    /// Replace a leading `[repositories]` label in an image reference with its host
    pub fn expand_label(&self, image: &str) -> String {
        match image
            .split_once('/')
            .and_then(|(first, rest)| Some((self.repositories.get(first)?, rest)))
        {
            Some((url, rest)) => format!("{}/{}", host_from_url(url), rest),
            None => image.to_string(),
        }
    }

    /// Resolved image list, in declaration order
    pub fn image_specs(&self) -> Result<Vec<ImageSpec>> {
        self.containers
            .iter()
            .map(|container| {
                Ok(ImageSpec {
                    registry: self.registry_host(&container.repository)?,
                    name: container.name.clone(),
                    tag: container.tag.clone(),
                    architectures: container.architectures.clone(),
                })
            })
            .collect()
    }
}

impl AuthFile {
    /// Load credentials; a missing file means no credentials
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No credentials file at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read auth config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse auth config {}", path.display()))
    }

    /// Keychain keyed by the registry host each credential's label resolves to.
    ///
    /// Labels that resolve to no registry are skipped with a warning.
    pub fn keychain(&self, containers: &ContainersConfig) -> Result<StaticKeychain> {
        let mut by_host = HashMap::new();
        for (label, credential) in &self.credentials {
            let host = match containers.registry_host(label) {
                Ok(host) => host,
                Err(e) => {
                    warn!("Ignoring credentials for {}: {}", label, e);
                    continue;
                }
            };
            by_host.insert(
                host,
                AuthConfig::new(credential.username.clone(), credential.password.clone()),
            );
        }
        Ok(StaticKeychain::new(by_host))
    }
}

fn host_from_url(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

fn looks_like_host(value: &str) -> bool {
    let host = host_from_url(value);
    host == "localhost" || host.contains('.') || host.contains(':')
}
