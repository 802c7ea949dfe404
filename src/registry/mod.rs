use crate::auth::Keychain;
use crate::manifest::Manifest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use oci_distribution::client::{ClientConfig, ClientProtocol};
use oci_distribution::{Client, Reference, RegistryOperation};
use std::sync::Arc;
use tracing::debug;

pub use oci_distribution::secrets::RegistryAuth;


/// Read-only access to manifests by reference
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch the manifest addressed by `reference` (`registry/repository:tag`)
    async fn fetch_manifest(&self, reference: &str) -> Result<Manifest>;
}

/// Manifest source backed by a real OCI distribution registry
pub struct RegistryClient {
    client: Client,
    keychain: Arc<dyn Keychain>,
}

impl RegistryClient {
    pub fn new(keychain: Box<dyn Keychain>) -> Self {
        Self::with_insecure_registries(keychain, Vec::new())
    }

    /// Client that uses plain HTTP for the listed registry hosts
    pub fn with_insecure_registries(keychain: Box<dyn Keychain>, insecure: Vec<String>) -> Self {
        let protocol = if insecure.is_empty() {
            ClientProtocol::Https
        } else {
            ClientProtocol::HttpsExcept(insecure)
        };
        let client = Client::new(ClientConfig {
            protocol,
            ..Default::default()
        });
        Self {
            client,
            keychain: Arc::from(keychain),
        }
    }
}

#[async_trait]
impl ManifestSource for RegistryClient {
    async fn fetch_manifest(&self, reference: &str) -> Result<Manifest> {
        let parsed = parse_reference(reference)?;
        // Keychains may read files or run credential helpers
        let keychain = Arc::clone(&self.keychain);
        let registry = parsed.registry().to_string();
        let auth = tokio::task::spawn_blocking(move || keychain.registry_auth(&registry))
            .await
            .context("Credential lookup task failed")?
            .with_context(|| format!("Failed to resolve credentials for {}", parsed.registry()))?;

        debug!("Fetching manifest for {}", parsed);

        self.client
            .auth(&parsed, &auth, RegistryOperation::Pull)
            .await
            .with_context(|| format!("Failed to authenticate with {}", parsed.registry()))?;

        let (manifest, digest) = self
            .client
            .pull_manifest(&parsed, &auth)
            .await
            .with_context(|| format!("Failed to get manifest for {}", reference))?;

        let manifest = Manifest::from_oci(manifest, digest);
        debug!(
            "Fetched {} ({}, digest {})",
            reference, manifest.media_type, manifest.digest
        );
        Ok(manifest)
    }
}

/// Parse a canonical `registry/repository:tag` reference
pub fn parse_reference(reference: &str) -> Result<Reference> {
    reference
        .parse::<Reference>()
        .with_context(|| format!("Failed to create image reference for {}", reference))
}

/// Split an image reference into registry, repository and tag (`latest` if absent)
pub fn parse_image_reference(image: &str) -> Result<(String, String, String)> {
    let reference = parse_reference(image)?;

    let registry = reference.registry().to_string();
    let repository = reference.repository().to_string();
    let tag = reference.tag().unwrap_or("latest").to_string();

    Ok((registry, repository, tag))
}
