//! Architecture-aware digest resolution
//!
//! A tag may point at a single-platform manifest or at a manifest list. For a
//! list, the digest of the entry matching the requested platform is returned;
//! when no entry matches, the list's own digest is returned instead unless the
//! resolver is strict.

use crate::platform::PlatformSpec;
use crate::registry::{parse_reference, ManifestSource};
use anyhow::Result;
use tracing::{debug, warn};

/// Resolves `(registry, repository, tag, architecture)` to a content digest
pub struct DigestResolver<S> {
    source: S,
    strict: bool,
}

impl<S: ManifestSource> DigestResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            strict: false,
        }
    }

    /// Fail instead of falling back to the list digest when a platform is missing
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn resolve(
        &self,
        registry: &str,
        repository: &str,
        tag: &str,
        architecture: &str,
    ) -> Result<String> {
        let reference = canonical_reference(registry, repository, tag);
        parse_reference(&reference)?;

        let platform = PlatformSpec::parse(architecture);
        let manifest = self.source.fetch_manifest(&reference).await?;

        if manifest.is_list() {
            if let Some(digest) = manifest.find_platform_digest(&platform) {
                debug!("{} {} -> {}", reference, platform, digest);
                return Ok(digest.to_string());
            }

            if self.strict {
                anyhow::bail!(
                    "platform {} not found in manifest list for {} (available: {})",
                    platform,
                    reference,
                    manifest.platforms().join(", ")
                );
            }
            warn!(
                "No {} entry in manifest list for {}, using the list digest",
                platform, reference
            );
        }

        debug!("{} {} -> {}", reference, platform, manifest.digest());
        Ok(manifest.digest().to_string())
    }
}

/// `registry/repository:tag`
pub fn canonical_reference(registry: &str, repository: &str, tag: &str) -> String {
    format!("{}/{}:{}", registry, repository, tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestDescriptor};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves one canned manifest and records the references asked for
    struct FixedSource {
        manifest: Manifest,
        requests: Mutex<Vec<String>>,
    }

    impl FixedSource {
        fn new(manifest: Manifest) -> Self {
            Self {
                manifest,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ManifestSource for FixedSource {
        async fn fetch_manifest(&self, reference: &str) -> Result<Manifest> {
            self.requests.lock().unwrap().push(reference.to_string());
            Ok(self.manifest.clone())
        }
    }

    fn amd64_only_list() -> Manifest {
        Manifest::list(
            "sha256:list",
            vec![ManifestDescriptor::new("sha256:d1", "linux", "amd64", None)],
        )
    }

    #[tokio::test]
    async fn test_list_entry_digest_for_present_platform() {
        let resolver = DigestResolver::new(FixedSource::new(amd64_only_list()));
        let digest = resolver
            .resolve("docker.io", "library/busybox", "latest", "linux/amd64")
            .await
            .unwrap();
        assert_eq!(digest, "sha256:d1");
        assert_eq!(
            resolver.source().requests.lock().unwrap().as_slice(),
            ["docker.io/library/busybox:latest".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_digest_for_absent_platform() {
        let resolver = DigestResolver::new(FixedSource::new(amd64_only_list()));
        let digest = resolver
            .resolve("docker.io", "library/busybox", "latest", "linux/arm64")
            .await
            .unwrap();
        assert_eq!(digest, "sha256:list");
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_absent_platform() {
        let resolver = DigestResolver::new(FixedSource::new(amd64_only_list())).strict(true);
        let err = resolver
            .resolve("docker.io", "library/busybox", "latest", "linux/arm64")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("platform linux/arm64 not found"));
        assert!(message.contains("linux/amd64"));
    }

    #[tokio::test]
    async fn test_single_manifest_digest() {
        let resolver =
            DigestResolver::new(FixedSource::new(Manifest::single("sha256:single"))).strict(true);
        let digest = resolver
            .resolve("ghcr.io", "user/repo", "1.0.0", "linux/arm/v7")
            .await
            .unwrap();
        assert_eq!(digest, "sha256:single");
    }

    #[tokio::test]
    async fn test_variant_must_match_when_requested() {
        let list = Manifest::list(
            "sha256:list",
            vec![
                ManifestDescriptor::new("sha256:v6", "linux", "arm", Some("v6")),
                ManifestDescriptor::new("sha256:v7", "linux", "arm", Some("v7")),
            ],
        );
        let resolver = DigestResolver::new(FixedSource::new(list));
        assert_eq!(
            resolver
                .resolve("docker.io", "library/alpine", "3", "linux/arm/v7")
                .await
                .unwrap(),
            "sha256:v7"
        );
        assert_eq!(
            resolver
                .resolve("docker.io", "library/alpine", "3", "linux/arm/v5")
                .await
                .unwrap(),
            "sha256:list"
        );
    }

    #[tokio::test]
    async fn test_malformed_reference_never_fetches() {
        let resolver = DigestResolver::new(FixedSource::new(Manifest::single("sha256:x")));
        let err = resolver
            .resolve("docker.io", "Library/BusyBox", "latest", "linux/amd64")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create image reference"));
        assert!(resolver.source().requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_canonical_reference() {
        assert_eq!(
            canonical_reference("localhost:5000", "team/app", "v2"),
            "localhost:5000/team/app:v2"
        );
    }
}
