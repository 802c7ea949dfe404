use crate::constants::media_type;
use crate::platform::PlatformSpec;
use oci_distribution::manifest::OciManifest;

/// A manifest as fetched from a registry, reduced to what digest resolution needs
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Digest of the fetched manifest itself (the list digest for a manifest list)
    pub digest: String,
    pub media_type: String,
    /// Per-platform entries; `None` for a single-platform manifest
    pub manifests: Option<Vec<ManifestDescriptor>>,
}

/// Descriptor for a platform-specific manifest in a manifest list
#[derive(Debug, Clone)]
pub struct ManifestDescriptor {
    pub media_type: String,
    pub size: i64,
    pub digest: String,
    pub platform: Option<Platform>,
}

/// Platform information for a manifest
#[derive(Debug, Clone)]
pub struct Platform {
    pub architecture: String,
    pub os: String,
    pub variant: Option<String>,
}

impl Manifest {
    /// A single-platform manifest
    pub fn single(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            media_type: media_type::OCI_MANIFEST.to_string(),
            manifests: None,
        }
    }

    /// A manifest list over the given entries
    pub fn list(digest: impl Into<String>, manifests: Vec<ManifestDescriptor>) -> Self {
        Self {
            digest: digest.into(),
            media_type: media_type::OCI_INDEX.to_string(),
            manifests: Some(manifests),
        }
    }

    /// Build from the registry client's manifest and the digest it reported
    pub fn from_oci(manifest: OciManifest, digest: String) -> Self {
        match manifest {
            OciManifest::Image(image) => Self {
                digest,
                media_type: image
                    .media_type
                    .unwrap_or_else(|| media_type::OCI_MANIFEST.to_string()),
                manifests: None,
            },
            OciManifest::ImageIndex(index) => {
                let manifests = index
                    .manifests
                    .into_iter()
                    .map(|entry| ManifestDescriptor {
                        media_type: entry.media_type,
                        size: entry.size,
                        digest: entry.digest,
                        platform: entry.platform.map(|p| Platform {
                            architecture: p.architecture,
                            os: p.os,
                            variant: p.variant,
                        }),
                    })
                    .collect();
                Self {
                    digest,
                    media_type: index
                        .media_type
                        .unwrap_or_else(|| media_type::OCI_INDEX.to_string()),
                    manifests: Some(manifests),
                }
            }
        }
    }

    pub fn is_list(&self) -> bool {
        self.manifests.is_some()
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Digest of the first list entry whose platform matches `platform`
    pub fn find_platform_digest(&self, platform: &PlatformSpec) -> Option<&str> {
        self.manifests
            .as_deref()?
            .iter()
            .find(|entry| {
                entry.platform.as_ref().is_some_and(|p| {
                    platform.matches(&p.os, &p.architecture, p.variant.as_deref())
                })
            })
            .map(|entry| entry.digest.as_str())
    }

    /// Platforms advertised by a manifest list, as `os/arch[/variant]` strings
    pub fn platforms(&self) -> Vec<String> {
        self.manifests
            .iter()
            .flatten()
            .filter_map(|entry| entry.platform.as_ref())
            .map(|p| match &p.variant {
                Some(variant) => format!("{}/{}/{}", p.os, p.architecture, variant),
                None => format!("{}/{}", p.os, p.architecture),
            })
            .collect()
    }
}

impl ManifestDescriptor {
    pub fn new(
        digest: impl Into<String>,
        os: &str,
        architecture: &str,
        variant: Option<&str>,
    ) -> Self {
        Self {
            media_type: media_type::OCI_MANIFEST.to_string(),
            size: 0,
            digest: digest.into(),
            platform: Some(Platform {
                architecture: architecture.to_string(),
                os: os.to_string(),
                variant: variant.map(str::to_string),
            }),
        }
    }
}
