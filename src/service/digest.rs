//! Digest service: resolves every configured image and architecture
//!
//! Lookups run one at a time. The first failure aborts the whole pass and no
//! partial results are returned.

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::ImageSpec,
    registry::ManifestSource,
    resolve::DigestResolver,
    results::{insert, DigestRecord, NestedDigestResult},
};

/// Service for building the nested digest results
pub struct DigestService<S> {
    resolver: DigestResolver<S>,
}

impl<S: ManifestSource> DigestService<S> {
    pub fn new(resolver: DigestResolver<S>) -> Self {
        Self { resolver }
    }

    /// Resolve every architecture of one image, in the order requested
    pub async fn resolve_image(&self, image: &ImageSpec) -> Result<Vec<DigestRecord>> {
        let mut records = Vec::with_capacity(image.architectures.len());
        for architecture in &image.architectures {
            let digest = self
                .resolver
                .resolve(&image.registry, &image.name, &image.tag, architecture)
                .await
                .with_context(|| {
                    format!(
                        "failed to get digest for {}/{}:{} ({})",
                        image.registry, image.name, image.tag, architecture
                    )
                })?;
            records.push(DigestRecord {
                architecture: architecture.clone(),
                digest,
            });
        }
        Ok(records)
    }

    /// Resolve all images into registry → repository → tag → architecture → digest
    pub async fn aggregate(&self, images: &[ImageSpec]) -> Result<NestedDigestResult> {
        let mut results = NestedDigestResult::new();
        let mut lookups = 0;

        for image in images {
            info!(
                "Resolving {}/{}:{} for {} architecture(s)",
                image.registry,
                image.name,
                image.tag,
                image.architectures.len()
            );

            for record in self.resolve_image(image).await? {
                insert(&mut results, &image.registry, &image.name, &image.tag, record);
                lookups += 1;
            }
        }

        info!(
            "Resolved {} digest(s) for {} image(s)",
            lookups,
            images.len()
        );
        Ok(results)
    }
}
