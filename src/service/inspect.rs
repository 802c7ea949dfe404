//! Manifest inspection for a single image reference

use anyhow::Result;
use std::fmt;

use crate::{
    manifest::Manifest,
    registry::{parse_image_reference, ManifestSource},
    resolve::canonical_reference,
};

/// What `inspect` reports about one manifest
#[derive(Debug)]
pub struct InspectReport {
    pub reference: String,
    pub media_type: String,
    pub digest: String,
    pub platforms: Vec<String>,
}

impl InspectReport {
    fn from_manifest(reference: String, manifest: &Manifest) -> Self {
        Self {
            reference,
            media_type: manifest.media_type.clone(),
            digest: manifest.digest().to_string(),
            platforms: manifest.platforms(),
        }
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reference: {}", self.reference)?;
        writeln!(f, "Manifest Type: {}", self.media_type)?;
        write!(f, "Manifest Digest: {}", self.digest)?;
        if !self.platforms.is_empty() {
            write!(f, "\nAvailable Platforms:")?;
            for platform in &self.platforms {
                write!(f, "\n  - {}", platform)?;
            }
        }
        Ok(())
    }
}

/// Fetch the manifest for `image` and describe it
pub async fn inspect<S: ManifestSource>(source: &S, image: &str) -> Result<InspectReport> {
    let (registry, repository, tag) = parse_image_reference(image)?;
    let reference = canonical_reference(&registry, &repository, &tag);
    let manifest = source.fetch_manifest(&reference).await?;
    Ok(InspectReport::from_manifest(reference, &manifest))
}
