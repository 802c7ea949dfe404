//! Nested digest results: registry → repository → tag → architecture → value
//!
//! Every level is a `HashMap`, so iteration order carries no meaning. Output
//! ordering is decided by the serializer.

use std::collections::HashMap;

/// Architecture to digest (or full reference)
pub type ArchMap = HashMap<String, String>;

/// Tag to architectures
pub type TagMap = HashMap<String, ArchMap>;

/// Repository to tags
pub type RepositoryMap = HashMap<String, TagMap>;

/// Registry to repositories
pub type NestedDigestResult = HashMap<String, RepositoryMap>;

/// Digest resolved for one requested architecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRecord {
    pub architecture: String,
    pub digest: String,
}

/// Insert one leaf, creating the intermediate levels on first use
pub fn insert(
    results: &mut NestedDigestResult,
    registry: &str,
    repository: &str,
    tag: &str,
    record: DigestRecord,
) {
    results
        .entry(registry.to_string())
        .or_default()
        .entry(repository.to_string())
        .or_default()
        .entry(tag.to_string())
        .or_default()
        .insert(record.architecture, record.digest);
}

/// Rewrite every leaf to `registry/repository@digest`, keeping all keys
pub fn expand_references(results: &NestedDigestResult) -> NestedDigestResult {
    results
        .iter()
        .map(|(registry, repositories)| {
            let repositories = repositories
                .iter()
                .map(|(repository, tags)| {
                    let tags = tags
                        .iter()
                        .map(|(tag, archs)| {
                            let archs = archs
                                .iter()
                                .map(|(arch, digest)| {
                                    (
                                        arch.clone(),
                                        format!("{}/{}@{}", registry, repository, digest),
                                    )
                                })
                                .collect();
                            (tag.clone(), archs)
                        })
                        .collect();
                    (repository.clone(), tags)
                })
                .collect();
            (registry.clone(), repositories)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(architecture: &str, digest: &str) -> DigestRecord {
        DigestRecord {
            architecture: architecture.to_string(),
            digest: digest.to_string(),
        }
    }

    fn sample() -> NestedDigestResult {
        let mut results = NestedDigestResult::new();
        insert(&mut results, "docker.io", "library/busybox", "latest", record("linux/amd64", "sha256:a"));
        insert(&mut results, "docker.io", "library/busybox", "latest", record("linux/arm/v5", "sha256:b"));
        insert(&mut results, "docker.io", "library/alpine", "3.19", record("linux/amd64", "sha256:c"));
        insert(&mut results, "ghcr.io", "user/repo", "1.0.0", record("linux/arm64", "sha256:d"));
        results
    }

    #[test]
    fn test_insert_creates_levels() {
        let results = sample();
        assert_eq!(results.len(), 2);
        assert_eq!(results["docker.io"].len(), 2);
        assert_eq!(results["docker.io"]["library/busybox"]["latest"].len(), 2);
        assert_eq!(results["ghcr.io"]["user/repo"]["1.0.0"]["linux/arm64"], "sha256:d");
    }

    #[test]
    fn test_insert_overwrites_duplicate_leaf() {
        let mut results = sample();
        insert(&mut results, "ghcr.io", "user/repo", "1.0.0", record("linux/arm64", "sha256:new"));
        assert_eq!(results["ghcr.io"]["user/repo"]["1.0.0"].len(), 1);
        assert_eq!(results["ghcr.io"]["user/repo"]["1.0.0"]["linux/arm64"], "sha256:new");
    }

    #[test]
    fn test_expand_references_preserves_shape() {
        let results = sample();
        let expanded = expand_references(&results);

        assert_eq!(expanded.len(), results.len());
        for (registry, repositories) in &results {
            let expanded_repositories = &expanded[registry];
            assert_eq!(expanded_repositories.len(), repositories.len());
            for (repository, tags) in repositories {
                let expanded_tags = &expanded_repositories[repository];
                assert_eq!(expanded_tags.len(), tags.len());
                for (tag, archs) in tags {
                    let expanded_archs = &expanded_tags[tag];
                    assert_eq!(expanded_archs.len(), archs.len());
                    for (arch, digest) in archs {
                        assert_eq!(
                            expanded_archs[arch],
                            format!("{}/{}@{}", registry, repository, digest)
                        );
                    }
                }
            }
        }

        assert_eq!(
            expanded["docker.io"]["library/busybox"]["latest"]["linux/arm/v5"],
            "docker.io/library/busybox@sha256:b"
        );
    }

    #[test]
    fn test_expand_references_keeps_empty_levels() {
        let mut results = NestedDigestResult::new();
        results.entry("quay.io".to_string()).or_default();
        let expanded = expand_references(&results);
        assert!(expanded["quay.io"].is_empty());
    }
}
