//! Architecture string parsing
//!
//! Turns the architecture strings written in `containers.toml`
//! (`linux/amd64`, `linux/arm/v7`, `arm64`, ...) into the platform triple
//! that manifest list entries are matched against.

use crate::constants::platform::{ARM, DEFAULT_ARCH, DEFAULT_OS};
use std::fmt;

/// Requested platform for a digest lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSpec {
    pub os: String,
    pub architecture: String,
    pub variant: Option<String>,
}

impl PlatformSpec {
    /// Parse an architecture string.
    ///
    /// With two or more `/`-separated parts the first is the OS and the second
    /// the architecture; a third part is only read as the variant when the
    /// architecture is `arm`. A string without a `/` is taken as the
    /// architecture on `linux`. An empty architecture becomes `amd64`.
    pub fn parse(architecture: &str) -> Self {
        let parts: Vec<&str> = architecture.split('/').collect();

        let (os, arch, variant) = if parts.len() >= 2 {
            let variant = match parts.get(2) {
                Some(v) if parts[1] == ARM => Some(v.to_string()),
                _ => None,
            };
            (parts[0].to_string(), parts[1].to_string(), variant)
        } else {
            (DEFAULT_OS.to_string(), architecture.to_string(), None)
        };

        let arch = if arch.is_empty() {
            DEFAULT_ARCH.to_string()
        } else {
            arch
        };

        Self {
            os,
            architecture: arch,
            variant,
        }
    }

    /// Whether a manifest list entry's platform fields satisfy this request.
    ///
    /// The variant only takes part in the comparison when one was requested.
    pub fn matches(&self, os: &str, architecture: &str, variant: Option<&str>) -> bool {
        if self.os != os || self.architecture != architecture {
            return false;
        }
        match &self.variant {
            Some(wanted) => variant == Some(wanted.as_str()),
            None => true,
        }
    }
}

impl fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)?;
        if let Some(variant) = &self.variant {
            write!(f, "/{}", variant)?;
        }
        Ok(())
    }
}
