/// Platform defaults applied when an architecture string is incomplete
pub mod platform {
    /// Operating system assumed when only an architecture is given
    pub const DEFAULT_OS: &str = "linux";

    /// Architecture assumed when none can be parsed
    pub const DEFAULT_ARCH: &str = "amd64";

    /// The only architecture whose third path segment is read as a variant
    pub const ARM: &str = "arm";
}

/// Default file locations for the command line
pub mod files {
    /// Containers declaration read when `--containers` is not given
    pub const CONTAINERS: &str = "containers.toml";

    /// Credentials file read when `--auth` is not given
    pub const AUTHENTICATION: &str = "authentication.toml";
}

/// Manifest media types assumed when a registry omits `mediaType`
pub mod media_type {
    pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
    pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
}
