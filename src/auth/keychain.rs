//! Keychains map a registry host to credentials

use super::{AuthConfig, DockerConfig};
use anyhow::{Context, Result};
use oci_distribution::secrets::RegistryAuth;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Source of credentials for registry hosts
pub trait Keychain: Send + Sync {
    /// Credentials for `registry`, or `None` when this keychain has none
    fn resolve(&self, registry: &str) -> Result<Option<AuthConfig>>;

    /// Credentials for `registry` in the registry client's form, anonymous if absent
    fn registry_auth(&self, registry: &str) -> Result<RegistryAuth> {
        Ok(self
            .resolve(registry)?
            .map(|config| config.to_registry_auth())
            .unwrap_or(RegistryAuth::Anonymous))
    }
}

/// Fixed credentials keyed by registry host, as read from `authentication.toml`
#[derive(Debug, Clone, Default)]
pub struct StaticKeychain {
    credentials: HashMap<String, AuthConfig>,
}

impl StaticKeychain {
    pub fn new(credentials: HashMap<String, AuthConfig>) -> Self {
        Self { credentials }
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl Keychain for StaticKeychain {
    fn resolve(&self, registry: &str) -> Result<Option<AuthConfig>> {
        Ok(registry_variants(registry)
            .iter()
            .find_map(|variant| self.credentials.get(variant))
            .cloned())
    }
}

/// Credentials from the user's Docker (or podman) config file
pub struct DockerConfigKeychain {
    paths: Vec<PathBuf>,
    config: OnceLock<DockerConfig>,
}

impl DockerConfigKeychain {
    /// Keychain over the standard config locations
    pub fn new() -> Self {
        Self::with_paths(Self::config_paths())
    }

    /// Keychain that only looks at the given files, first parseable one wins
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            config: OnceLock::new(),
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(docker_config) = std::env::var("DOCKER_CONFIG") {
            paths.push(PathBuf::from(docker_config).join("config.json"));
        }
        if let Ok(auth_file) = std::env::var("REGISTRY_AUTH_FILE") {
            paths.push(PathBuf::from(auth_file));
        }
        if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR") {
            paths.push(PathBuf::from(xdg_runtime).join("containers/auth.json"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".docker/config.json"));
        }

        paths
    }

    fn config(&self) -> &DockerConfig {
        self.config.get_or_init(|| {
            for path in self.paths.iter().filter(|p| p.exists()) {
                let parsed = std::fs::read_to_string(path)
                    .map_err(anyhow::Error::from)
                    .and_then(|content| Ok(serde_json::from_str::<DockerConfig>(&content)?));
                match parsed {
                    Ok(config) => {
                        debug!("Loaded Docker config from {}", path.display());
                        return config;
                    }
                    Err(e) => warn!("Ignoring Docker config at {}: {}", path.display(), e),
                }
            }
            DockerConfig::default()
        })
    }

    fn credential_helper(config: &DockerConfig, registry: &str) -> Option<String> {
        registry_variants(registry)
            .iter()
            .find_map(|variant| config.cred_helpers.get(variant))
            .or(config.creds_store.as_ref())
            .cloned()
    }

    fn run_credential_helper(helper: &str, registry: &str) -> Result<AuthConfig> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        #[derive(serde::Deserialize)]
        struct HelperResponse {
            #[serde(rename = "Username")]
            username: Option<String>,
            #[serde(rename = "Secret")]
            secret: Option<String>,
        }

        let program = format!("docker-credential-{}", helper);
        debug!("Running {} for {}", program, registry);

        let mut child = Command::new(&program)
            .arg("get")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn credential helper {}", program))?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", registry)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            anyhow::bail!(
                "Credential helper {} failed: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let response: HelperResponse = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Failed to parse {} response", program))?;

        Ok(AuthConfig {
            username: response.username,
            password: response.secret,
            auth: None,
        })
    }
}

impl Default for DockerConfigKeychain {
    fn default() -> Self {
        Self::new()
    }
}

impl Keychain for DockerConfigKeychain {
    fn resolve(&self, registry: &str) -> Result<Option<AuthConfig>> {
        let config = self.config();

        if let Some(entry) = registry_variants(registry)
            .iter()
            .find_map(|variant| config.auths.get(variant))
            .filter(|entry| !entry.is_anonymous())
        {
            debug!("Using Docker config credentials for {}", registry);
            return Ok(Some(entry.clone()));
        }

        if let Some(helper) = Self::credential_helper(config, registry) {
            match Self::run_credential_helper(&helper, registry) {
                Ok(auth) => return Ok(Some(auth)),
                Err(e) => warn!("Credential helper for {} failed: {}", registry, e),
            }
        }

        Ok(None)
    }
}

/// Tries each keychain in order and returns the first credentials found
pub struct MultiKeychain {
    keychains: Vec<Box<dyn Keychain>>,
}

impl MultiKeychain {
    pub fn new(keychains: Vec<Box<dyn Keychain>>) -> Self {
        Self { keychains }
    }
}

impl Keychain for MultiKeychain {
    fn resolve(&self, registry: &str) -> Result<Option<AuthConfig>> {
        for keychain in &self.keychains {
            if let Some(auth) = keychain.resolve(registry)? {
                return Ok(Some(auth));
            }
        }
        debug!("No credentials found for {}, using anonymous", registry);
        Ok(None)
    }
}

/// Spellings a registry host may be stored under
fn registry_variants(registry: &str) -> Vec<String> {
    let host = registry
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');

    if matches!(host, "docker.io" | "index.docker.io" | "registry-1.docker.io") {
        return vec![
            host.to_string(),
            "docker.io".to_string(),
            "index.docker.io".to_string(),
            "registry-1.docker.io".to_string(),
            "https://index.docker.io/v1/".to_string(),
        ];
    }

    vec![
        host.to_string(),
        format!("https://{}", host),
        format!("http://{}", host),
        format!("https://{}/v1/", host),
        format!("https://{}/v2/", host),
    ]
}
