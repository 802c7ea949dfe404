//! Credential lookup for registries
//!
//! Credentials come from the `authentication.toml` file next to the containers
//! declaration, or from the user's Docker config. The registry client owns the
//! token exchange itself; this module only decides which credentials to hand it.

use base64::Engine;
use oci_distribution::secrets::RegistryAuth;
use serde::Deserialize;
use std::collections::HashMap;

mod keychain;

pub use keychain::{DockerConfigKeychain, Keychain, MultiKeychain, StaticKeychain};

/// Credentials for one registry, in any of the shapes Docker config files use
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    /// base64 of `username:password`
    pub auth: Option<String>,
}

impl AuthConfig {
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: Some(username),
            password: Some(password),
            auth: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.auth.is_none()
    }

    /// Convert to the registry client's auth type.
    ///
    /// An `auth` blob that does not decode to `user:pass` yields anonymous access.
    pub fn to_registry_auth(&self) -> RegistryAuth {
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            return RegistryAuth::Basic(username.clone(), password.clone());
        }

        if let Some(auth) = &self.auth {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(auth)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            if let Some((user, pass)) = decoded.as_deref().and_then(|s| s.split_once(':')) {
                return RegistryAuth::Basic(user.to_string(), pass.to_string());
            }
        }

        RegistryAuth::Anonymous
    }
}

/// Docker config file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, AuthConfig>,
    #[serde(rename = "credHelpers", default)]
    pub cred_helpers: HashMap<String, String>,
    #[serde(rename = "credsStore")]
    pub creds_store: Option<String>,
}

#[cfg(test)]
mod tests;
