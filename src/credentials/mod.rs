//! Credential storage for search engine authentication
//!
//! Credentials live in a YAML file next to the configuration, keyed by id.
//! The configuration only stores the id; the secret material is resolved
//! through [`CredentialResolver`] at the point of use.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{resolve_path, write_private};
use crate::error::{ConfigError, Result};

const CREDENTIALS_FILE: &str = "credentials.yaml";

/// A stored credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    UsernamePassword {
        username: String,
        password: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    SecretText {
        secret: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl Credential {
    /// Short type label for listings
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::UsernamePassword { .. } => "username/password",
            Credential::SecretText { .. } => "secret text",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Credential::UsernamePassword { description, .. }
            | Credential::SecretText { description, .. } => description.as_deref(),
        }
    }
}

/// Username and password pair used for HTTP basic auth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Looks up credentials by id
pub trait CredentialResolver {
    /// Find a credential of any type
    fn lookup(&self, id: &str) -> Option<&Credential>;

    /// Find a username/password credential, ignoring other types
    fn username_password(&self, id: &str) -> Option<BasicAuth> {
        match self.lookup(id)? {
            Credential::UsernamePassword {
                username, password, ..
            } => Some(BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }),
            Credential::SecretText { .. } => None,
        }
    }
}

/// In-memory set of credentials, as persisted in the credentials file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub credentials: BTreeMap<String, Credential>,
}

impl CredentialResolver for Credentials {
    fn lookup(&self, id: &str) -> Option<&Credential> {
        self.credentials.get(id)
    }
}

/// File-backed credential store
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    entries: Credentials,
}

impl CredentialStore {
    /// Load the store from a custom path or `~/.trivy-publisher/credentials.yaml`.
    ///
    /// A missing file yields an empty store.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = resolve_path(path, CREDENTIALS_FILE)?;

        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_yaml::from_str(&contents).map_err(ConfigError::from)?
        } else {
            Credentials::default()
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn entries(&self) -> &Credentials {
        &self.entries
    }

    /// Add or replace a credential
    pub fn insert(&mut self, id: &str, credential: Credential) -> Result<()> {
        if id.trim().is_empty() {
            return Err(ConfigError::Invalid("Credential id must not be empty".to_string()).into());
        }
        self.entries.credentials.insert(id.to_string(), credential);
        self.save()
    }

    /// Remove a credential, returning whether it existed
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let existed = self.entries.credentials.remove(id).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    fn save(&self) -> Result<()> {
        let contents = serde_yaml::to_string(&self.entries)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        write_private(&self.path, &contents)
    }
}

impl CredentialResolver for CredentialStore {
    fn lookup(&self, id: &str) -> Option<&Credential> {
        self.entries.lookup(id)
    }
}
