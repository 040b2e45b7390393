//! Publisher configuration
//!
//! Holds the three persisted settings (display name, endpoint URI, credential id)
//! and derives the search connection parameters from the URI. Changes go through
//! [`Settings`], which validates input before persisting it via a [`ConfigStore`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialResolver;
use crate::error::{ConfigError, Result, ValidationError};

pub mod endpoint;

pub use endpoint::Endpoint;

/// Directory under the home directory holding config and credentials
const APP_DIR: &str = ".trivy-publisher";

const CONFIG_FILE: &str = "config.yaml";

/// Name shown when no display name has been configured
pub const DISPLAY_NAME: &str = "Trivy Scanning Publisher Configuration";

/// Persisted publisher configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Display name for this publisher
    #[serde(default)]
    pub name: String,

    /// Search endpoint, `scheme://host[:port][/index]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_uri: Option<String>,

    /// Id of a username/password credential in the credential store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}

impl Configuration {
    /// Connection parameters derived from the endpoint URI
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::derive(self.endpoint_uri.as_deref())
    }

    pub fn scheme(&self) -> String {
        self.endpoint().scheme
    }

    pub fn host(&self) -> String {
        self.endpoint().host
    }

    pub fn port(&self) -> u16 {
        self.endpoint().port
    }

    pub fn index_name(&self) -> String {
        self.endpoint().index
    }

    /// Configured name, or the default display name when blank
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            DISPLAY_NAME
        } else {
            &self.name
        }
    }
}

/// Persistence for the configuration
pub trait ConfigStore {
    fn load(&self) -> Result<Configuration>;
    fn save(&self, config: &Configuration) -> Result<()>;
}

/// YAML file store, `~/.trivy-publisher/config.yaml` by default
#[derive(Debug, Clone)]
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Store at a custom path or the default location
    pub fn at(path: Option<&str>) -> Result<Self> {
        Ok(Self {
            path: resolve_path(path, CONFIG_FILE)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl ConfigStore for YamlConfigStore {
    /// Load the configuration; a missing file yields the defaults
    fn load(&self) -> Result<Configuration> {
        if !self.path.exists() {
            log::debug!("No config at {}, using defaults", self.path.display());
            return Ok(Configuration::default());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let config: Configuration = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    fn save(&self, config: &Configuration) -> Result<()> {
        let contents =
            serde_yaml::to_string(config).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        write_private(&self.path, &contents)
    }
}

/// Resolve a file path: the custom path if given, else the file under the app directory
pub(crate) fn resolve_path(custom: Option<&str>, file_name: &str) -> Result<PathBuf> {
    if let Some(path) = custom {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir().ok_or(ConfigError::Invalid(
        "Could not determine home directory".to_string(),
    ))?;

    Ok(home.join(APP_DIR).join(file_name))
}

/// Write a file readable only by the owner, creating parent directories
pub(crate) fn write_private(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Reject a blank display name
pub fn check_name(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("name", "Name must not be empty"));
    }
    Ok(())
}

/// Reject a non-blank URI that is not an absolute URL
pub fn check_uri(value: &str) -> std::result::Result<(), ValidationError> {
    if !value.trim().is_empty() && url::Url::parse(value.trim()).is_err() {
        return Err(ValidationError::new("endpoint_uri", "Invalid URL"));
    }
    Ok(())
}

/// Reject a non-blank credential id that does not resolve to a username/password credential
pub fn check_credential_id(
    credentials: &dyn CredentialResolver,
    value: &str,
) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if credentials.username_password(value.trim()).is_none() {
        return Err(ValidationError::new(
            "credential_id",
            "Cannot find currently selected credentials",
        ));
    }
    Ok(())
}

/// A batch of settings changes; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub name: Option<String>,
    pub endpoint_uri: Option<String>,
    pub credential_id: Option<String>,
}

/// The active configuration together with its store and the credentials used
/// to validate it.
pub struct Settings<'a> {
    config: Configuration,
    store: &'a dyn ConfigStore,
    credentials: &'a dyn CredentialResolver,
}

impl<'a> Settings<'a> {
    /// Load the active configuration from the store
    pub fn load(store: &'a dyn ConfigStore, credentials: &'a dyn CredentialResolver) -> Result<Self> {
        Ok(Self {
            config: store.load()?,
            store,
            credentials,
        })
    }

    pub fn get(&self) -> &Configuration {
        &self.config
    }

    pub fn set_name(&mut self, value: &str) -> Result<()> {
        self.update(SettingsUpdate {
            name: Some(value.to_string()),
            ..Default::default()
        })
    }

    /// Set the endpoint URI; a blank value clears it
    pub fn set_endpoint_uri(&mut self, value: &str) -> Result<()> {
        self.update(SettingsUpdate {
            endpoint_uri: Some(value.to_string()),
            ..Default::default()
        })
    }

    /// Set the credential id; a blank value clears it
    pub fn set_credential_id(&mut self, value: &str) -> Result<()> {
        self.update(SettingsUpdate {
            credential_id: Some(value.to_string()),
            ..Default::default()
        })
    }

    /// Validate every provided field, then apply and persist them together.
    ///
    /// Nothing is persisted if any field is rejected.
    pub fn update(&mut self, update: SettingsUpdate) -> Result<()> {
        if let Some(ref name) = update.name {
            check_name(name)?;
        }
        if let Some(ref uri) = update.endpoint_uri {
            check_uri(uri)?;
        }
        if let Some(ref id) = update.credential_id {
            check_credential_id(self.credentials, id)?;
        }

        let mut next = self.config.clone();
        if let Some(name) = update.name {
            next.name = name.trim().to_string();
        }
        if let Some(uri) = update.endpoint_uri {
            next.endpoint_uri = non_blank(uri);
        }
        if let Some(id) = update.credential_id {
            next.credential_id = non_blank(id);
        }

        self.store.save(&next)?;
        self.config = next;
        Ok(())
    }

    /// Check that both connection fields are filled in.
    ///
    /// This only validates form completeness; see `SearchEngineApi::ping` for a
    /// real reachability probe.
    pub fn test_connection(
        uri: &str,
        credential_id: &str,
    ) -> std::result::Result<&'static str, ValidationError> {
        if uri.trim().is_empty() || credential_id.trim().is_empty() {
            return Err(ValidationError::new(
                "connection",
                "URI or Credential is blank",
            ));
        }
        Ok("Connection is verified successfully")
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
