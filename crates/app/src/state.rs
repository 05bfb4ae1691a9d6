use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use common::acl::{AclPermission, StaticAcl};
use common::blobs::FsBlobStore;
use common::drive::{DriveStore, File, NamedRoot, Subject, UserId, UserRoots};
use common::repository::FsRepository;

pub const APP_NAME: &str = "drive";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const NODES_DIR_NAME: &str = "nodes";
pub const ROOTS_DIR_NAME: &str = "roots";
pub const GLOBAL_ROOTS_DIR_NAME: &str = "global";
pub const PRIVATE_ROOTS_DIR_NAME: &str = "private";
pub const BLOBS_DIR_NAME: &str = "blobs";

/// A resource-ACL grant loaded into the store at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantConfig {
    pub user: String,
    pub namespace: String,
    pub instance: String,
    pub permission: AclPermission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User every command acts as unless `--user` is given
    pub user: String,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Whether the configured user bypasses permission checks
    #[serde(default)]
    pub superuser: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also write daily rolling log files here
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub grants: Vec<GrantConfig>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "owner".to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            groups: Vec::new(),
            superuser: false,
            log_level: default_log_level(),
            log_dir: None,
            grants: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the drive directory (~/.drive)
    pub drive_dir: PathBuf,
    /// Path to the node documents
    pub nodes_path: PathBuf,
    /// Path to the root registries
    pub roots_path: PathBuf,
    /// Path to the content blobs
    pub blobs_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the drive directory path (custom or default ~/.drive)
    pub fn drive_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    fn layout(drive_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            nodes_path: drive_dir.join(NODES_DIR_NAME),
            roots_path: drive_dir.join(ROOTS_DIR_NAME),
            blobs_path: drive_dir.join(BLOBS_DIR_NAME),
            config_path: drive_dir.join(CONFIG_FILE_NAME),
            drive_dir,
            config,
        }
    }

    /// Initialize a new drive directory
    pub fn init(custom_path: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let drive_dir = Self::drive_dir(custom_path)?;
        if drive_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        let state = Self::layout(drive_dir, config.unwrap_or_default());
        fs::create_dir_all(&state.nodes_path)?;
        fs::create_dir_all(state.roots_path.join(GLOBAL_ROOTS_DIR_NAME))?;
        fs::create_dir_all(state.roots_path.join(PRIVATE_ROOTS_DIR_NAME))?;
        fs::create_dir_all(&state.blobs_path)?;

        let config_toml = toml::to_string_pretty(&state.config)?;
        fs::write(&state.config_path, config_toml)?;

        Ok(state)
    }

    /// Load existing state from the drive directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let drive_dir = Self::drive_dir(custom_path)?;
        if !drive_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = drive_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        let state = Self::layout(drive_dir, config);
        for (path, name) in [
            (&state.nodes_path, "nodes/"),
            (&state.roots_path, "roots/"),
            (&state.blobs_path, "blobs/"),
        ] {
            if !path.exists() {
                return Err(StateError::MissingFile(name.to_string()));
            }
        }
        Ok(state)
    }

    /// Open the store persisted in this directory
    pub fn open_store(&self) -> Result<DriveStore, StateError> {
        let acl = StaticAcl::new();
        for grant in &self.config.grants {
            acl.grant(
                &UserId::from(grant.user.as_str()),
                &grant.namespace,
                &grant.instance,
                grant.permission,
            )
            .map_err(|e| StateError::Store(e.to_string()))?;
        }

        let store = DriveStore::builder()
            .nodes(Arc::new(FsRepository::<File>::open(&self.nodes_path)?))
            .named_roots(Arc::new(FsRepository::<NamedRoot>::open(
                self.roots_path.join(GLOBAL_ROOTS_DIR_NAME),
            )?))
            .user_roots(Arc::new(FsRepository::<UserRoots>::open(
                self.roots_path.join(PRIVATE_ROOTS_DIR_NAME),
            )?))
            .blobs(Arc::new(
                FsBlobStore::open(&self.blobs_path).map_err(|e| StateError::Store(e.to_string()))?,
            ))
            .acl(Arc::new(acl))
            .build();
        Ok(store)
    }

    /// The acting subject. Groups and superuser rights only apply
    ///  when acting as the configured user.
    pub fn subject(&self, user_override: Option<&str>) -> Subject {
        match user_override {
            Some(user) if user != self.config.user => Subject::user(user),
            _ => {
                let mut subject = if self.config.superuser {
                    Subject::superuser(self.config.user.as_str())
                } else {
                    Subject::user(self.config.user.as_str())
                };
                for group in &self.config.groups {
                    subject = subject.with_group(group.as_str());
                }
                subject
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("drive directory not initialized. Run 'drive init' first")]
    NotInitialized,

    #[error("drive directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("failed to open store: {0}")]
    Store(String),

    #[error("repository error: {0}")]
    Repository(#[from] common::repository::RepositoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
