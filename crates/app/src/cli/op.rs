use std::error::Error;
use std::path::PathBuf;

use common::drive::{DriveError, DriveStore, Fid, File, OpenOptions, Subject};

use crate::cli::args::DriveSelector;
use crate::state::{AppState, StateError};

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.drive)
    pub config_path: Option<PathBuf>,
    /// Acting user override
    pub user: Option<String>,
    pub drive: DriveSelector,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Drive(#[from] DriveError),
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>, user: Option<String>, drive: DriveSelector) -> Self {
        Self {
            config_path,
            user,
            drive,
        }
    }

    /// Load state and open the store for a command that needs one
    pub fn session(&self) -> Result<Session, SessionError> {
        let state = AppState::load(self.config_path.clone())?;
        let store = state.open_store()?;
        let subject = state.subject(self.user.as_deref());
        tracing::debug!(subject = %subject.id, drive = %self.drive, "session opened");
        Ok(Session {
            state,
            store,
            subject,
            drive: self.drive.clone(),
        })
    }
}

pub struct Session {
    pub state: AppState,
    pub store: DriveStore,
    pub subject: Subject,
    drive: DriveSelector,
}

impl Session {
    pub fn open_options(&self) -> OpenOptions {
        match &self.drive {
            DriveSelector::Private(name) => OpenOptions::private(self.subject.id.clone()).name(name),
            DriveSelector::Global(name) => OpenOptions::global(name),
        }
    }

    pub fn root(&self) -> Result<File, DriveError> {
        self.store.open_root(&self.subject, self.open_options())
    }

    /// Resolve `fid:<id>` or a `/`-separated path below the drive root
    pub fn resolve(&self, target: &str) -> Result<File, DriveError> {
        if let Some(id) = target.strip_prefix("fid:") {
            return self.store.stat(&self.subject, &Fid::from(id));
        }

        let mut node = self.root()?;
        for name in components(target) {
            node = self
                .store
                .child_by_name(&self.subject, node.id(), name)?
                .ok_or_else(|| DriveError::NotFound(target.to_string()))?;
        }
        Ok(node)
    }

    /// Resolve everything but the last path component
    pub fn resolve_parent<'a>(&self, target: &'a str) -> Result<(File, &'a str), DriveError> {
        let parts = components(target);
        let Some((name, parents)) = parts.split_last() else {
            return Err(DriveError::InvalidArgument(format!(
                "{:?} does not name an entry",
                target
            )));
        };
        let parent = self.resolve(&parents.join("/"))?;
        Ok((parent, *name))
    }
}

pub fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

pub trait Op {
    type Error: Error + Send + Sync + 'static;
    type Output;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx)
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    use common::drive::CreateOptions;
    use tempfile::TempDir;

    #[test]
    fn test_session_resolves_targets() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("drive");
        let config = crate::state::AppConfig {
            user: "alice".to_string(),
            ..Default::default()
        };
        AppState::init(Some(dir.clone()), Some(config)).unwrap();

        let ctx = OpContext::new(Some(dir), None, DriveSelector::default());
        let session = ctx.session().unwrap();
        let root = session
            .store
            .open_root(&session.subject, session.open_options().create(true))
            .unwrap();
        let docs = session
            .store
            .mkdir(&session.subject, root.id(), "docs", CreateOptions::default())
            .unwrap();

        assert_eq!(session.resolve("/").unwrap().id(), root.id());
        assert_eq!(session.resolve("/docs/").unwrap().id(), docs.id());
        let by_id = format!("fid:{}", docs.id());
        assert_eq!(session.resolve(&by_id).unwrap().id(), docs.id());
        assert!(matches!(
            session.resolve("docs/missing"),
            Err(DriveError::NotFound(_))
        ));

        let (parent, name) = session.resolve_parent("docs/n.txt").unwrap();
        assert_eq!(parent.id(), docs.id());
        assert_eq!(name, "n.txt");
        assert!(matches!(
            session.resolve_parent("/"),
            Err(DriveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_components() {
        assert_eq!(components("/docs//n.txt/"), vec!["docs", "n.txt"]);
        assert!(components("/").is_empty());
        assert!(components("").is_empty());
    }
}
