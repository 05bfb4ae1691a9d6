use clap::Args;

use common::drive::{CreateOptions, DriveError};

use crate::cli::op::{components, Op, OpContext, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Directory path below the drive root
    pub path: String,

    /// Create missing parent directories as needed
    #[arg(short, long)]
    pub parents: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MkdirError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("mkdir failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for Mkdir {
    type Error = MkdirError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;

        let dir = if self.parents {
            let mut node = session.root()?;
            for name in components(&self.path) {
                node = session.store.mkdir(
                    &session.subject,
                    node.id(),
                    name,
                    CreateOptions::default(),
                )?;
            }
            node
        } else {
            let (parent, name) = session.resolve_parent(&self.path)?;
            session
                .store
                .mkdir(&session.subject, parent.id(), name, CreateOptions::default())?
        };

        Ok(format!("{} (id: {})", self.path, dir.id()))
    }
}
