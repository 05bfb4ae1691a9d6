use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};

/// Rename a node in place
#[derive(Args, Debug, Clone)]
pub struct Rename {
    pub target: String,
    pub new_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("rename failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for Rename {
    type Error = RenameError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.resolve(&self.target)?;
        let renamed = session
            .store
            .rename(&session.subject, node.id(), &self.new_name)?;
        Ok(format!(
            "{} -> {}",
            self.target,
            session.store.path(&session.subject, renamed.id())?
        ))
    }
}
