use clap::Args;

use common::drive::{DeleteOptions, DriveError};

use crate::cli::op::{Op, OpContext, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Rm {
    pub target: String,

    /// Delete directories together with everything below them
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("rm failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for Rm {
    type Error = RmError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.resolve(&self.target)?;
        let opts = DeleteOptions {
            recursive: self.recursive,
        };
        session.store.delete(&session.subject, node.id(), opts)?;
        Ok(format!("removed {}", self.target))
    }
}
