use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};

/// Show which drive a node belongs to
#[derive(Args, Debug, Clone)]
pub struct FindDrive {
    /// Path below the current drive, or `fid:<id>`
    pub target: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FindDriveError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("find-drive failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for FindDrive {
    type Error = FindDriveError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.resolve(&self.target)?;
        let found = session.store.find_drive(&session.subject, node.id())?;
        Ok(match found {
            Some(drive) => drive.to_string(),
            None => format!("{} is not part of a registered drive", node.id()),
        })
    }
}
