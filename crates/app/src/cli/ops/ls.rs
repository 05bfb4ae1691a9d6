use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};
use crate::cli::ops::entry_line;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Directory to list (defaults to the drive root)
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("ls failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for Ls {
    type Error = LsError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.resolve(&self.path)?;
        if !node.is_dir() {
            return Ok(entry_line(&node));
        }

        let children = session.store.read_dir(&session.subject, node.id())?;
        if children.is_empty() {
            return Ok("No entries found".to_string());
        }
        Ok(children
            .iter()
            .map(entry_line)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
