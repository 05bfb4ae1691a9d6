use std::io::Write;

use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};

/// Write a file's content to stdout
#[derive(Args, Debug, Clone)]
pub struct Cat {
    pub target: String,

    /// Version index, oldest first (defaults to the latest)
    #[arg(long)]
    pub version: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("cat failed: {0}")]
    Drive(#[from] DriveError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl Op for Cat {
    type Error = CatError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.resolve(&self.target)?;
        let content = match self.version {
            Some(index) => session
                .store
                .get_version(&session.subject, node.id(), index)?,
            None => session.store.get(&session.subject, node.id())?,
        };

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        content.transfer(&mut out)?;
        out.flush()?;
        Ok(String::new())
    }
}
