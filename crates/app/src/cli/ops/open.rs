use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};
use crate::cli::ops::parse_mode;

/// Open the selected drive root, optionally creating it
#[derive(Args, Debug, Clone)]
pub struct Open {
    #[arg(long)]
    pub create: bool,

    /// Octal permission bits for a new root (superusers may also
    ///  change an existing one)
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<common::drive::Mode>,

    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("open failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for Open {
    type Error = OpenError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let mut opts = session.open_options().create(self.create);
        if let Some(mode) = self.mode {
            opts = opts.mode(mode);
        }
        if let Some(group) = &self.group {
            opts = opts.group(group.as_str());
        }

        let root = session.store.open_root(&session.subject, opts)?;
        Ok(format!(
            "{} {} {} (id: {})",
            ctx.drive,
            root.mode(),
            root.owner(),
            root.id()
        ))
    }
}
