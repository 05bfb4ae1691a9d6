use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};

/// List every drive the acting user can read
#[derive(Args, Debug, Clone)]
pub struct Drives;

#[derive(Debug, thiserror::Error)]
pub enum DrivesError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("listing drives failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for Drives {
    type Error = DrivesError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let drives = session.store.read_drives(&session.subject)?;
        if drives.is_empty() {
            return Ok("No drives found".to_string());
        }
        Ok(drives
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
