use clap::Args;

use common::drive::{Activity, DriveError};

use crate::cli::op::{Op, OpContext, SessionError};

/// Print a node's audit log
#[derive(Args, Debug, Clone)]
pub struct History {
    pub target: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("history failed: {0}")]
    Drive(#[from] DriveError),
}

fn describe(activity: &Activity) -> String {
    match activity {
        Activity::Created { name, dir, .. } => {
            format!("{} {}", if *dir { "directory" } else { "file" }, name)
        }
        Activity::Deleted { child, name, .. } => format!("{} ({})", name, child),
        Activity::Renamed { from, to, .. } => format!("{} -> {}", from, to),
        Activity::Added { child, name, .. } => format!("{} ({})", name, child),
        Activity::VersionAdded {
            content, source, ..
        } => format!(
            "{} bytes {} from {} [{}]",
            content.size,
            content.mime.as_str(),
            content.original_filename,
            source
        ),
        Activity::GroupChanged { from, to, .. } => format!(
            "{} -> {}",
            from.as_ref().map(|g| g.as_str()).unwrap_or("-"),
            to.as_ref().map(|g| g.as_str()).unwrap_or("-")
        ),
        Activity::OwnerChanged { from, to, .. } => format!("{} -> {}", from, to),
        Activity::ModeChanged { from, to, .. } => format!("{} -> {}", from, to),
        Activity::Moved { from, to, .. } => format!("{} -> {}", from, to),
    }
}

impl Op for History {
    type Error = HistoryError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.resolve(&self.target)?;
        Ok(node
            .audit_log()
            .iter()
            .map(|activity| {
                format!(
                    "{} {:<10} {:<14} {}",
                    activity.at().format("%Y-%m-%d %H:%M:%S"),
                    activity.actor(),
                    activity.kind(),
                    describe(activity)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
