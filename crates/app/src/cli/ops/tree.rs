use std::collections::HashMap;

use clap::Args;

use common::drive::{DriveError, Fid};

use crate::cli::op::{Op, OpContext, SessionError};

/// Print everything below a directory, depth first
#[derive(Args, Debug, Clone)]
pub struct Tree {
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("tree failed: {0}")]
    Drive(#[from] DriveError),
}

impl Op for Tree {
    type Error = TreeError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let start = session.resolve(&self.path)?;

        let mut depth: HashMap<Fid, usize> = HashMap::new();
        depth.insert(start.id().clone(), 0);
        let mut lines = Vec::new();

        session
            .store
            .walk_dir(&session.subject, start.id(), |id, result| {
                let level = depth.get(id).copied().unwrap_or_default();
                let indent = "  ".repeat(level);
                match result {
                    Ok(node) => {
                        for child in node.entries() {
                            depth.insert(child.clone(), level + 1);
                        }
                        let suffix = if node.is_dir() { "/" } else { "" };
                        lines.push(format!("{}{}{}", indent, node.filename(), suffix));
                    }
                    Err(err) => lines.push(format!("{}<{}: {}>", indent, id, err.kind())),
                }
                Ok(())
            })?;

        Ok(lines.join("\n"))
    }
}
