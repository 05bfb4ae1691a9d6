use std::fmt::Write;

use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Stat {
    pub target: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StatError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("stat failed: {0}")]
    Drive(#[from] DriveError),
    #[error(transparent)]
    Format(#[from] std::fmt::Error),
}

impl Op for Stat {
    type Error = StatError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.resolve(&self.target)?;
        let path = session.store.path(&session.subject, node.id())?;

        let mut out = String::new();
        writeln!(out, "Path:     {}", path)?;
        writeln!(out, "Id:       {}", node.id())?;
        writeln!(out, "Mode:     {}", node.mode())?;
        writeln!(out, "Owner:    {}", node.owner())?;
        writeln!(
            out,
            "Group:    {}",
            node.group().map(|g| g.as_str()).unwrap_or("-")
        )?;
        if let Some(parent) = node.parent() {
            writeln!(out, "Parent:   {}", parent)?;
        }
        if node.is_dir() {
            writeln!(out, "Entries:  {}", node.entries().len())?;
        }
        if let Some(content) = node.content() {
            writeln!(out, "Size:     {}", content.size)?;
            writeln!(out, "Mime:     {}", content.mime.as_str())?;
            writeln!(
                out,
                "Hash:     {}:{}",
                content.hash_algorithm, content.hash
            )?;
            writeln!(out, "Versions: {}", node.versions().count())?;
        }
        for share in node.shares() {
            writeln!(
                out,
                "Share:    {} users={} writable={}",
                share.id,
                share
                    .users
                    .iter()
                    .map(|u| u.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                share.writable
            )?;
        }
        Ok(out.trim_end().to_string())
    }
}
