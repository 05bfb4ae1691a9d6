use std::path::PathBuf;

use clap::Args;

use common::drive::DriveError;

use crate::cli::op::{Op, OpContext, SessionError};

/// Export files into a zip archive
#[derive(Args, Debug, Clone)]
pub struct Export {
    /// Archive to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Files or directories to include (defaults to the drive root)
    pub targets: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("export failed: {0}")]
    Drive(#[from] DriveError),
    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Op for Export {
    type Error = ExportError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let roots = if self.targets.is_empty() {
            vec![session.root()?.id().clone()]
        } else {
            self.targets
                .iter()
                .map(|target| session.resolve(target).map(|node| node.id().clone()))
                .collect::<Result<Vec<_>, _>>()?
        };

        let file = std::fs::File::create(&self.output).map_err(|source| ExportError::Io {
            path: self.output.clone(),
            source,
        })?;
        let summary = session.store.export_zip(&session.subject, &roots, file)?;

        Ok(format!(
            "Wrote {} files ({} bytes) to {}",
            summary.files,
            summary.bytes,
            self.output.display()
        ))
    }
}
