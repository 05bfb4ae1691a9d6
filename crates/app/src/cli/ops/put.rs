use std::path::PathBuf;

use clap::Args;

use common::drive::{DriveError, PutOptions, VersionSource};

use crate::cli::op::{components, Op, OpContext, SessionError};

/// Upload a local file as a new version
#[derive(Args, Debug, Clone)]
pub struct Put {
    /// Local file to upload
    pub source: PathBuf,

    /// Destination path; a trailing `/` or an existing directory
    ///  keeps the local file name
    pub dest: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PutError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("put failed: {0}")]
    Drive(#[from] DriveError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
}

impl Op for Put {
    type Error = PutError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let local_name = self
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| PutError::NoFileName(self.source.clone()))?;

        let session = ctx.session()?;
        let dest = self.dest.as_deref().unwrap_or("/");

        let (parent, name) = if dest.ends_with('/') || components(dest).is_empty() {
            (session.resolve(dest)?, local_name.clone())
        } else {
            match session.resolve(dest) {
                Ok(existing) if existing.is_dir() => (existing, local_name.clone()),
                Ok(_) | Err(DriveError::NotFound(_)) => {
                    let (parent, name) = session.resolve_parent(dest)?;
                    (parent, name.to_string())
                }
                Err(err) => return Err(err.into()),
            }
        };

        let mut reader = std::fs::File::open(&self.source).map_err(|source| PutError::Io {
            path: self.source.clone(),
            source,
        })?;
        let opts = PutOptions {
            source: VersionSource::Upload,
            original_filename: Some(local_name),
            ..PutOptions::default()
        };
        let node = session
            .store
            .put(&session.subject, parent.id(), &name, &mut reader, opts)?;

        let content = node.content();
        Ok(format!(
            "{} -> {} ({} bytes, {}, {} versions)",
            self.source.display(),
            session.store.path(&session.subject, node.id())?,
            content.map(|c| c.size).unwrap_or_default(),
            content.map(|c| c.mime.as_str()).unwrap_or("-"),
            node.versions().count(),
        ))
    }
}
