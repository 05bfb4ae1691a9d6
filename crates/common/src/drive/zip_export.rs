use std::collections::HashSet;
use std::io::{self, Seek, Write};

use chrono::{DateTime, Datelike, Timelike, Utc};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::{DriveError, ErrorKind};
use super::ids::Fid;
use super::node::File;
use super::permission::Subject;
use super::store::DriveStore;
use super::tree;

/// What an export wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZipSummary {
    pub files: usize,
    pub bytes: u64,
}

fn zip_time(at: DateTime<Utc>) -> Option<zip::DateTime> {
    let year = u16::try_from(at.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        at.month() as u8,
        at.day() as u8,
        at.hour() as u8,
        at.minute() as u8,
        at.second() as u8,
    )
    .ok()
}

/// Where a requested root sits and what its entries are named under
struct ExportBase {
    path: String,
    prefix: String,
}

impl ExportBase {
    fn entry_name(&self, path: &str) -> String {
        let relative = path
            .strip_prefix(self.path.as_str())
            .unwrap_or(path)
            .trim_start_matches('/');
        if relative.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{}", self.prefix, relative)
        }
    }
}

impl DriveStore {
    /// Write the latest version of every file below `roots` into a zip
    ///  archive. Any unreadable node aborts the export.
    ///
    /// A single root exports paths as seen from its drive root. Several
    ///  roots each get their own top-level folder named after the root,
    ///  with a numeric suffix when two roots share a name.
    pub fn export_zip<W: Write + Seek>(
        &self,
        subject: &Subject,
        roots: &[Fid],
        writer: W,
    ) -> Result<ZipSummary, DriveError> {
        let files = self.collect_exportable(subject, roots)?;

        let mut zip = ZipWriter::new(writer);
        let mut summary = ZipSummary::default();
        for (name, node) in files {
            let Some(info) = node.content() else {
                continue;
            };
            if info.size == 0 {
                tracing::debug!(node = %node.id(), "skipping empty file");
                continue;
            }
            let Some(mut reader) = self.blobs().reader(&info.key)? else {
                tracing::warn!(node = %node.id(), key = %info.key, "content blob missing, skipping");
                continue;
            };

            let mut options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            let modified = node.versions().last().and_then(|v| zip_time(v.stamp.at));
            if let Some(modified) = modified {
                options = options.last_modified_time(modified);
            }

            zip.start_file(name, options)?;
            let copied = io::copy(&mut reader, &mut zip)?;
            summary.files += 1;
            summary.bytes += copied;
        }
        zip.finish()?;

        tracing::info!(files = summary.files, bytes = summary.bytes, "exported zip");
        Ok(summary)
    }

    /// Archive name and node of every file below `roots`, each file once
    fn collect_exportable(
        &self,
        subject: &Subject,
        roots: &[Fid],
    ) -> Result<Vec<(String, File)>, DriveError> {
        let prefixed = roots.len() > 1;
        let mut seen = HashSet::new();
        let mut prefixes = HashSet::new();
        let mut files = Vec::new();
        for root in roots {
            let mut base: Option<ExportBase> = None;
            self.walk_dir(subject, root, |id, node| match node {
                Ok(node) => {
                    let path = tree::path_of(self.nodes(), node)?;
                    if prefixed && id == root {
                        let mut prefix = node.filename().to_string();
                        let mut n = 1;
                        while !prefixes.insert(prefix.clone()) {
                            n += 1;
                            prefix = format!("{}-{}", node.filename(), n);
                        }
                        base = Some(ExportBase {
                            path: path.clone(),
                            prefix,
                        });
                    }
                    if !node.is_dir() && seen.insert(node.id().clone()) {
                        let name = match &base {
                            Some(base) => base.entry_name(&path),
                            None => path.trim_start_matches('/').to_string(),
                        };
                        files.push((name, node.clone()));
                    }
                    Ok(())
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::warn!(node = %id, "skipping stale entry");
                    Ok(())
                }
                Err(err) => Err(err),
            })?;
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_names_below_base() {
        let drive_root = ExportBase {
            path: "/".to_string(),
            prefix: "work".to_string(),
        };
        assert_eq!(drive_root.entry_name("/a.txt"), "work/a.txt");

        let docs = ExportBase {
            path: "/docs".to_string(),
            prefix: "docs".to_string(),
        };
        assert_eq!(docs.entry_name("/docs/n/x.txt"), "docs/n/x.txt");
        assert_eq!(docs.entry_name("/docs"), "docs");
    }
}
