pub use clap::Parser;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which root commands operate on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveSelector {
    /// One of the acting user's private roots
    Private(String),
    /// A shared root in the global namespace
    Global(String),
}

impl Default for DriveSelector {
    fn default() -> Self {
        DriveSelector::Private(common::drive::DEFAULT_ROOT_NAME.to_string())
    }
}

impl FromStr for DriveSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = match s.split_once(':') {
            Some(("global", name)) => DriveSelector::Global(name.to_string()),
            Some(("private", name)) => DriveSelector::Private(name.to_string()),
            Some((kind, _)) => return Err(format!("unknown namespace: {}", kind)),
            None => DriveSelector::Private(s.to_string()),
        };
        match &selector {
            DriveSelector::Private(name) | DriveSelector::Global(name) if name.is_empty() => {
                Err("drive name must not be empty".to_string())
            }
            _ => Ok(selector),
        }
    }
}

impl fmt::Display for DriveSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveSelector::Private(name) => write!(f, "private:{}", name),
            DriveSelector::Global(name) => write!(f, "global:{}", name),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "drive")]
#[command(about = "Versioned, permissioned file trees on local disk")]
pub struct Args {
    /// Path to the drive directory (defaults to ~/.drive)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Root to operate on: `NAME`, `private:NAME` or `global:NAME`
    #[arg(long, global = true, default_value_t = DriveSelector::default())]
    pub drive: DriveSelector,

    #[command(subcommand)]
    pub command: crate::Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_selector() {
        assert_eq!(
            "photos".parse::<DriveSelector>().unwrap(),
            DriveSelector::Private("photos".to_string())
        );
        assert_eq!(
            "global:shared".parse::<DriveSelector>().unwrap(),
            DriveSelector::Global("shared".to_string())
        );
        assert!("team:x".parse::<DriveSelector>().is_err());
        assert!("global:".parse::<DriveSelector>().is_err());
        assert_eq!(DriveSelector::default().to_string(), "private:default");
    }
}
