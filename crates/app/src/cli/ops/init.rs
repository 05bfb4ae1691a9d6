use clap::Args;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// User commands act as (defaults to $USER)
    #[arg(long)]
    pub owner: Option<String>,

    /// Groups the user belongs to
    #[arg(long = "group")]
    pub groups: Vec<String>,

    /// Let the configured user bypass permission checks
    #[arg(long)]
    pub superuser: bool,

    /// Default log level
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            user: self.owner.clone().unwrap_or(defaults.user),
            groups: self.groups.clone(),
            superuser: self.superuser,
            log_level: self.log_level.clone(),
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized drive directory at: {}\n\
             - Nodes: {}\n\
             - Roots: {}\n\
             - Blobs: {}\n\
             - Config: {}\n\
             - User: {}{}",
            state.drive_dir.display(),
            state.nodes_path.display(),
            state.roots_path.display(),
            state.blobs_path.display(),
            state.config_path.display(),
            state.config.user,
            if state.config.superuser { " (superuser)" } else { "" },
        ))
    }
}
