mod build_info;
mod cli;
mod logging;
mod state;

use clap::{Parser, Subcommand};

use cli::args::Args;
use cli::op::{Op, OpContext};
use cli::{
    Cat, Drives, Export, FindDrive, History, Init, Ls, Mkdir, Open, Put, Rename, Rm, Stat, Tree,
    Version,
};
use state::{AppConfig, AppState};

command_enum! {
    (Init, Init),
    (Open, Open),
    (Drives, Drives),
    (FindDrive, FindDrive),
    (Mkdir, Mkdir),
    (Put, Put),
    (Ls, Ls),
    (Stat, Stat),
    (Cat, Cat),
    (History, History),
    (Rm, Rm),
    (Rename, Rename),
    (Tree, Tree),
    (Export, Export),
    (Version, Version),
}

fn main() {
    let args = Args::parse();

    // Commands run before `init` still log, just with the defaults
    let config = AppState::load(args.config_path.clone())
        .map(|state| state.config)
        .unwrap_or_else(|_| AppConfig::default());
    let guards = logging::init_logging(&config.log_level, config.log_dir.as_deref());

    let ctx = OpContext::new(args.config_path, args.user, args.drive);

    match args.command.execute(&ctx).map_err(anyhow::Error::from) {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {:#}", e);
            drop(guards);
            std::process::exit(1);
        }
    }
}
