pub mod cat;
pub mod drives;
pub mod export;
pub mod find_drive;
pub mod history;
pub mod init;
pub mod ls;
pub mod mkdir;
pub mod open;
pub mod put;
pub mod rename;
pub mod rm;
pub mod stat;
pub mod tree;
pub mod version;

pub use cat::Cat;
pub use drives::Drives;
pub use export::Export;
pub use find_drive::FindDrive;
pub use history::History;
pub use init::Init;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use open::Open;
pub use put::Put;
pub use rename::Rename;
pub use rm::Rm;
pub use stat::Stat;
pub use tree::Tree;
pub use version::Version;

use common::drive::{File, Mode};

/// One `ls -l` style line
pub(crate) fn entry_line(node: &File) -> String {
    let size = node.content().map(|c| c.size).unwrap_or_default();
    let modified = node
        .latest_activity()
        .map(|a| a.at().format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let suffix = if node.is_dir() { "/" } else { "" };
    format!(
        "{} {:<10} {:>10} {} {}{}",
        node.mode(),
        node.owner(),
        size,
        modified,
        node.filename(),
        suffix
    )
}

/// Parse an octal permission string like `640` or `0o640`
pub(crate) fn parse_mode(s: &str) -> Result<Mode, String> {
    let digits = s.trim_start_matches("0o");
    let bits = u32::from_str_radix(digits, 8).map_err(|e| format!("invalid mode {:?}: {}", s, e))?;
    if bits > 0o777 {
        return Err(format!("invalid mode {:?}: out of range", s));
    }
    Ok(Mode::from_bits(bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("640").unwrap().bits(), 0o640);
        assert_eq!(parse_mode("0o606").unwrap().bits(), 0o606);
        assert!(parse_mode("999").is_err());
        assert!(parse_mode("1777").is_err());
    }
}
