use super::error::DriveError;

pub const MAX_FILENAME_LEN: usize = 255;

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Whether `name` is usable as a node name on every common filesystem
pub fn is_valid_filename(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_FILENAME_LEN).contains(&len)
        && !name
            .chars()
            .any(|c| c.is_control() || FORBIDDEN.contains(&c))
}

pub fn validate_filename(name: &str) -> Result<(), DriveError> {
    if is_valid_filename(name) {
        Ok(())
    } else {
        Err(DriveError::InvalidArgument(format!(
            "invalid filename: {:?}",
            name
        )))
    }
}
