//! Naming rules enforced before anything reaches the server.

use crate::protocol::error::{PilosaError, Result};

const MAX_NAME_LEN: usize = 64;
const MAX_LABEL_LEN: usize = 64;

/// Database names: 1 to 64 characters from `[a-z0-9_-]`.
pub fn validate_database_name(name: &str) -> Result<()> {
    check_length("database name", name, MAX_NAME_LEN)?;
    if name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
    {
        Ok(())
    } else {
        Err(invalid("database name", name))
    }
}

/// Frame names: 1 to 64 characters, `[a-z0-9]` followed by `[a-z0-9._-]`.
pub fn validate_frame_name(name: &str) -> Result<()> {
    check_length("frame name", name, MAX_NAME_LEN)?;
    let mut bytes = name.bytes();
    let first_ok = bytes
        .next()
        .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    let rest_ok = bytes.all(|b| {
        b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'_' || b == b'-'
    });
    if first_ok && rest_ok {
        Ok(())
    } else {
        Err(invalid("frame name", name))
    }
}

/// Column and row labels: 1 to 64 characters, a letter followed by `[A-Za-z0-9_]`.
pub fn validate_label(label: &str) -> Result<()> {
    check_length("label", label, MAX_LABEL_LEN)?;
    let mut bytes = label.bytes();
    let first_ok = bytes.next().is_some_and(|b| b.is_ascii_alphabetic());
    let rest_ok = bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if first_ok && rest_ok {
        Ok(())
    } else {
        Err(invalid("label", label))
    }
}

fn check_length(what: &str, value: &str, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(PilosaError::Validation(format!("{} must not be empty", what)));
    }
    if value.len() > max {
        return Err(PilosaError::Validation(format!(
            "{} '{}' is longer than {} characters",
            what, value, max
        )));
    }
    Ok(())
}

fn invalid(what: &str, value: &str) -> PilosaError {
    PilosaError::Validation(format!("invalid {}: '{}'", what, value))
}
