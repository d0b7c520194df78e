use std::path::Path;

use crate::error::{ContractError, ContractKind, ValidationIssue};

/// True when `path` looks like an absolute POSIX path or a Windows
/// drive-letter path (`C:\...`, `C:/...`).
pub fn is_absolute_path(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Rejects paths containing a `..` segment after cleaning, a NUL byte, or
/// that otherwise look unsafe to hand to an agent or use for an evidence
/// lookup. Does not touch the filesystem.
pub fn check_path_safety(path: &str) -> Result<(), ContractError> {
    let bad = |msg: &str| {
        ContractError::malformed(
            ContractKind::Permissions,
            ValidationIssue::new("path", format!("{msg}: {path:?}")),
        )
    };

    if path.contains('\0') {
        return Err(bad("path contains a NUL byte"));
    }
    if Path::new(path)
        .components()
        .any(|c| c.as_os_str() == "..")
    {
        return Err(bad("path contains a .. segment"));
    }
    Ok(())
}

/// Agent identifiers: `[A-Za-z0-9_-]{1,128}`, not starting with `-`.
pub fn check_agent_name(name: &str) -> Result<(), ContractError> {
    let bad = |msg: &str| {
        ContractError::malformed(
            ContractKind::Workflow,
            ValidationIssue::new("agent", format!("{msg}: {name:?}")),
        )
    };

    if name.is_empty() || name.len() > 128 {
        return Err(bad("agent name must be 1-128 characters"));
    }
    if name.starts_with('-') {
        return Err(bad("agent name must not start with '-'"));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(bad(
            "agent name must match [A-Za-z0-9_-]{1,128}",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_rule() {
        assert!(is_absolute_path("/tmp/x.go"));
        assert!(is_absolute_path("C:\\src\\x.go"));
        assert!(is_absolute_path("C:/src/x.go"));
        assert!(!is_absolute_path("tmp/x.go"));
    }

    #[test]
    fn rejects_traversal_and_nul() {
        assert!(check_path_safety("/tmp/../etc/passwd").is_err());
        assert!(check_path_safety("/tmp/x\0.go").is_err());
        assert!(check_path_safety("/tmp/x.go").is_ok());
    }

    #[test]
    fn agent_name_rules() {
        assert!(check_agent_name("locator-1").is_ok());
        assert!(check_agent_name("-locator").is_err());
        assert!(check_agent_name("").is_err());
        assert!(check_agent_name("bad name").is_err());
        assert!(check_agent_name(&"a".repeat(129)).is_err());
    }
}
