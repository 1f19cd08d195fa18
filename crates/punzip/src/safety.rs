//! Security checks for archive entry names.
//!
//! Entry names come from untrusted archives. Before an entry reaches the
//! Path Resolver its name is checked so that no resolved destination can
//! escape the directory the archive lives in (zip-slip).

use crate::error::SecurityError;

/// Validates an archive entry name before it is resolved onto disk.
///
/// Rejects:
/// - absolute names (`/etc/passwd`, `\\server\share`, `C:\x`, `C:/x`)
/// - names with a `..` segment anywhere, with either separator
///
/// Empty and `.` segments are left for the resolver; they cannot climb out
/// of the extraction root.
///
/// # Examples
///
/// ```
/// use punzip::safety::validate_entry_name;
///
/// assert!(validate_entry_name("dir/file.txt").is_ok());
/// assert!(validate_entry_name("../../etc/passwd").is_err());
/// assert!(validate_entry_name("/etc/passwd").is_err());
/// ```
pub fn validate_entry_name(name: &str) -> Result<(), SecurityError> {
    if name.starts_with('/') || name.starts_with('\\') || has_drive_prefix(name) {
        return Err(SecurityError::AbsolutePath(name.to_string()));
    }

    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(SecurityError::PathTraversal(format!(
            "Path contains '..' component: {}",
            name
        )));
    }

    Ok(())
}

/// `C:` style prefix, which `Path::join` would treat as a new root on Windows.
fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
