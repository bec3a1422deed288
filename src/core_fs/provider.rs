use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::core_error::FtpError;

/// Metadata for one directory entry, enough to build LIST long lines and
/// MLSX fact lines.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Filesystem collaborator. All paths are virtual absolute paths rooted at
/// the session's chroot; implementations map them onto real storage.
pub trait FileSystem: Send + Sync {
    fn is_dir(&self, vpath: &str) -> bool;
    fn is_file(&self, vpath: &str) -> bool;
    fn exists(&self, vpath: &str) -> bool;
    fn length(&self, vpath: &str) -> Result<u64, FtpError>;
    fn modification_time(&self, vpath: &str) -> Result<DateTime<Utc>, FtpError>;
    fn list_entries(&self, vpath: &str) -> Result<Vec<EntryMeta>, FtpError>;
    fn stat_entry(&self, vpath: &str) -> Result<EntryMeta, FtpError>;
    /// Real on-disk path for the transfer executor's file I/O.
    fn real_path(&self, vpath: &str) -> Result<PathBuf, FtpError>;
    fn get_crc(&self, vpath: &str) -> Result<Vec<u8>, FtpError>;
    fn get_md5(&self, vpath: &str) -> Result<Vec<u8>, FtpError>;
    fn get_sha1(&self, vpath: &str) -> Result<Vec<u8>, FtpError>;
}

/// Joins a command argument onto the current working directory and
/// normalizes the result. `.` and `..` are resolved lexically, so the
/// returned path can never climb out of the virtual root.
pub fn virtual_path(cwd: &str, arg: &str) -> String {
    let joined = if arg.starts_with('/') {
        arg.to_string()
    } else if arg.is_empty() {
        cwd.to_string()
    } else if cwd.ends_with('/') {
        format!("{}{}", cwd, arg)
    } else {
        format!("{}/{}", cwd, arg)
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in joined.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Parent of a virtual path, bottoming out at the root.
pub fn virtual_parent(vpath: &str) -> String {
    virtual_path(vpath, "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_onto_cwd() {
        assert_eq!(virtual_path("/", "pub"), "/pub");
        assert_eq!(virtual_path("/pub", "files/a.txt"), "/pub/files/a.txt");
    }

    #[test]
    fn absolute_argument_replaces_cwd() {
        assert_eq!(virtual_path("/pub", "/other"), "/other");
    }

    #[test]
    fn empty_argument_keeps_cwd() {
        assert_eq!(virtual_path("/pub", ""), "/pub");
    }

    #[test]
    fn dot_dot_cannot_escape_the_root() {
        assert_eq!(virtual_path("/", "../../etc/passwd"), "/etc/passwd");
        assert_eq!(virtual_path("/a/b", "../c"), "/a/c");
        assert_eq!(virtual_path("/a", ".."), "/");
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(virtual_parent("/"), "/");
        assert_eq!(virtual_parent("/a/b"), "/a");
    }
}
