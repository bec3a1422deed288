use chrono::{DateTime, Utc};
use log::error;
use sha1::Digest;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::core_error::FtpError;
use crate::core_fs::provider::{EntryMeta, FileSystem};

const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

/// Disk-backed filesystem provider rooted at the configured chroot
/// directory. Virtual paths arrive pre-normalized, so mapping onto the
/// root is a plain join.
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn real(&self, vpath: &str) -> PathBuf {
        self.root.join(vpath.trim_start_matches('/'))
    }

    fn metadata(&self, vpath: &str) -> Result<fs::Metadata, FtpError> {
        let path = self.real(vpath);
        fs::metadata(&path).map_err(|e| {
            error!("Failed to stat {:?}: {}", path, e);
            FtpError::ActionNotTaken(format!("{} unavailable", vpath))
        })
    }

    fn entry_from_metadata(name: String, metadata: &fs::Metadata) -> EntryMeta {
        let modified = metadata
            .modified()
            .ok()
            .map(|time| DateTime::<Utc>::from(time));
        EntryMeta {
            name,
            is_dir: metadata.is_dir(),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified,
        }
    }

    fn digest_file<H, F>(&self, vpath: &str, mut update: F, finish: impl FnOnce(H) -> Vec<u8>, hasher: H) -> Result<Vec<u8>, FtpError>
    where
        F: FnMut(&mut H, &[u8]),
        H: Sized,
    {
        let path = self.real(vpath);
        let mut file = fs::File::open(&path).map_err(|e| {
            error!("Failed to open {:?} for digest: {}", path, e);
            FtpError::ActionNotTaken(format!("{} unavailable", vpath))
        })?;
        let mut hasher = hasher;
        let mut buffer = vec![0u8; DIGEST_BUFFER_SIZE];
        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            update(&mut hasher, &buffer[..n]);
        }
        Ok(finish(hasher))
    }
}

impl FileSystem for DiskFs {
    fn is_dir(&self, vpath: &str) -> bool {
        self.real(vpath).is_dir()
    }

    fn is_file(&self, vpath: &str) -> bool {
        self.real(vpath).is_file()
    }

    fn exists(&self, vpath: &str) -> bool {
        self.real(vpath).exists()
    }

    fn length(&self, vpath: &str) -> Result<u64, FtpError> {
        let metadata = self.metadata(vpath)?;
        if !metadata.is_file() {
            return Err(FtpError::ActionNotTaken(format!("{} is not a file", vpath)));
        }
        Ok(metadata.len())
    }

    fn modification_time(&self, vpath: &str) -> Result<DateTime<Utc>, FtpError> {
        let metadata = self.metadata(vpath)?;
        let modified = metadata
            .modified()
            .map_err(|e| FtpError::ActionNotTaken(format!("{}: {}", vpath, e)))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn list_entries(&self, vpath: &str) -> Result<Vec<EntryMeta>, FtpError> {
        let path = self.real(vpath);
        let read_dir = fs::read_dir(&path).map_err(|e| {
            error!("Failed to list {:?}: {}", path, e);
            FtpError::ActionNotTaken(format!("{} unavailable", vpath))
        })?;
        let mut entries = Vec::new();
        for entry in read_dir.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Ok(metadata) = entry.metadata() {
                entries.push(Self::entry_from_metadata(name, &metadata));
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn stat_entry(&self, vpath: &str) -> Result<EntryMeta, FtpError> {
        let metadata = self.metadata(vpath)?;
        let name = Path::new(vpath)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "/".to_string());
        Ok(Self::entry_from_metadata(name, &metadata))
    }

    fn real_path(&self, vpath: &str) -> Result<PathBuf, FtpError> {
        Ok(self.real(vpath))
    }

    fn get_crc(&self, vpath: &str) -> Result<Vec<u8>, FtpError> {
        self.digest_file(
            vpath,
            |hasher: &mut crc32fast::Hasher, chunk| hasher.update(chunk),
            |hasher| hasher.finalize().to_be_bytes().to_vec(),
            crc32fast::Hasher::new(),
        )
    }

    fn get_md5(&self, vpath: &str) -> Result<Vec<u8>, FtpError> {
        self.digest_file(
            vpath,
            |context: &mut md5::Context, chunk| context.consume(chunk),
            |context| context.compute().0.to_vec(),
            md5::Context::new(),
        )
    }

    fn get_sha1(&self, vpath: &str) -> Result<Vec<u8>, FtpError> {
        self.digest_file(
            vpath,
            |hasher: &mut sha1::Sha1, chunk| hasher.update(chunk),
            |hasher| hasher.finalize().to_vec(),
            sha1::Sha1::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("oxidftpd-diskfs-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("sub")).unwrap();
        let mut file = fs::File::create(dir.join("hello.txt")).unwrap();
        file.write_all(b"hello world").unwrap();
        dir
    }

    #[test]
    fn listing_and_stat_agree_on_metadata() {
        let dir = scratch_dir("list");
        let fs_provider = DiskFs::new(&dir);
        let entries = fs_provider.list_entries("/").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["hello.txt", "sub"]);
        let stat = fs_provider.stat_entry("/hello.txt").unwrap();
        assert!(!stat.is_dir);
        assert_eq!(stat.size, 11);
        assert_eq!(fs_provider.length("/hello.txt").unwrap(), 11);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn length_of_a_directory_is_refused() {
        let dir = scratch_dir("len");
        let fs_provider = DiskFs::new(&dir);
        assert!(fs_provider.length("/sub").is_err());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn digests_match_known_vectors() {
        let dir = scratch_dir("digest");
        let fs_provider = DiskFs::new(&dir);
        // Well-known digests of "hello world".
        let md5_hex: String = fs_provider
            .get_md5("/hello.txt")
            .unwrap()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        assert_eq!(md5_hex, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        let sha1_hex: String = fs_provider
            .get_sha1("/hello.txt")
            .unwrap()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        assert_eq!(sha1_hex, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        let crc = fs_provider.get_crc("/hello.txt").unwrap();
        assert_eq!(crc, 0x0d4a1185u32.to_be_bytes().to_vec());
        let _ = fs::remove_dir_all(dir);
    }
}
