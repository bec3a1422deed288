pub mod diskfs;
pub mod provider;

pub use diskfs::DiskFs;
pub use provider::{virtual_parent, virtual_path, EntryMeta, FileSystem};
