// src/constants.rs

/// Longest control-channel line accepted before replying 500.
pub const MAX_COMMAND_LENGTH: usize = 512;

pub const DEFAULT_UPLOAD_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 128 * 1024;

/// Nominal number of bind attempts when allocating a passive port.
pub const DEFAULT_PASV_BIND_RETRIES: u32 = 3;

/// How long the server waits for a data channel to come up (active
/// connect or passive accept) before giving up with a 425.
pub const DATA_OPEN_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
