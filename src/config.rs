use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DOWNLOAD_BUFFER_SIZE, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_PASV_BIND_RETRIES,
    DEFAULT_UPLOAD_BUFFER_SIZE,
};

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub greeting: String,
    pub chroot_dir: String,
    pub idle_timeout_secs: u64,
    pub upload_buffer_size: Option<usize>,   // Optional to allow default value
    pub download_buffer_size: Option<usize>, // Optional to allow default value
    /// Whether the surrounding transport can secure the control channel.
    /// Only affects the FEAT security-extension block; the handshake
    /// itself happens outside this engine.
    pub tls_capable: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 2121,
            greeting: String::from("oxidftpd ready."),
            chroot_dir: String::from("/var/ftp"),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            upload_buffer_size: Some(DEFAULT_UPLOAD_BUFFER_SIZE),
            download_buffer_size: Some(DEFAULT_DOWNLOAD_BUFFER_SIZE),
            tls_capable: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PasvConfig {
    /// Address advertised in PASV replies (the public IP in NAT setups).
    pub address: String,
    pub port_min: u16,
    pub port_max: u16,
    pub bind_retries: u32,
}

impl Default for PasvConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1"),
            port_min: 2122,
            port_max: 2222,
            bind_retries: DEFAULT_PASV_BIND_RETRIES,
        }
    }
}

/// Rates are bytes per second; 0 disables the limit.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct BandwidthConfig {
    pub global_rate: u64,
    pub session_rate: u64,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        Self {
            global_rate: 0,
            session_rate: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// `user:bcrypt-hash[:account]` lines, one per user.
    pub passwd_file: Option<String>,
    pub allow_anonymous: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            passwd_file: None,
            allow_anonymous: true,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub pasv: PasvConfig,
    pub bandwidth: BandwidthConfig,
    pub auth: AuthConfig,
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }

    pub fn upload_buffer_size(&self) -> usize {
        self.server
            .upload_buffer_size
            .unwrap_or(DEFAULT_UPLOAD_BUFFER_SIZE)
    }

    pub fn download_buffer_size(&self) -> usize {
        self.server
            .download_buffer_size
            .unwrap_or(DEFAULT_DOWNLOAD_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_tables() {
        let config: Config = toml::from_str("[server]\nlisten_port = 21\n").unwrap();
        assert_eq!(config.server.listen_port, 21);
        assert_eq!(config.pasv.bind_retries, DEFAULT_PASV_BIND_RETRIES);
        assert_eq!(config.bandwidth.global_rate, 0);
        assert!(config.auth.allow_anonymous);
    }

    #[test]
    fn buffer_sizes_fall_back_to_defaults() {
        let mut config = Config::default();
        config.server.upload_buffer_size = None;
        assert_eq!(config.upload_buffer_size(), DEFAULT_UPLOAD_BUFFER_SIZE);
        assert_eq!(config.download_buffer_size(), DEFAULT_DOWNLOAD_BUFFER_SIZE);
    }
}
