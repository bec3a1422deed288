pub mod config;
pub mod constants;
pub mod core_auth;
pub mod core_cli;
pub mod core_error;
pub mod core_fs;
pub mod core_ftpcommand;
pub mod core_network;
pub mod core_throttle;
pub mod core_transfer;
pub mod hooks;
pub mod reply;
pub mod server;
pub mod session;

pub use config::Config;
pub use core_error::FtpError;
pub use server::Server;
