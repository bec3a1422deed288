use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::{info, warn};
use std::io::Write;
use std::sync::Arc;

use oxidftpd::core_cli::Cli;
use oxidftpd::{Config, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Determine the default config path based on the OS
    let default_config_path = if cfg!(target_os = "windows") {
        "C:\\oxidftpd\\etc\\oxidftpd.conf"
    } else {
        "/etc/oxidftpd.conf"
    };
    let config_path = if args.config.is_empty() {
        default_config_path
    } else {
        args.config.as_str()
    };
    let config = if std::path::Path::new(config_path).exists() {
        Config::load_from_file(config_path)?
    } else {
        warn!("No configuration at {}; using built-in defaults", config_path);
        Config::default()
    };
    info!(
        "Serving {} on {}:{} (pasv {}-{})",
        config.server.chroot_dir,
        config.server.listen_address,
        config.server.listen_port,
        config.pasv.port_min,
        config.pasv.port_max
    );

    let server = Server::new(Arc::new(config))?;
    server.run().await
}
