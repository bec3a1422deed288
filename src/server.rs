use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::core_auth::{Authenticator, FileAuthenticator};
use crate::core_fs::{DiskFs, FileSystem};
use crate::core_network::registry::DataConnectionRegistry;
use crate::core_network::{self, SessionDeps};
use crate::core_throttle::ThroughputMonitor;
use crate::hooks::{DefaultHooks, FtpHooks};

/// The assembled engine: configuration plus the collaborators every
/// session shares. Embedders swap in their own filesystem, authenticator
/// or hooks before calling `run`.
pub struct Server {
    deps: SessionDeps,
}

impl Server {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let registry = Arc::new(DataConnectionRegistry::new(
            config.pasv.port_min,
            config.pasv.port_max,
        ));
        let fs: Arc<dyn FileSystem> = Arc::new(DiskFs::new(config.server.chroot_dir.clone()));
        let auth: Arc<dyn Authenticator> = match &config.auth.passwd_file {
            Some(path) => Arc::new(
                FileAuthenticator::from_file(path, config.auth.allow_anonymous)
                    .with_context(|| format!("Failed to load passwd file: {}", path))?,
            ),
            None => Arc::new(FileAuthenticator::new(config.auth.allow_anonymous)),
        };
        // The global monitor outlives every session; started once here,
        // stopped never.
        let global_monitor = if config.bandwidth.global_rate > 0 {
            let monitor = Arc::new(ThroughputMonitor::new(config.bandwidth.global_rate));
            monitor.start("global");
            Some(monitor)
        } else {
            None
        };
        Ok(Self {
            deps: SessionDeps {
                config,
                registry,
                fs,
                auth,
                hooks: Arc::new(DefaultHooks),
                global_monitor,
            },
        })
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn FtpHooks>) -> Self {
        self.deps.hooks = hooks;
        self
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.deps.fs = fs;
        self
    }

    pub fn with_authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.deps.auth = auth;
        self
    }

    pub fn registry(&self) -> &Arc<DataConnectionRegistry> {
        &self.deps.registry
    }

    /// Binds the configured control endpoint and serves forever.
    pub async fn run(&self) -> Result<()> {
        let addr = format!(
            "{}:{}",
            self.deps.config.server.listen_address, self.deps.config.server.listen_port
        );
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind control listener on {}", addr))?;
        info!("Server listening on {}", addr);
        self.serve(listener).await
    }

    /// Serves on an already-bound listener (ephemeral ports in tests).
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        core_network::serve(listener, self.deps.clone()).await
    }
}
