use log::{info, warn};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::core_error::FtpError;

/// How the data channel comes up: the server dials out (PORT/EPRT) or a
/// bound listener waits for the peer (PASV/EPSV).
#[derive(Debug)]
pub enum DataConnMode {
    Active { target: SocketAddr },
    Passive { listener: TcpListener, local: SocketAddr },
}

/// A session's pending data channel. At most one exists per session;
/// establishing a new one supersedes this one.
#[derive(Debug)]
pub struct DataConnection {
    mode: DataConnMode,
}

impl DataConnection {
    pub fn active(target: SocketAddr) -> Self {
        Self {
            mode: DataConnMode::Active { target },
        }
    }

    pub fn passive(listener: TcpListener, local: SocketAddr) -> Self {
        Self {
            mode: DataConnMode::Passive { listener, local },
        }
    }

    pub fn is_passive(&self) -> bool {
        matches!(self.mode, DataConnMode::Passive { .. })
    }

    /// Local bound address of a passive listener, if any.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.mode {
            DataConnMode::Passive { local, .. } => Some(*local),
            DataConnMode::Active { .. } => None,
        }
    }

    /// Brings the channel up: dials the recorded target, or accepts the
    /// registered peer. Consumes the pending connection either way.
    ///
    /// Passive accepts from a different host than the registered remote
    /// are dropped and the wait continues; the overall attempt is bounded
    /// by `wait`.
    pub async fn open(self, expected_peer: IpAddr, wait: Duration) -> Result<TcpStream, FtpError> {
        match self.mode {
            DataConnMode::Active { target } => {
                info!("Opening active data connection to {}", target);
                let stream = timeout(wait, TcpStream::connect(target))
                    .await
                    .map_err(|_| {
                        FtpError::DataConnection(format!("timeout connecting to {}", target))
                    })?
                    .map_err(|e| {
                        FtpError::DataConnection(format!("connect to {} failed: {}", target, e))
                    })?;
                Ok(stream)
            }
            DataConnMode::Passive { listener, local } => {
                info!("Waiting for passive data connection on {}", local);
                let accept_loop = async {
                    loop {
                        let (stream, peer) = listener.accept().await.map_err(|e| {
                            FtpError::DataConnection(format!("accept on {} failed: {}", local, e))
                        })?;
                        if peer.ip() == expected_peer {
                            info!("Passive data connection accepted from {}", peer);
                            return Ok(stream);
                        }
                        warn!(
                            "Rejected data connection from {} (expected {})",
                            peer, expected_peer
                        );
                        drop(stream);
                    }
                };
                timeout(wait, accept_loop).await.map_err(|_| {
                    FtpError::DataConnection(format!("timeout waiting for peer on {}", local))
                })?
            }
        }
    }
}
