pub mod ftpcommand;
pub mod handlers;

mod acct;
mod cdup;
mod cwd;
mod digest;
mod feat;
mod help;
mod list;
mod mdtm;
mod mlst;
mod noop;
mod opts;
mod pass;
mod pwd;
mod quit;
mod rein;
mod retr;
mod size;
mod stor;
mod stru;
mod syst;
mod type_;
mod user;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::oneshot;

use crate::config::Config;
use crate::constants::DATA_OPEN_TIMEOUT_SECS;
use crate::core_error::FtpError;
use crate::core_auth::Authenticator;
use crate::core_fs::FileSystem;
use crate::core_network::registry::DataConnectionRegistry;
use crate::core_throttle::{BandwidthLimiter, ThroughputMonitor};
use crate::core_transfer::Transfer;
use crate::hooks::FtpHooks;
use crate::reply::Reply;
use crate::session::Session;

/// Everything a command handler may touch. The session is borrowed
/// mutably for the duration of exactly one command.
pub struct CommandContext<'a> {
    pub config: &'a Arc<Config>,
    pub session: &'a mut Session,
    pub registry: &'a Arc<DataConnectionRegistry>,
    pub fs: &'a Arc<dyn FileSystem>,
    pub auth: &'a Arc<dyn Authenticator>,
    pub hooks: &'a Arc<dyn FtpHooks>,
    /// Shared process-global throughput monitor, if rate limiting is on.
    pub global_monitor: &'a Option<Arc<ThroughputMonitor>>,
}

/// What a handler hands back to the session loop. Replies are only ever
/// written there.
pub enum CommandOutcome {
    Reply(Reply),
    /// A data transfer is running: emit `early` now, then await `done` for
    /// the finalized transfer and emit the final reply.
    Transfer {
        early: Reply,
        done: oneshot::Receiver<Transfer>,
    },
    /// Emit the reply, then close the control connection.
    Quit(Reply),
}

impl CommandOutcome {
    /// Code of the reply emitted first (the early one for transfers).
    pub fn code(&self) -> u16 {
        match self {
            CommandOutcome::Reply(r) | CommandOutcome::Quit(r) => r.code(),
            CommandOutcome::Transfer { early, .. } => early.code(),
        }
    }
}

/// Consumes the session's pending data channel and brings it up. Without a
/// prior PORT/EPRT/PASV/EPSV there is nothing to open (425). The passive
/// registration is released whether the open succeeds or not.
pub(crate) async fn open_data_stream(
    ctx: &mut CommandContext<'_>,
) -> Result<TcpStream, FtpError> {
    let conn = ctx.session.data_conn.take().ok_or_else(|| {
        FtpError::DataConnection("use PORT, EPRT, PASV or EPSV first".to_string())
    })?;
    let local = conn.local_addr();
    let result = conn
        .open(
            ctx.session.peer.ip(),
            Duration::from_secs(DATA_OPEN_TIMEOUT_SECS),
        )
        .await;
    if let Some(local) = local {
        ctx.registry.remove(ctx.session.peer.ip(), local);
    }
    result
}

/// Fresh limiter for one data channel: its own session monitor plus the
/// shared global one.
pub(crate) fn data_limiter(ctx: &CommandContext<'_>) -> BandwidthLimiter {
    BandwidthLimiter::for_channel(ctx.config.bandwidth.session_rate, ctx.global_monitor.clone())
}
