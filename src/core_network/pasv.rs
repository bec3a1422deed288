use log::{info, warn};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::core_network::addr::{encode_extended_passive, encode_passive};
use crate::core_network::data_conn::DataConnection;
use crate::reply::Reply;

/// Binds a listener on a port drawn from the allocator, retrying a bounded
/// number of times when a candidate is already taken. The bound channel is
/// registered under (remote address, local bound address) so the inbound
/// peer connection can be matched back to this session, and any previously
/// pending channel is superseded.
async fn bind_passive(ctx: &mut CommandContext<'_>) -> Result<SocketAddr, FtpError> {
    let retries = ctx.config.pasv.bind_retries.max(1);
    let bind_ip = ctx.session.local.ip();
    ctx.session.discard_data_conn(ctx.registry);

    for attempt in 1..=retries {
        let port = ctx.registry.allocator().next_port();
        match TcpListener::bind((bind_ip, port)).await {
            Ok(listener) => {
                let local = listener
                    .local_addr()
                    .map_err(|e| FtpError::DataConnection(e.to_string()))?;
                ctx.registry
                    .register(ctx.session.peer.ip(), local, ctx.session.peer);
                ctx.session.data_conn = Some(DataConnection::passive(listener, local));
                info!("Passive listener on {} for {}", local, ctx.session.peer);
                return Ok(local);
            }
            Err(e) => {
                warn!(
                    "Attempt {}/{}: failed to bind passive port {}: {}",
                    attempt, retries, port, e
                );
            }
        }
    }
    Err(FtpError::DataConnection(
        "no passive port available".to_string(),
    ))
}

/// Handles the PASV FTP command. The advertised address comes from the
/// configuration (the public one in NAT setups), the port from the freshly
/// bound listener.
pub async fn handle_pasv_command(
    ctx: &mut CommandContext<'_>,
    _arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let advertised: IpAddr = ctx.config.pasv.address.parse().map_err(|_| {
        FtpError::ServiceUnavailable(format!("bad pasv address {}", ctx.config.pasv.address))
    })?;
    let local = bind_passive(ctx).await?;
    let encoded = encode_passive(SocketAddr::new(advertised, local.port()))?;
    Ok(CommandOutcome::Reply(Reply::new(
        227,
        format!("Entering Passive Mode ({}).", encoded),
    )))
}

/// Handles the EPSV FTP command (RFC 2428). Accepts no argument or an
/// explicit protocol 1/2; any other protocol is a 522. `EPSV ALL` is
/// acknowledged without binding anything.
pub async fn handle_epsv_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    match arg {
        "" | "1" | "2" => {}
        other if other.eq_ignore_ascii_case("ALL") => {
            return Ok(CommandOutcome::Reply(Reply::new(200, "EPSV ALL accepted.")));
        }
        other => {
            return Err(FtpError::ExtendedAddress(format!(
                "unsupported protocol {}",
                other
            )));
        }
    }
    let local = bind_passive(ctx).await?;
    Ok(CommandOutcome::Reply(Reply::new(
        229,
        format!(
            "Entering Extended Passive Mode {}",
            encode_extended_passive(local.port())
        ),
    )))
}
