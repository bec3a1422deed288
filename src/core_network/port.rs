use log::debug;

use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::core_network::addr::{parse_extended_address, parse_port_address};
use crate::core_network::data_conn::DataConnection;
use crate::reply::Reply;

/// Handles the PORT FTP command: records where to dial for the next
/// transfer. Any pending data channel is superseded.
pub async fn handle_port_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    let target = parse_port_address(arg)?;
    debug!("{} set active data target {}", ctx.session.peer, target);
    ctx.session.discard_data_conn(ctx.registry);
    ctx.session.data_conn = Some(DataConnection::active(target));
    Ok(CommandOutcome::Reply(Reply::new(200, "PORT command successful.")))
}

/// Handles the EPRT FTP command (RFC 2428). An empty argument reuses the
/// control connection's remote endpoint as the target.
pub async fn handle_eprt_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let target = if arg.is_empty() {
        ctx.session.peer
    } else {
        parse_extended_address(arg)?
    };
    debug!("{} set active data target {}", ctx.session.peer, target);
    ctx.session.discard_data_conn(ctx.registry);
    ctx.session.data_conn = Some(DataConnection::active(target));
    Ok(CommandOutcome::Reply(Reply::new(200, "EPRT command successful.")))
}
