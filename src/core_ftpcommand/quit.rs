use log::info;

use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

/// Handles the QUIT FTP command: the session is logically re-initialized
/// (as REIN would) before the closing reply; the transport closes the
/// control channel afterwards.
pub async fn handle_quit_command(
    ctx: &mut CommandContext<'_>,
    _arg: &str,
) -> Result<CommandOutcome, FtpError> {
    info!("QUIT from {}", ctx.session.peer);
    ctx.session.reinitialize(ctx.registry);
    Ok(CommandOutcome::Quit(Reply::new(
        221,
        "Service closing control connection. Goodbye.",
    )))
}
