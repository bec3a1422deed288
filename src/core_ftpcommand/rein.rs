use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

/// Handles the REIN FTP command: back to the state right after connect.
pub async fn handle_rein_command(
    ctx: &mut CommandContext<'_>,
    _arg: &str,
) -> Result<CommandOutcome, FtpError> {
    ctx.session.reinitialize(ctx.registry);
    Ok(CommandOutcome::Reply(Reply::new(
        220,
        "Service ready for new user.",
    )))
}
