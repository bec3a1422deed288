use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

pub async fn handle_noop_command(
    _ctx: &mut CommandContext<'_>,
    _arg: &str,
) -> Result<CommandOutcome, FtpError> {
    Ok(CommandOutcome::Reply(Reply::new(200, "NOOP command successful.")))
}
