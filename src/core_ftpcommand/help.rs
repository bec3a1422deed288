use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

pub async fn handle_help_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let message = ctx.hooks.help_message(arg);
    Ok(CommandOutcome::Reply(Reply::new(214, message)))
}
