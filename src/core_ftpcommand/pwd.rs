use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::reply::Reply;

pub async fn handle_pwd_command(
    ctx: &mut CommandContext<'_>,
    _arg: &str,
) -> Result<CommandOutcome, FtpError> {
    Ok(CommandOutcome::Reply(Reply::new(
        257,
        format!("\"{}\" is the current directory.", ctx.session.cwd),
    )))
}
