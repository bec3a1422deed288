use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::core_fs::virtual_path;
use crate::reply::Reply;

/// Handles the MDTM FTP command (RFC 3659): last modification time in UTC
/// as `YYYYMMDDHHMMSS`.
pub async fn handle_mdtm_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    let vpath = virtual_path(&ctx.session.cwd, arg);
    if !ctx.fs.exists(&vpath) {
        return Err(FtpError::ActionNotTaken(format!("{}: no such file", vpath)));
    }
    let modified = ctx.fs.modification_time(&vpath)?;
    Ok(CommandOutcome::Reply(Reply::new(
        213,
        modified.format("%Y%m%d%H%M%S").to_string(),
    )))
}
