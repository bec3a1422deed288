use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::core_fs::virtual_path;
use crate::reply::Reply;

/// Handles the SIZE FTP command (RFC 3659). Only regular files have a
/// transferable size; directories get 550.
pub async fn handle_size_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    let vpath = virtual_path(&ctx.session.cwd, arg);
    if !ctx.fs.is_file(&vpath) {
        return Err(FtpError::ActionNotTaken(format!("{}: not a plain file", vpath)));
    }
    let length = ctx.fs.length(&vpath)?;
    Ok(CommandOutcome::Reply(Reply::new(213, length.to_string())))
}
