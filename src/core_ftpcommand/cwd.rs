use log::debug;

use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::core_fs::virtual_path;
use crate::reply::Reply;

/// Handles the CWD FTP command. The target is resolved against the current
/// virtual directory and must exist as a directory; on failure the working
/// directory is left untouched.
pub async fn handle_cwd_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    let target = virtual_path(&ctx.session.cwd, arg);
    if !ctx.fs.is_dir(&target) {
        return Err(FtpError::ActionNotTaken(format!(
            "failed to change directory to {}",
            target
        )));
    }
    debug!("{} changed directory to {}", ctx.session.peer, target);
    ctx.session.cwd = target.clone();
    Ok(CommandOutcome::Reply(Reply::new(
        250,
        format!("Directory changed to {}.", target),
    )))
}
