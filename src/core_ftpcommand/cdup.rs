use crate::core_error::FtpError;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::core_fs::virtual_parent;
use crate::reply::Reply;

/// Handles the CDUP FTP command. At the virtual root CDUP is a no-op that
/// still succeeds, matching the lexical ".." resolution used by CWD.
pub async fn handle_cdup_command(
    ctx: &mut CommandContext<'_>,
    _arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let target = virtual_parent(&ctx.session.cwd);
    if !ctx.fs.is_dir(&target) {
        return Err(FtpError::ActionNotTaken(format!(
            "failed to change directory to {}",
            target
        )));
    }
    ctx.session.cwd = target.clone();
    Ok(CommandOutcome::Reply(Reply::new(
        250,
        format!("Directory changed to {}.", target),
    )))
}
