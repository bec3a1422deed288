use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{CommandContext, CommandOutcome};
use crate::core_fs::virtual_path;
use crate::reply::Reply;

/// Handles the XCRC, XMD5 and XSHA1 extension commands: the checksum of a
/// whole file, rendered as uppercase hex.
pub async fn handle_digest_command(
    ctx: &mut CommandContext<'_>,
    verb: FtpCommand,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    let vpath = virtual_path(&ctx.session.cwd, arg);
    if !ctx.fs.is_file(&vpath) {
        return Err(FtpError::ActionNotTaken(format!("{}: not a plain file", vpath)));
    }
    let digest = match verb {
        FtpCommand::XCRC => ctx.fs.get_crc(&vpath)?,
        FtpCommand::XMD5 => ctx.fs.get_md5(&vpath)?,
        FtpCommand::XSHA1 => ctx.fs.get_sha1(&vpath)?,
        _ => return Err(FtpError::NotImplemented),
    };
    let hex: String = digest.iter().map(|b| format!("{:02X}", b)).collect();
    Ok(CommandOutcome::Reply(Reply::new(250, hex)))
}
