use crate::core_error::FtpError;
use crate::core_fs::virtual_path;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{data_limiter, open_data_stream, CommandContext, CommandOutcome};
use crate::core_transfer::{spawn_transfer, Transfer, TransferPayload};
use crate::reply::Reply;

/// Handles the RETR FTP command: existence is checked before the data
/// channel opens so a missing file costs the client no connection.
pub async fn handle_retr_command(
    ctx: &mut CommandContext<'_>,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    if arg.is_empty() {
        return Err(FtpError::MissingArgument);
    }
    let vpath = virtual_path(&ctx.session.cwd, arg);
    if !ctx.fs.is_file(&vpath) {
        return Err(FtpError::ActionNotTaken(format!("{}: no such file", vpath)));
    }
    let length = ctx.fs.length(&vpath)?;
    let real = ctx.fs.real_path(&vpath)?;

    let stream = open_data_stream(ctx).await?;
    let limiter = data_limiter(ctx);
    let done = spawn_transfer(
        Transfer::new(FtpCommand::RETR, vpath.clone()),
        stream,
        TransferPayload::SendFile { path: real },
        limiter,
        ctx.config.download_buffer_size(),
    );
    Ok(CommandOutcome::Transfer {
        early: Reply::new(
            150,
            format!("Opening data connection for {} ({} bytes).", vpath, length),
        ),
        done,
    })
}
