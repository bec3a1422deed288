use chrono::Utc;

use crate::core_error::FtpError;
use crate::core_fs::{virtual_parent, virtual_path};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{data_limiter, open_data_stream, CommandContext, CommandOutcome};
use crate::core_transfer::{spawn_transfer, Transfer, TransferPayload};
use crate::reply::Reply;

/// Handles the STOR, APPE and STOU FTP commands. STOR truncates, APPE
/// appends, STOU invents a name that does not collide and announces it in
/// the early reply (`150 FILE: <name>`).
pub async fn handle_store_command(
    ctx: &mut CommandContext<'_>,
    verb: FtpCommand,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    let vpath = match verb {
        FtpCommand::STOU => unique_path(ctx, arg),
        _ => {
            if arg.is_empty() {
                return Err(FtpError::MissingArgument);
            }
            virtual_path(&ctx.session.cwd, arg)
        }
    };
    if ctx.fs.is_dir(&vpath) {
        return Err(FtpError::ActionNotTaken(format!("{}: is a directory", vpath)));
    }
    if !ctx.fs.is_dir(&virtual_parent(&vpath)) {
        return Err(FtpError::ActionNotTaken(format!(
            "{}: no such directory",
            virtual_parent(&vpath)
        )));
    }
    let real = ctx.fs.real_path(&vpath)?;

    let stream = open_data_stream(ctx).await?;
    let limiter = data_limiter(ctx);
    let append = verb == FtpCommand::APPE;
    let done = spawn_transfer(
        Transfer::new(verb, vpath.clone()),
        stream,
        TransferPayload::ReceiveFile { path: real, append },
        limiter,
        ctx.config.upload_buffer_size(),
    );
    let early = match verb {
        // RFC 1123: the unique name travels in the 150 text.
        FtpCommand::STOU => Reply::new(150, format!("FILE: {}", basename(&vpath))),
        _ => Reply::new(150, format!("Opening data connection for {}.", vpath)),
    };
    Ok(CommandOutcome::Transfer { early, done })
}

/// Picks a virtual path in the current directory that no entry occupies:
/// a timestamped name derived from the suggestion, with a counter suffix
/// if even that collides.
fn unique_path(ctx: &CommandContext<'_>, suggestion: &str) -> String {
    let base = match basename(suggestion) {
        "" => "ftp",
        name => name,
    };
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let mut candidate = virtual_path(&ctx.session.cwd, &format!("{}.{}", base, stamp));
    let mut counter = 0u32;
    while ctx.fs.exists(&candidate) {
        counter += 1;
        candidate = virtual_path(&ctx.session.cwd, &format!("{}.{}.{}", base, stamp, counter));
    }
    candidate
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
